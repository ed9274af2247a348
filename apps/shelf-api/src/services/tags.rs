//! Tag registry ("filtros").

use tracing::{info, warn};

use shelf_core::policy::{self, Caller};
use shelf_core::validation::validate_name;
use shelf_core::{Tag, TagId, User};
use shelf_db::TagDeletion;

use crate::error::ApiError;
use crate::state::AppState;

pub struct TagService {
    state: AppState,
}

impl TagService {
    pub fn new(state: AppState) -> Self {
        TagService { state }
    }

    pub async fn list(&self) -> Result<Vec<Tag>, ApiError> {
        Ok(self.state.db().tags().list().await?)
    }

    /// Creates a tag. Names are unique.
    pub async fn create(&self, name: Option<String>) -> Result<Tag, ApiError> {
        let name = validate_name("nome", name.as_deref().unwrap_or_default())
            .map_err(|_| ApiError::validation("Nome do filtro é obrigatório"))?;

        let tag = self.state.db().tags().insert(&name).await.map_err(|e| {
            if e.is_unique_violation() {
                ApiError::Conflict("Filtro já existe".to_string())
            } else {
                e.into()
            }
        })?;

        info!(tag_id = %tag.id, name = %tag.name, "Tag created");
        Ok(tag)
    }

    /// Removes a tag with every item it labels and their cart entries.
    pub async fn delete(&self, id: TagId, caller: &User) -> Result<TagDeletion, ApiError> {
        if !policy::can_administer(&Caller::from(caller)) {
            warn!(caller = %caller.id, tag_id = %id, "Tag removal denied");
            return Err(ApiError::forbidden());
        }

        let removed = self.state.db().tags().delete_cascade(id).await.map_err(|e| {
            if e.is_not_found() {
                ApiError::not_found("Filtro não encontrado")
            } else {
                e.into()
            }
        })?;

        info!(
            tag_id = %id,
            items_removed = removed.items_removed,
            entries_removed = removed.entries_removed,
            "Tag removed"
        );
        Ok(removed)
    }
}
