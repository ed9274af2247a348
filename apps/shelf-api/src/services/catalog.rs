//! Catalog store: items (books) for sale.
//!
//! ```text
//! create:  presence → coercion → stock > 0 → tag exists → insert
//! update:  exists → owner/admin → coercion → tag exists → update (no stock)
//! delete:  exists → owner/admin → delete entries + item (one tx)
//! ```

use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use shelf_core::policy::{self, Caller};
use shelf_core::validation::{
    coerce_integer, coerce_price, validate_image_ref, validate_initial_stock, validate_name,
};
use shelf_core::{
    Item, ItemChanges, ItemDetail, ItemId, ItemSummary, Money, NewItem, TagId, User, UserId,
};

use crate::error::ApiError;
use crate::state::AppState;

const INCOMPLETE: &str = "Dados incompletos";
const BAD_NUMBERS: &str = "Preço, estoque ou filtro inválidos";
const ITEM_NOT_FOUND: &str = "Livro não encontrado";
const TAG_NOT_FOUND: &str = "Filtro não encontrado";

/// Item body for create (`POST /livros`) and update (`PUT /livros/{id}`).
///
/// Numeric fields stay raw JSON so both `29.9` and `"29.90"` are accepted.
#[derive(Debug, Default, Deserialize)]
pub struct ItemInput {
    pub nome: Option<String>,
    pub preco: Option<Value>,
    pub imagem_url: Option<String>,
    pub estoque: Option<Value>,
    pub sinopse: Option<String>,
    pub filtro_id: Option<Value>,
}

pub struct CatalogService {
    state: AppState,
}

impl CatalogService {
    pub fn new(state: AppState) -> Self {
        CatalogService { state }
    }

    pub async fn list(&self) -> Result<Vec<ItemSummary>, ApiError> {
        Ok(self.state.db().items().list().await?)
    }

    /// One item with its tag and owner.
    pub async fn get(&self, id: ItemId) -> Result<ItemDetail, ApiError> {
        self.state
            .db()
            .items()
            .get_detail(id)
            .await?
            .ok_or_else(|| ApiError::not_found(ITEM_NOT_FOUND))
    }

    pub async fn list_by_owner(&self, owner: UserId) -> Result<Vec<ItemSummary>, ApiError> {
        Ok(self.state.db().items().list_by_owner(owner).await?)
    }

    pub async fn list_by_tag(&self, tag: TagId) -> Result<Vec<ItemSummary>, ApiError> {
        Ok(self.state.db().items().list_by_tag(tag).await?)
    }

    /// Creates an item owned by `caller`.
    pub async fn create(&self, input: ItemInput, caller: &User) -> Result<Item, ApiError> {
        let (name, price, image_url, stock, description, tag_id) = match input {
            ItemInput {
                nome: Some(name),
                preco: Some(price),
                imagem_url: Some(image_url),
                estoque: Some(stock),
                sinopse: Some(description),
                filtro_id: Some(tag_id),
            } if !name.trim().is_empty() && !image_url.trim().is_empty() => {
                (name, price, image_url, stock, description, tag_id)
            }
            _ => return Err(ApiError::validation(INCOMPLETE)),
        };

        let (price, stock, tag_id) = coerce_numbers(&price, &stock, &tag_id)?;
        validate_initial_stock(stock)
            .map_err(|_| ApiError::validation("Estoque deve ser maior que zero"))?;

        let name = validate_name("nome", &name)?;
        let image_url = validate_image_ref(&image_url)?;

        self.require_tag(tag_id).await?;

        let new_item = NewItem {
            name,
            price,
            image_url,
            stock,
            description,
            tag_id,
            owner_id: caller.id,
        };

        let item = self
            .state
            .db()
            .items()
            .insert(&new_item)
            .await
            .map_err(|e| ApiError::persistence("Erro ao salvar livro", e))?;

        info!(item_id = %item.id, owner_id = %caller.id, stock = item.stock, "Item created");
        Ok(item)
    }

    /// Changes name, price, image, description or tag. Stock only moves
    /// through the cart, so a body carrying `estoque` is rejected.
    pub async fn update(
        &self,
        id: ItemId,
        caller: &User,
        input: ItemInput,
    ) -> Result<ItemDetail, ApiError> {
        let item = self.find(id).await?;
        self.authorize(&item, caller)?;

        if input.estoque.is_some() {
            return Err(ApiError::validation(
                "Estoque só pode ser alterado pelo carrinho",
            ));
        }

        let changes = ItemChanges {
            name: input
                .nome
                .as_deref()
                .map(|name| validate_name("nome", name))
                .transpose()?,
            price: input
                .preco
                .as_ref()
                .map(coerce_price)
                .transpose()
                .map_err(|_| ApiError::validation(BAD_NUMBERS))?,
            image_url: input
                .imagem_url
                .as_deref()
                .map(validate_image_ref)
                .transpose()?,
            description: input.sinopse,
            tag_id: input
                .filtro_id
                .as_ref()
                .map(|raw| coerce_integer("filtro_id", raw).map(TagId::new))
                .transpose()
                .map_err(|_| ApiError::validation(BAD_NUMBERS))?,
        };

        if let Some(tag_id) = changes.tag_id {
            self.require_tag(tag_id).await?;
        }

        if !changes.is_empty() {
            self.state
                .db()
                .items()
                .update(id, &changes)
                .await
                .map_err(|e| match e {
                    e if e.is_not_found() => ApiError::not_found(ITEM_NOT_FOUND),
                    e => ApiError::persistence("Erro ao salvar livro", e),
                })?;
            info!(item_id = %id, by = %caller.id, "Item updated");
        }

        self.get(id).await
    }

    /// Deletes an item and every cart entry reserving it.
    pub async fn delete(&self, id: ItemId, caller: &User) -> Result<(), ApiError> {
        let item = self.find(id).await?;
        self.authorize(&item, caller)?;

        let entries = self
            .state
            .db()
            .items()
            .delete_cascade(id)
            .await
            .map_err(|e| match e {
                e if e.is_not_found() => ApiError::not_found(ITEM_NOT_FOUND),
                e => ApiError::persistence("Erro ao deletar livro", e),
            })?;

        info!(item_id = %id, by = %caller.id, entries_removed = entries, "Item deleted");
        Ok(())
    }

    async fn find(&self, id: ItemId) -> Result<Item, ApiError> {
        self.state
            .db()
            .items()
            .get(id)
            .await?
            .ok_or_else(|| ApiError::not_found(ITEM_NOT_FOUND))
    }

    fn authorize(&self, item: &Item, caller: &User) -> Result<(), ApiError> {
        if policy::can_write(&Caller::from(caller), item.owner_id) {
            Ok(())
        } else {
            warn!(item_id = %item.id, caller = %caller.id, "Item write denied");
            Err(ApiError::forbidden())
        }
    }

    async fn require_tag(&self, id: TagId) -> Result<(), ApiError> {
        if self.state.db().tags().exists(id).await? {
            Ok(())
        } else {
            Err(ApiError::not_found(TAG_NOT_FOUND))
        }
    }
}

fn coerce_numbers(
    price: &Value,
    stock: &Value,
    tag_id: &Value,
) -> Result<(Money, i64, TagId), ApiError> {
    let bad = |_| ApiError::validation(BAD_NUMBERS);

    let price = coerce_price(price).map_err(bad)?;
    let stock = coerce_integer("estoque", stock).map_err(bad)?;
    let tag_id = coerce_integer("filtro_id", tag_id).map_err(bad)?;

    Ok((price, stock, TagId::new(tag_id)))
}
