//! Cart ledger: each entry holds one reserved unit of stock.

use serde_json::Value;
use tracing::{info, warn};

use shelf_core::validation::coerce_integer;
use shelf_core::{CartEntry, CartSummary, ItemId, User};
use shelf_db::DbError;

use crate::error::ApiError;
use crate::state::AppState;

const ITEM_NOT_FOUND: &str = "Livro não encontrado";

pub struct CartService {
    state: AppState,
}

impl CartService {
    pub fn new(state: AppState) -> Self {
        CartService { state }
    }

    /// Reserves one unit of the item named by `livro_id` for `caller`.
    ///
    /// A missing or non-numeric id is reported as an unknown item.
    pub async fn reserve(
        &self,
        item_id: Option<Value>,
        caller: &User,
    ) -> Result<CartEntry, ApiError> {
        let item_id = item_id
            .as_ref()
            .and_then(|raw| coerce_integer("livro_id", raw).ok())
            .map(ItemId::new)
            .ok_or_else(|| ApiError::not_found(ITEM_NOT_FOUND))?;

        let entry = self
            .state
            .db()
            .cart()
            .reserve(item_id, caller.id)
            .await
            .map_err(|e| match e {
                DbError::NotFound { .. } => ApiError::not_found(ITEM_NOT_FOUND),
                DbError::Rule(rule) => {
                    warn!(item_id = %item_id, user_id = %caller.id, "Reservation refused");
                    rule.into()
                }
                e => ApiError::persistence("Erro ao adicionar ao carrinho", e),
            })?;

        info!(item_id = %item_id, user_id = %caller.id, entry_id = %entry.id, "Item reserved");
        Ok(entry)
    }

    /// Releases the caller's oldest reservation of `item_id`.
    pub async fn release(&self, item_id: ItemId, caller: &User) -> Result<(), ApiError> {
        self.state
            .db()
            .cart()
            .release(item_id, caller.id)
            .await
            .map_err(|e| match e {
                e if e.is_not_found() => ApiError::not_found("Livro não está no carrinho"),
                e => ApiError::persistence("Erro ao remover do carrinho", e),
            })?;

        info!(item_id = %item_id, user_id = %caller.id, "Item released");
        Ok(())
    }

    pub async fn list(&self, caller: &User) -> Result<CartSummary, ApiError> {
        Ok(self.state.db().cart().list(caller.id).await?)
    }
}
