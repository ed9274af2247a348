//! Cart ("carrinho") routes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use shelf_core::{CartSummary, ItemId};

use super::Message;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, RequireCaller};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ReserveInput {
    pub livro_id: Option<Value>,
}

/// POST /carrinho
pub async fn add(
    State(state): State<AppState>,
    RequireCaller(caller): RequireCaller,
    ApiJson(input): ApiJson<ReserveInput>,
) -> Result<(StatusCode, Json<Message>), ApiError> {
    state.cart().reserve(input.livro_id, &caller).await?;
    Ok((
        StatusCode::CREATED,
        Json(Message::new("Livro adicionado ao carrinho!")),
    ))
}

/// GET /carrinho
pub async fn show(
    State(state): State<AppState>,
    RequireCaller(caller): RequireCaller,
) -> Result<Json<CartSummary>, ApiError> {
    Ok(Json(state.cart().list(&caller).await?))
}

/// DELETE /carrinho/{livro_id}
pub async fn remove(
    State(state): State<AppState>,
    RequireCaller(caller): RequireCaller,
    ApiPath(item_id): ApiPath<ItemId>,
) -> Result<Json<Message>, ApiError> {
    state.cart().release(item_id, &caller).await?;
    Ok(Json(Message::new("Livro removido do carrinho!")))
}
