//! Catalog ("livros") routes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use shelf_core::{ItemDetail, ItemId, ItemSummary, TagId, UserId};

use super::Message;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, RequireCaller};
use crate::services::ItemInput;
use crate::state::AppState;

/// GET /livros
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<ItemSummary>>, ApiError> {
    Ok(Json(state.catalog().list().await?))
}

/// GET /livros/{id}
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ItemId>,
) -> Result<Json<ItemDetail>, ApiError> {
    Ok(Json(state.catalog().get(id).await?))
}

/// GET /livros/usuario/{id}
pub async fn by_owner(
    State(state): State<AppState>,
    ApiPath(owner): ApiPath<UserId>,
) -> Result<Json<Vec<ItemSummary>>, ApiError> {
    Ok(Json(state.catalog().list_by_owner(owner).await?))
}

/// GET /livros/filtro/{id}
pub async fn by_tag(
    State(state): State<AppState>,
    ApiPath(tag): ApiPath<TagId>,
) -> Result<Json<Vec<ItemSummary>>, ApiError> {
    Ok(Json(state.catalog().list_by_tag(tag).await?))
}

/// POST /livros
pub async fn create(
    State(state): State<AppState>,
    RequireCaller(caller): RequireCaller,
    ApiJson(input): ApiJson<ItemInput>,
) -> Result<(StatusCode, Json<Message>), ApiError> {
    let item = state.catalog().create(input, &caller).await?;
    Ok((
        StatusCode::CREATED,
        Json(Message::created("Livro criado com sucesso!", item.id.get())),
    ))
}

/// PUT /livros/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireCaller(caller): RequireCaller,
    ApiPath(id): ApiPath<ItemId>,
    ApiJson(input): ApiJson<ItemInput>,
) -> Result<Json<ItemDetail>, ApiError> {
    Ok(Json(state.catalog().update(id, &caller, input).await?))
}

/// DELETE /livros/{id}
pub async fn destroy(
    State(state): State<AppState>,
    RequireCaller(caller): RequireCaller,
    ApiPath(id): ApiPath<ItemId>,
) -> Result<Json<Message>, ApiError> {
    state.catalog().delete(id, &caller).await?;
    Ok(Json(Message::new("Livro deletado com sucesso")))
}
