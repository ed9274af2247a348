//! Tag ("filtro") routes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use shelf_core::{Tag, TagId};

use super::Message;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, RequireCaller};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TagInput {
    pub nome: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TagRemoved {
    pub mensagem: &'static str,
    pub livros_removidos: u64,
}

/// GET /filtros
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Tag>>, ApiError> {
    Ok(Json(state.tags().list().await?))
}

/// POST /filtros
pub async fn create(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<TagInput>,
) -> Result<(StatusCode, Json<Message>), ApiError> {
    let tag = state.tags().create(input.nome).await?;
    Ok((
        StatusCode::CREATED,
        Json(Message::created("Filtro criado", tag.id.get())),
    ))
}

/// DELETE /filtros/{id}
pub async fn destroy(
    State(state): State<AppState>,
    RequireCaller(caller): RequireCaller,
    ApiPath(id): ApiPath<TagId>,
) -> Result<Json<TagRemoved>, ApiError> {
    let removed = state.tags().delete(id, &caller).await?;
    Ok(Json(TagRemoved {
        mensagem: "Filtro removido",
        livros_removidos: removed.items_removed,
    }))
}
