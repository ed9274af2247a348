//! Registration, login and profile routes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use shelf_core::{Profile, UserId, UserPatch, UserProfile};

use super::Message;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, RequireCaller};
use crate::services::{LoginInput, RegisterInput};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub mensagem: &'static str,
    pub usuario: UserProfile,
    pub token: String,
}

/// POST /cadastro
pub async fn register(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<RegisterInput>,
) -> Result<(StatusCode, Json<Message>), ApiError> {
    let user = state.identity().register(input).await?;

    Ok((
        StatusCode::CREATED,
        Json(Message::created("Usuário cadastrado com sucesso!", user.id.get())),
    ))
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<LoginInput>,
) -> Result<Json<LoginResponse>, ApiError> {
    let (user, token) = state.identity().authenticate(input).await?;

    Ok(Json(LoginResponse {
        mensagem: "Login bem-sucedido",
        usuario: user.profile(),
        token,
    }))
}

/// GET /usuarios/me
pub async fn me(
    State(state): State<AppState>,
    RequireCaller(caller): RequireCaller,
) -> Json<UserProfile> {
    Json(state.identity().view_self(&caller))
}

/// GET /usuarios/{id}
pub async fn show(
    State(state): State<AppState>,
    RequireCaller(caller): RequireCaller,
    ApiPath(id): ApiPath<UserId>,
) -> Result<Json<Profile>, ApiError> {
    Ok(Json(state.identity().view(id, &caller).await?))
}

/// PUT /usuarios/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireCaller(caller): RequireCaller,
    ApiPath(id): ApiPath<UserId>,
    ApiJson(patch): ApiJson<UserPatch>,
) -> Result<Json<Message>, ApiError> {
    state.identity().update(id, &caller, patch).await?;
    Ok(Json(Message::new("Dados atualizados com sucesso")))
}
