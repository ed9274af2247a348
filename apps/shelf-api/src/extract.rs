//! Request extractors.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{FromRequest, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use shelf_core::User;

use crate::auth::extract_bearer_token;
use crate::error::ApiError;
use crate::state::AppState;

/// Extractor that requires a valid bearer token naming an existing user.
///
/// Rejects with 401 otherwise.
///
/// # Example
///
/// ```rust,ignore
/// async fn my_cart(
///     State(state): State<AppState>,
///     RequireCaller(caller): RequireCaller,
/// ) -> Result<Json<CartSummary>, ApiError> {
///     Ok(Json(state.cart().list(&caller).await?))
/// }
/// ```
pub struct RequireCaller(pub User);

impl FromRequestParts<AppState> for RequireCaller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(extract_bearer_token);

        state
            .identity()
            .resolve_caller(token)
            .await
            .map(RequireCaller)
            .ok_or_else(ApiError::unauthenticated)
    }
}

/// `Json` whose rejection renders as an [`ApiError`] body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

/// `Path` whose rejection is a 404: `/livros/abc` names no book.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!(error = %rejection, "Unmatched path parameter");
        ApiError::not_found("Recurso não encontrado")
    }
}
