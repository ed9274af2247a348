//! Error types for Shelf API.
//!
//! Every failure a client can see goes through [`ApiError`], which renders
//! as a status code plus `{"code": "...", "erro": "..."}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use shelf_core::{CoreError, ValidationError};
use shelf_db::DbError;

/// Message returned for every 500; details go to the log only.
pub const INTERNAL_MESSAGE: &str = "Erro interno do servidor";

/// Shelf API errors.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing, malformed or out-of-range input.
    #[error("{0}")]
    Validation(String),

    /// A uniqueness rule the client can fix (e.g. tag name taken).
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    /// No (valid) identity, or bad credentials.
    #[error("{0}")]
    Unauthenticated(String),

    /// Identity known, action not allowed.
    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    StockExhausted(String),

    /// The store failed. Carries the public message only.
    #[error("{0}")]
    Persistence(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    code: &'a str,
    erro: &'a str,
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn unauthenticated() -> Self {
        ApiError::Unauthenticated("Usuário não autenticado".to_string())
    }

    pub fn forbidden() -> Self {
        ApiError::Forbidden("Acesso negado".to_string())
    }

    /// Logs `cause` and returns a 500 with `message`.
    pub fn persistence(message: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        let message = message.into();
        tracing::error!(error = %cause, "{message}");
        ApiError::Persistence(message)
    }

    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation_error",
            ApiError::Conflict(_) => "conflict",
            ApiError::NotFound(_) => "not_found",
            ApiError::Unauthenticated(_) => "unauthenticated",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::StockExhausted(_) => "stock_exhausted",
            ApiError::Persistence(_) => "persistence_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Conflict(_) | ApiError::StockExhausted(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let body = ErrorBody {
            code: self.code(),
            erro: &message,
        };

        (self.status(), Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::StockExhausted { .. } => {
                ApiError::StockExhausted("Livro sem estoque".to_string())
            }
            CoreError::Validation(err) => err.into(),
            err @ CoreError::AmountOverflow => ApiError::persistence(INTERNAL_MESSAGE, err),
        }
    }
}

/// Default mapping. Services override it where an operation needs a
/// specific message (e.g. "Livro não encontrado").
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            DbError::UniqueViolation { .. } => ApiError::Conflict(err.to_string()),
            DbError::Rule(core) => core.into(),
            other => ApiError::persistence(INTERNAL_MESSAGE, other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelf_core::ItemId;

    fn status_of(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(status_of(ApiError::validation("x")), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(ApiError::Conflict("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(ApiError::not_found("x")), StatusCode::NOT_FOUND);
        assert_eq!(status_of(ApiError::unauthenticated()), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(ApiError::forbidden()), StatusCode::FORBIDDEN);
        assert_eq!(
            status_of(ApiError::StockExhausted("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ApiError::Persistence("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_db_error_mapping() {
        let stock: ApiError = DbError::Rule(CoreError::StockExhausted {
            item_id: ItemId::new(1),
        })
        .into();
        assert!(matches!(stock, ApiError::StockExhausted(_)));

        let missing: ApiError = DbError::not_found("Item", 1).into();
        assert!(matches!(missing, ApiError::NotFound(_)));

        let dup: ApiError = DbError::duplicate("tag name", "Romance").into();
        assert!(matches!(dup, ApiError::Conflict(_)));

        let broken: ApiError = DbError::QueryFailed("disk I/O error".into()).into();
        assert_eq!(broken.to_string(), INTERNAL_MESSAGE);

        let overflow: ApiError = DbError::Rule(CoreError::AmountOverflow).into();
        assert_eq!(overflow.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(overflow.to_string(), INTERNAL_MESSAGE);
    }

    #[test]
    fn test_validation_mapping() {
        let err: ApiError = ValidationError::required("senha").into();
        assert_eq!(err.code(), "validation_error");
        assert_eq!(err.to_string(), "senha is required");
    }
}
