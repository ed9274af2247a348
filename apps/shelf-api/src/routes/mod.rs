//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                  - Liveness plus database check
//!
//! # Identity
//! POST   /cadastro                - Register
//! POST   /login                   - Login, returns profile + bearer token
//! GET    /usuarios/me             - Own full profile
//! GET    /usuarios/{id}           - Full or public profile
//! PUT    /usuarios/{id}           - Update name / email (owner or admin)
//!
//! # Tags
//! GET    /filtros                 - List tags
//! POST   /filtros                 - Create tag
//! DELETE /filtros/{id}            - Remove tag with its books (admin)
//!
//! # Catalog
//! GET    /livros                  - List books
//! POST   /livros                  - Create book (caller becomes owner)
//! GET    /livros/{id}             - Book with tag and owner
//! PUT    /livros/{id}             - Update book (owner or admin)
//! DELETE /livros/{id}             - Delete book (owner or admin)
//! GET    /livros/usuario/{id}     - Books of a user
//! GET    /livros/filtro/{id}      - Books of a tag
//!
//! # Cart
//! POST   /carrinho                - Reserve one unit
//! GET    /carrinho                - Own cart with total
//! DELETE /carrinho/{livro_id}     - Release one unit
//! ```

pub mod cart;
pub mod health;
pub mod items;
pub mod tags;
pub mod users;

use axum::routing::{delete, get, post};
use axum::Router;
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        // Identity
        .route("/cadastro", post(users::register))
        .route("/login", post(users::login))
        .route("/usuarios/me", get(users::me))
        .route("/usuarios/{id}", get(users::show).put(users::update))
        // Tags
        .route("/filtros", get(tags::index).post(tags::create))
        .route("/filtros/{id}", delete(tags::destroy))
        // Catalog
        .route("/livros", get(items::index).post(items::create))
        .route(
            "/livros/{id}",
            get(items::show).put(items::update).delete(items::destroy),
        )
        .route("/livros/usuario/{id}", get(items::by_owner))
        .route("/livros/filtro/{id}", get(items::by_tag))
        // Cart
        .route("/carrinho", get(cart::show).post(cart::add))
        .route("/carrinho/{livro_id}", delete(cart::remove))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// `{"mensagem": "..."}` with an optional created id.
#[derive(Debug, Serialize)]
pub struct Message {
    pub mensagem: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

impl Message {
    pub fn new(mensagem: &'static str) -> Self {
        Message { mensagem, id: None }
    }

    pub fn created(mensagem: &'static str, id: i64) -> Self {
        Message {
            mensagem,
            id: Some(id),
        }
    }
}
