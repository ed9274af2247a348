//! # Shelf API
//!
//! JSON-over-HTTP backend for the bookshop: accounts, tags, books and a cart
//! whose entries each hold one reserved unit of stock.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Shelf API Layers                               │
//! │                                                                         │
//! │  Browser ───► axum Router (routes/) ───► Services ───► shelf-db        │
//! │                    │                         │              │           │
//! │                    ▼                         ▼              ▼           │
//! │              RequireCaller            Access policy      SQLite         │
//! │              (Bearer JWT)             (shelf-core)     (transactions)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables:
//! - `HTTP_PORT` - HTTP server port (default: 5000)
//! - `DATABASE_PATH` - SQLite file (default: ./shelf.db)
//! - `DATABASE_MAX_CONNECTIONS` - Pool size (default: 5)
//! - `JWT_SECRET` - Secret for JWT signing
//! - `JWT_ACCESS_LIFETIME_SECS` - Access token lifetime (default: 86400)

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod services;
pub mod state;

// Re-exports
pub use config::ApiConfig;
pub use error::ApiError;
pub use routes::router;
pub use state::AppState;
