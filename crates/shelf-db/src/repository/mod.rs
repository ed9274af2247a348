//! # Repository Module
//!
//! Database repository implementations for Shelf.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Service                                                               │
//! │       │                                                                 │
//! │       │  db.cart().reserve(item_id, user_id)                           │
//! │       ▼                                                                 │
//! │  CartRepository                                                        │
//! │  ├── reserve(&self, item, user)   one transaction                      │
//! │  ├── release(&self, item, user)   one transaction                      │
//! │  └── list(&self, user)                                                 │
//! │       │                                                                 │
//! │       │  SQL (runtime query + FromRow row type)                        │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Row types stay private to each repository; callers only ever see      │
//! │  shelf-core types.                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`UserRepository`](user::UserRepository) - Accounts and credentials
//! - [`TagRepository`](tag::TagRepository) - Tags and cascading tag removal
//! - [`ItemRepository`](item::ItemRepository) - Catalog items and projections
//! - [`CartRepository`](cart::CartRepository) - Stock reservations

pub mod cart;
pub mod item;
pub mod tag;
pub mod user;

#[cfg(test)]
pub(crate) mod fixtures;

/// Shared SELECT for item projections: item columns plus its tag (null when
/// the tag row is absent).
pub(crate) const ITEM_SUMMARY_SELECT: &str = r#"
    SELECT
        i.id,
        i.name,
        i.price_cents,
        i.image_url,
        i.stock,
        i.description,
        t.id   AS tag_ref_id,
        t.name AS tag_ref_name
    FROM items i
    LEFT JOIN tags t ON t.id = i.tag_id
"#;
