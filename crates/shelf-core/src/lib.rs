//! # shelf-core: Pure Business Logic for Shelf
//!
//! Domain types and rules for the Shelf bookshop backend, as pure functions
//! with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Shelf Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Browser client (React)                       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP + Bearer token                    │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    shelf-api (axum routes + services)           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ shelf-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  policy   │  │ validation│  │   │
//! │  │   │ User/Item │  │   Money   │  │ can_write │  │  coercion │  │   │
//! │  │   │ Tag/Entry │  │  totals   │  │ can_read  │  │  age      │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    shelf-db (Database Layer)                    │   │
//! │  │        SQLite queries, migrations, cart ledger transactions     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (User, Tag, Item, CartEntry, projections)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`policy`] - Access policy (who may write / read in full)
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation, coercion and age calculation
//!
//! ## Example Usage
//!
//! ```rust
//! use shelf_core::money::Money;
//!
//! let price = Money::parse("39.90").unwrap();
//! let total = price + Money::from_cents(1010);
//!
//! assert_eq!(total.to_string(), "50.00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod policy;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use policy::Caller;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length of user, tag and item names.
pub const MAX_NAME_LEN: usize = 100;

/// Maximum length of an image reference (URL).
pub const MAX_IMAGE_REF_LEN: usize = 255;

/// Highest accepted item price, in cents (1,000,000.00).
pub const MAX_PRICE_CENTS: i64 = 100_000_000;

/// Date format accepted for birth dates (`2000-03-01`).
pub const BIRTH_DATE_FORMAT: &str = "%Y-%m-%d";
