//! # Domain Types
//!
//! Core domain types used throughout Shelf.
//!
//! ## Ownership Graph
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐        ┌─────────────────┐                        │
//! │  │      User       │◄───────│      Item       │──────►┌─────────────┐  │
//! │  │  ─────────────  │ owner  │  ─────────────  │  tag  │     Tag     │  │
//! │  │  id             │        │  id             │       │  ─────────  │  │
//! │  │  email (unique) │        │  price (cents)  │       │  id         │  │
//! │  │  role           │        │  stock (>= 0)   │       │  name (uniq)│  │
//! │  └────────▲────────┘        └────────▲────────┘       └─────────────┘  │
//! │           │ user                     │ item                             │
//! │           │     ┌─────────────────┐  │                                  │
//! │           └─────│   CartEntry     │──┘                                  │
//! │                 │  one reserved   │                                     │
//! │                 │  unit of stock  │                                     │
//! │                 └─────────────────┘                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every edge is a foreign key held by the child. Back-lookups ("items of a
//! user", "entries of an item") are queries by that key, never pointers.
//!
//! ## Wire Names
//! Projections serialized to the browser client keep the client's field
//! names (`nome`, `preco`, `estoque`, ...).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::{self, Money};
use crate::BIRTH_DATE_FORMAT;

// =============================================================================
// Identifiers
// =============================================================================

/// Defines a type-safe integer id so ids of different entities can't be mixed.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
        #[cfg_attr(feature = "sqlx", sqlx(transparent))]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw row id.
            #[inline]
            pub const fn new(id: i64) -> Self {
                $name(id)
            }

            /// Returns the raw row id.
            #[inline]
            pub const fn get(&self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                $name(id)
            }
        }
    };
}

define_id!(
    /// Identifier of a registered account.
    UserId
);
define_id!(
    /// Identifier of a tag ("filtro").
    TagId
);
define_id!(
    /// Identifier of a catalog item (book).
    ItemId
);
define_id!(
    /// Identifier of a single cart reservation.
    CartEntryId
);

// =============================================================================
// Role
// =============================================================================

/// Account role. Decided at the access policy, never by string comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
pub enum Role {
    /// A regular shopper / seller.
    #[serde(rename = "comum")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "comum"))]
    Ordinary,
    /// Can write any resource and read every profile.
    #[serde(rename = "admin")]
    Admin,
}

impl Default for Role {
    fn default() -> Self {
        Role::Ordinary
    }
}

// =============================================================================
// User
// =============================================================================

/// A registered account as stored.
///
/// Not serializable: it carries the credential hash. Use [`UserProfile`] or
/// [`PublicProfile`] to expose it.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    /// Postal code (CEP).
    pub cep: Option<String>,
    /// National id (CPF).
    pub cpf: Option<String>,
    pub birth_date: NaiveDate,
    /// Derived once at registration.
    pub age: i64,
    /// argon2 PHC string.
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Full projection (owner or admin view).
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            cep: self.cep.clone(),
            cpf: self.cpf.clone(),
            birth_date: self.birth_date.format(BIRTH_DATE_FORMAT).to_string(),
            age: self.age,
            role: self.role,
        }
    }

    /// Reduced projection (everyone else). No contact or document data.
    pub fn public_profile(&self) -> PublicProfile {
        PublicProfile {
            id: self.id,
            name: self.name.clone(),
            age: self.age,
        }
    }
}

/// Validated registration data, ready to insert.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub cep: Option<String>,
    pub cpf: Option<String>,
    pub birth_date: NaiveDate,
    pub age: i64,
    pub password_hash: String,
    pub role: Role,
}

/// Fields a user (or an admin) may change on a profile.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPatch {
    #[serde(rename = "nome")]
    pub name: Option<String>,
    pub email: Option<String>,
}

impl UserPatch {
    /// True when the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none()
    }
}

/// Full profile.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct UserProfile {
    pub id: UserId,
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    pub cep: Option<String>,
    pub cpf: Option<String>,
    #[serde(rename = "data_nascimento")]
    pub birth_date: String,
    #[serde(rename = "idade")]
    pub age: i64,
    #[serde(rename = "tipo")]
    pub role: Role,
}

/// Public profile: id, name and age only.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct PublicProfile {
    pub id: UserId,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "idade")]
    pub age: i64,
}

/// Either projection, chosen by the access policy.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Profile {
    Full(UserProfile),
    Public(PublicProfile),
}

// =============================================================================
// Tag
// =============================================================================

/// A named category ("filtro").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct Tag {
    pub id: TagId,
    #[serde(rename = "nome")]
    pub name: String,
}

/// Tag as embedded in item projections. Both fields are null when the tag
/// row is absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct TagRef {
    pub id: Option<TagId>,
    #[serde(rename = "nome")]
    pub name: Option<String>,
}

impl TagRef {
    pub fn new(id: Option<TagId>, name: Option<String>) -> Self {
        TagRef { id, name }
    }
}

// =============================================================================
// Item
// =============================================================================

/// A catalog item as stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub price: Money,
    pub image_url: String,
    pub stock: i64,
    pub description: String,
    pub owner_id: UserId,
    pub tag_id: TagId,
}

/// Validated item data, ready to insert. Owner is always the caller.
#[derive(Debug, Clone)]
pub struct NewItem {
    pub name: String,
    pub price: Money,
    pub image_url: String,
    pub stock: i64,
    pub description: String,
    pub tag_id: TagId,
    pub owner_id: UserId,
}

/// Validated item changes. Stock is deliberately absent: only the cart
/// ledger moves stock.
#[derive(Debug, Clone, Default)]
pub struct ItemChanges {
    pub name: Option<String>,
    pub price: Option<Money>,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub tag_id: Option<TagId>,
}

impl ItemChanges {
    /// True when no field changes.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.image_url.is_none()
            && self.description.is_none()
            && self.tag_id.is_none()
    }
}

/// Item listing projection.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct ItemSummary {
    pub id: ItemId,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "preco", serialize_with = "money::serialize_as_decimal")]
    #[ts(type = "number")]
    pub price: Money,
    #[serde(rename = "imagem_url")]
    pub image_url: String,
    #[serde(rename = "estoque")]
    pub stock: i64,
    #[serde(rename = "sinopse")]
    pub description: String,
    #[serde(rename = "filtro")]
    pub tag: TagRef,
}

/// Owner as embedded in the single-item projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct OwnerRef {
    pub id: UserId,
    #[serde(rename = "nome")]
    pub name: String,
}

/// Single-item projection: the summary plus its owner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemDetail {
    #[serde(flatten)]
    pub item: ItemSummary,
    #[serde(rename = "usuario")]
    pub owner: OwnerRef,
}

// =============================================================================
// Cart
// =============================================================================

/// One reserved unit of an item, held by a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartEntry {
    pub id: CartEntryId,
    pub item_id: ItemId,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}

/// An item as listed in a cart. One per entry, so an item reserved twice
/// appears twice.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct CartLine {
    pub id: ItemId,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "preco", serialize_with = "money::serialize_as_decimal")]
    #[ts(type = "number")]
    pub price: Money,
    #[serde(rename = "imagem_url")]
    pub image_url: String,
    #[serde(rename = "estoque")]
    pub stock: i64,
    #[serde(rename = "filtro")]
    pub tag: TagRef,
}

/// A user's cart with its total.
///
/// The total is summed from each item's *current* price, so a price change
/// after reservation shows up here.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct CartSummary {
    #[serde(rename = "produtos")]
    pub lines: Vec<CartLine>,
    /// Two-decimal string, e.g. `"59.80"`.
    #[serde(rename = "valor_total")]
    pub total: String,
}

impl CartSummary {
    /// Builds the summary and its total from the listed lines.
    ///
    /// Fails with [`CoreError::AmountOverflow`] when the total does not fit.
    pub fn new(lines: Vec<CartLine>) -> CoreResult<Self> {
        let total = Money::checked_sum(lines.iter().map(|line| line.price))
            .ok_or(CoreError::AmountOverflow)?;
        Ok(CartSummary {
            lines,
            total: total.to_string(),
        })
    }

    /// Returns true when nothing is reserved.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
