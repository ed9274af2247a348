//! Service layer.
//!
//! Each service applies validation and the access policy, then delegates to
//! shelf-db. Handlers stay thin: extract, call one service method, render.
//!
//! ```text
//! ┌────────────────┐  ┌────────────────┐  ┌────────────────┐  ┌────────────────┐
//! │IdentityService │  │  TagService    │  │ CatalogService │  │  CartService   │
//! │                │  │                │  │                │  │                │
//! │ • register     │  │ • list         │  │ • list / get   │  │ • reserve      │
//! │ • authenticate │  │ • create       │  │ • by owner/tag │  │ • release      │
//! │ • resolve      │  │ • delete       │  │ • create       │  │ • list         │
//! │ • view / update│  │                │  │ • update/delete│  │                │
//! └────────────────┘  └────────────────┘  └────────────────┘  └────────────────┘
//! ```

pub mod cart;
pub mod catalog;
pub mod identity;
pub mod tags;

pub use cart::CartService;
pub use catalog::{CatalogService, ItemInput};
pub use identity::{IdentityService, LoginInput, RegisterInput};
pub use tags::TagService;

use crate::error::{ApiError, INTERNAL_MESSAGE};

/// Runs CPU-heavy work (password hashing) off the async executor.
pub(crate) async fn blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError::persistence(INTERNAL_MESSAGE, e))
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::NaiveDate;
    use shelf_core::{NewItem, NewUser, Item, Money, Role, Tag, User};
    use shelf_db::{Database, DbConfig};

    use crate::auth::{Credentials, JwtManager};
    use crate::state::AppState;

    pub const PASSWORD: &str = "s3cret";

    pub async fn test_state() -> AppState {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        AppState::new(db, JwtManager::new("test-secret", 3600)).unwrap()
    }

    pub async fn user(state: &AppState, email: &str, role: Role) -> User {
        state
            .db()
            .users()
            .insert(&NewUser {
                name: email.split('@').next().unwrap_or("user").to_string(),
                email: email.to_string(),
                cep: None,
                cpf: None,
                birth_date: NaiveDate::from_ymd_opt(1990, 5, 20).unwrap(),
                age: 34,
                password_hash: Credentials::hash(PASSWORD).unwrap(),
                role,
            })
            .await
            .unwrap()
    }

    pub async fn tag(state: &AppState, name: &str) -> Tag {
        state.db().tags().insert(name).await.unwrap()
    }

    pub async fn item(state: &AppState, owner: &User, tag: &Tag, stock: i64, cents: i64) -> Item {
        state
            .db()
            .items()
            .insert(&NewItem {
                name: "Dom Casmurro".to_string(),
                price: Money::from_cents(cents),
                image_url: "http://img/dom.png".to_string(),
                stock,
                description: String::new(),
                tag_id: tag.id,
                owner_id: owner.id,
            })
            .await
            .unwrap()
    }
}
