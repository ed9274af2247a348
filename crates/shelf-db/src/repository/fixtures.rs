//! Test fixtures shared by the repository tests.

use chrono::{DateTime, NaiveDate, Utc};
use shelf_core::{CartEntryId, Item, ItemId, Money, NewItem, NewUser, Role, Tag, User, UserId};

use crate::{Database, DbConfig};

pub async fn test_db() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

pub fn new_user(email: &str, role: Role) -> NewUser {
    NewUser {
        name: "Test User".to_string(),
        email: email.to_string(),
        cep: Some("01001-000".to_string()),
        cpf: None,
        birth_date: NaiveDate::from_ymd_opt(2000, 3, 1).unwrap(),
        age: 24,
        password_hash: "$argon2id$v=19$test".to_string(),
        role,
    }
}

pub async fn seed_user(db: &Database, email: &str, role: Role) -> User {
    db.users().insert(&new_user(email, role)).await.unwrap()
}

pub async fn seed_tag(db: &Database, name: &str) -> Tag {
    db.tags().insert(name).await.unwrap()
}

pub async fn seed_item(db: &Database, owner: &User, tag: &Tag, stock: i64, cents: i64) -> Item {
    db.items()
        .insert(&NewItem {
            name: format!("Book {stock}/{cents}"),
            price: Money::from_cents(cents),
            image_url: "http://img/book.png".to_string(),
            stock,
            description: "A book.".to_string(),
            tag_id: tag.id,
            owner_id: owner.id,
        })
        .await
        .unwrap()
}

pub async fn stock_of(db: &Database, id: ItemId) -> i64 {
    db.items().get(id).await.unwrap().unwrap().stock
}

/// Counts entries a user holds for an item.
pub async fn count_entries(db: &Database, item_id: ItemId, user_id: UserId) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM cart_entries WHERE item_id = ?1 AND user_id = ?2")
        .bind(item_id)
        .bind(user_id)
        .fetch_one(db.pool())
        .await
        .unwrap()
}

/// Id and creation time of a user's oldest entry for an item.
pub async fn oldest_entry(
    db: &Database,
    item_id: ItemId,
    user_id: UserId,
) -> Option<(CartEntryId, DateTime<Utc>)> {
    sqlx::query_as(
        r#"
        SELECT id, created_at FROM cart_entries
        WHERE item_id = ?1 AND user_id = ?2
        ORDER BY id
        LIMIT 1
        "#,
    )
    .bind(item_id)
    .bind(user_id)
    .fetch_optional(db.pool())
    .await
    .unwrap()
}
