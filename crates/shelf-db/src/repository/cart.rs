//! # Cart Repository
//!
//! The cart ledger: each cart entry is one reserved unit of an item's stock.
//!
//! ## Reservation Protocol
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Cart ↔ Stock Consistency                          │
//! │                                                                         │
//! │  reserve(item, user)                  release(item, user)               │
//! │  ───────────────────                  ───────────────────               │
//! │  BEGIN                                BEGIN                             │
//! │  UPDATE items                         DELETE FROM cart_entries          │
//! │     SET stock = stock - 1              WHERE id = (oldest entry of      │
//! │   WHERE id = ? AND stock > 0                       user for item)       │
//! │    │                                   │                                │
//! │    ├── 0 rows: item missing?           ├── 0 rows → NotFound            │
//! │    │     yes → NotFound                │                                │
//! │    │     no  → StockExhausted          ▼                                │
//! │    ▼                                  UPDATE items                      │
//! │  INSERT INTO cart_entries               SET stock = stock + 1           │
//! │  COMMIT                               COMMIT                            │
//! │                                                                         │
//! │  Any error drops the transaction → ROLLBACK, nothing changes.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The decrement is a single conditional UPDATE, so two concurrent
//! reservations can never both take the last unit. A release removes one
//! specific row by id, so a duplicate concurrent release affects zero rows.
//!
//! For every item: `stock_now + entries_for_item == stock_at_creation`.

use chrono::Utc;
use shelf_core::{
    CartEntry, CartEntryId, CartLine, CartSummary, CoreError, ItemId, Money, TagId, TagRef,
    UserId,
};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};

#[derive(Debug, sqlx::FromRow)]
struct CartLineRow {
    id: ItemId,
    name: String,
    price_cents: i64,
    image_url: String,
    stock: i64,
    tag_ref_id: Option<TagId>,
    tag_ref_name: Option<String>,
}

impl From<CartLineRow> for CartLine {
    fn from(row: CartLineRow) -> Self {
        CartLine {
            id: row.id,
            name: row.name,
            price: Money::from_cents(row.price_cents),
            image_url: row.image_url,
            stock: row.stock,
            tag: TagRef::new(row.tag_ref_id, row.tag_ref_name),
        }
    }
}

/// Repository for cart entries and the stock they reserve.
#[derive(Debug, Clone)]
pub struct CartRepository {
    pool: SqlitePool,
}

impl CartRepository {
    /// Creates a new CartRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CartRepository { pool }
    }

    /// Reserves one unit of `item_id` for `user_id`.
    ///
    /// ## Errors
    /// - `DbError::NotFound` when the item doesn't exist
    /// - `DbError::Rule(CoreError::StockExhausted)` when stock is 0
    ///
    /// Stock and entries are unchanged on error.
    pub async fn reserve(&self, item_id: ItemId, user_id: UserId) -> DbResult<CartEntry> {
        debug!(item_id = %item_id, user_id = %user_id, "Reserving item");

        let mut tx = self.pool.begin().await?;

        let decremented = sqlx::query(
            r#"
            UPDATE items
            SET stock = stock - 1
            WHERE id = ?1 AND stock > 0
            "#,
        )
        .bind(item_id)
        .execute(&mut *tx)
        .await?;

        if decremented.rows_affected() == 0 {
            let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM items WHERE id = ?1")
                .bind(item_id)
                .fetch_optional(&mut *tx)
                .await?;

            return match exists {
                None => Err(DbError::not_found("Item", item_id)),
                Some(_) => {
                    debug!(item_id = %item_id, "Stock exhausted");
                    Err(CoreError::StockExhausted { item_id }.into())
                }
            };
        }

        let now = Utc::now();
        let inserted = sqlx::query(
            "INSERT INTO cart_entries (item_id, user_id, created_at) VALUES (?1, ?2, ?3)",
        )
        .bind(item_id)
        .bind(user_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(CartEntry {
            id: CartEntryId::new(inserted.last_insert_rowid()),
            item_id,
            user_id,
            created_at: now,
        })
    }

    /// Releases one unit of `item_id` held by `user_id` (the oldest entry).
    ///
    /// ## Errors
    /// - `DbError::NotFound` when the user holds no entry for the item
    pub async fn release(&self, item_id: ItemId, user_id: UserId) -> DbResult<()> {
        debug!(item_id = %item_id, user_id = %user_id, "Releasing item");

        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query(
            r#"
            DELETE FROM cart_entries
            WHERE id = (
                SELECT id FROM cart_entries
                WHERE item_id = ?1 AND user_id = ?2
                ORDER BY id
                LIMIT 1
            )
            "#,
        )
        .bind(item_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        if deleted.rows_affected() == 0 {
            return Err(DbError::not_found("Cart entry", item_id));
        }

        let restored = sqlx::query("UPDATE items SET stock = stock + 1 WHERE id = ?1")
            .bind(item_id)
            .execute(&mut *tx)
            .await?;

        if restored.rows_affected() == 0 {
            return Err(DbError::not_found("Item", item_id));
        }

        tx.commit().await?;
        Ok(())
    }

    /// Lists a user's cart: one line per entry, oldest first, with the total
    /// of current prices.
    pub async fn list(&self, user_id: UserId) -> DbResult<CartSummary> {
        let rows: Vec<CartLineRow> = sqlx::query_as(
            r#"
            SELECT
                i.id,
                i.name,
                i.price_cents,
                i.image_url,
                i.stock,
                t.id   AS tag_ref_id,
                t.name AS tag_ref_name
            FROM cart_entries c
            JOIN items i ON i.id = c.item_id
            LEFT JOIN tags t ON t.id = i.tag_id
            WHERE c.user_id = ?1
            ORDER BY c.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(CartSummary::new(
            rows.into_iter().map(CartLine::from).collect(),
        )?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures::{
        count_entries, oldest_entry, seed_item, seed_tag, seed_user, stock_of, test_db,
    };
    use crate::{Database, DbConfig};
    use shelf_core::Role;

    #[tokio::test]
    async fn test_reserve_decrements_stock() {
        let db = test_db().await;
        let seller = seed_user(&db, "seller@example.com", Role::Ordinary).await;
        let buyer = seed_user(&db, "buyer@example.com", Role::Ordinary).await;
        let tag = seed_tag(&db, "Romance").await;
        let item = seed_item(&db, &seller, &tag, 2, 3990).await;

        let entry = db.cart().reserve(item.id, buyer.id).await.unwrap();

        assert_eq!(entry.item_id, item.id);
        assert_eq!(entry.user_id, buyer.id);
        assert_eq!(stock_of(&db, item.id).await, 1);
        assert_eq!(count_entries(&db, item.id, buyer.id).await, 1);
    }

    #[tokio::test]
    async fn test_reserve_and_release_sequence_balances() {
        let db = test_db().await;
        let seller = seed_user(&db, "seller@example.com", Role::Ordinary).await;
        let buyer = seed_user(&db, "buyer@example.com", Role::Ordinary).await;
        let tag = seed_tag(&db, "Romance").await;
        let initial = 5;
        let item = seed_item(&db, &seller, &tag, initial, 1000).await;
        let cart = db.cart();

        // reserve ×4, release ×2 (k = 4, j = 2)
        for _ in 0..4 {
            cart.reserve(item.id, buyer.id).await.unwrap();
        }
        for _ in 0..2 {
            cart.release(item.id, buyer.id).await.unwrap();
        }

        assert_eq!(stock_of(&db, item.id).await, initial - 4 + 2);
        assert_eq!(count_entries(&db, item.id, buyer.id).await, 4 - 2);
    }

    #[tokio::test]
    async fn test_reserve_at_zero_stock_fails_unchanged() {
        let db = test_db().await;
        let seller = seed_user(&db, "seller@example.com", Role::Ordinary).await;
        let buyer = seed_user(&db, "buyer@example.com", Role::Ordinary).await;
        let tag = seed_tag(&db, "Romance").await;
        let item = seed_item(&db, &seller, &tag, 1, 1000).await;

        db.cart().reserve(item.id, buyer.id).await.unwrap();
        let err = db.cart().reserve(item.id, buyer.id).await.unwrap_err();

        assert!(matches!(
            err,
            DbError::Rule(CoreError::StockExhausted { item_id }) if item_id == item.id
        ));
        assert_eq!(stock_of(&db, item.id).await, 0);
        assert_eq!(count_entries(&db, item.id, buyer.id).await, 1);
    }

    #[tokio::test]
    async fn test_reserve_missing_item() {
        let db = test_db().await;
        let buyer = seed_user(&db, "buyer@example.com", Role::Ordinary).await;

        let err = db.cart().reserve(ItemId::new(42), buyer.id).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(db.cart().list(buyer.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reserve_for_unknown_user_rolls_back_stock() {
        let db = test_db().await;
        let seller = seed_user(&db, "seller@example.com", Role::Ordinary).await;
        let tag = seed_tag(&db, "Romance").await;
        let item = seed_item(&db, &seller, &tag, 2, 1000).await;
        let ghost = UserId::new(9999);

        // the decrement succeeds, then the entry insert hits the user foreign key
        let err = db.cart().reserve(item.id, ghost).await.unwrap_err();

        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
        assert_eq!(stock_of(&db, item.id).await, 2);
        assert_eq!(count_entries(&db, item.id, ghost).await, 0);

        // the connection is usable afterwards and the unit is still there
        db.cart().reserve(item.id, seller.id).await.unwrap();
        assert_eq!(stock_of(&db, item.id).await, 1);
    }

    #[tokio::test]
    async fn test_list_total_overflow_is_an_error() {
        let db = test_db().await;
        let seller = seed_user(&db, "seller@example.com", Role::Ordinary).await;
        let buyer = seed_user(&db, "buyer@example.com", Role::Ordinary).await;
        let tag = seed_tag(&db, "Romance").await;
        let half = i64::MAX / 2 + 1;
        let first = seed_item(&db, &seller, &tag, 1, half).await;
        let second = seed_item(&db, &seller, &tag, 2, half).await;

        db.cart().reserve(first.id, buyer.id).await.unwrap();
        db.cart().reserve(second.id, buyer.id).await.unwrap();

        let err = db.cart().list(buyer.id).await.unwrap_err();
        assert!(matches!(err, DbError::Rule(CoreError::AmountOverflow)));
    }

    #[tokio::test]
    async fn test_release_without_entry_fails_unchanged() {
        let db = test_db().await;
        let seller = seed_user(&db, "seller@example.com", Role::Ordinary).await;
        let buyer = seed_user(&db, "buyer@example.com", Role::Ordinary).await;
        let tag = seed_tag(&db, "Romance").await;
        let item = seed_item(&db, &seller, &tag, 3, 1000).await;

        let err = db.cart().release(item.id, buyer.id).await.unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(stock_of(&db, item.id).await, 3);
    }

    #[tokio::test]
    async fn test_release_only_touches_own_entries() {
        let db = test_db().await;
        let seller = seed_user(&db, "seller@example.com", Role::Ordinary).await;
        let ana = seed_user(&db, "ana@example.com", Role::Ordinary).await;
        let bia = seed_user(&db, "bia@example.com", Role::Ordinary).await;
        let tag = seed_tag(&db, "Romance").await;
        let item = seed_item(&db, &seller, &tag, 3, 1000).await;

        db.cart().reserve(item.id, ana.id).await.unwrap();

        assert!(db.cart().release(item.id, bia.id).await.unwrap_err().is_not_found());
        assert_eq!(count_entries(&db, item.id, ana.id).await, 1);
        assert_eq!(stock_of(&db, item.id).await, 2);
    }

    #[tokio::test]
    async fn test_release_removes_oldest_entry() {
        let db = test_db().await;
        let seller = seed_user(&db, "seller@example.com", Role::Ordinary).await;
        let buyer = seed_user(&db, "buyer@example.com", Role::Ordinary).await;
        let tag = seed_tag(&db, "Romance").await;
        let item = seed_item(&db, &seller, &tag, 3, 1000).await;

        let first = db.cart().reserve(item.id, buyer.id).await.unwrap();
        let second = db.cart().reserve(item.id, buyer.id).await.unwrap();

        db.cart().release(item.id, buyer.id).await.unwrap();

        let (oldest, _) = oldest_entry(&db, item.id, buyer.id).await.unwrap();
        assert_ne!(oldest, first.id);
        assert_eq!(oldest, second.id);
    }

    #[tokio::test]
    async fn test_list_one_line_per_entry_with_total() {
        let db = test_db().await;
        let seller = seed_user(&db, "seller@example.com", Role::Ordinary).await;
        let buyer = seed_user(&db, "buyer@example.com", Role::Ordinary).await;
        let tag = seed_tag(&db, "Romance").await;
        let dear = seed_item(&db, &seller, &tag, 5, 3990).await;
        let cheap = seed_item(&db, &seller, &tag, 5, 1050).await;

        db.cart().reserve(dear.id, buyer.id).await.unwrap();
        db.cart().reserve(cheap.id, buyer.id).await.unwrap();
        db.cart().reserve(dear.id, buyer.id).await.unwrap();

        let cart = db.cart().list(buyer.id).await.unwrap();
        let ids: Vec<ItemId> = cart.lines.iter().map(|l| l.id).collect();

        assert_eq!(ids, vec![dear.id, cheap.id, dear.id]);
        assert_eq!(cart.total, "90.30");
        assert_eq!(cart.lines[0].tag.name.as_deref(), Some("Romance"));
    }

    #[tokio::test]
    async fn test_list_uses_current_price() {
        let db = test_db().await;
        let seller = seed_user(&db, "seller@example.com", Role::Ordinary).await;
        let buyer = seed_user(&db, "buyer@example.com", Role::Ordinary).await;
        let tag = seed_tag(&db, "Romance").await;
        let item = seed_item(&db, &seller, &tag, 5, 1000).await;

        db.cart().reserve(item.id, buyer.id).await.unwrap();
        db.items()
            .update(
                item.id,
                &shelf_core::ItemChanges {
                    price: Some(Money::from_cents(1250)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(db.cart().list(buyer.id).await.unwrap().total, "12.50");
    }

    /// File-backed database so several connections really race.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_reservations_never_oversell() {
        let path = std::env::temp_dir().join(format!(
            "shelf-race-{}-{}.db",
            std::process::id(),
            Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        let db = Database::new(DbConfig::new(&path).max_connections(4)).await.unwrap();

        let seller = seed_user(&db, "seller@example.com", Role::Ordinary).await;
        let buyer = seed_user(&db, "buyer@example.com", Role::Ordinary).await;
        let tag = seed_tag(&db, "Romance").await;
        let item = seed_item(&db, &seller, &tag, 3, 1000).await;

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cart = db.cart();
            let (item_id, user_id) = (item.id, buyer.id);
            handles.push(tokio::spawn(async move { cart.reserve(item_id, user_id).await }));
        }

        let mut won = 0;
        let mut exhausted = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => won += 1,
                Err(DbError::Rule(CoreError::StockExhausted { .. })) => exhausted += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(won, 3);
        assert_eq!(exhausted, 5);
        assert_eq!(stock_of(&db, item.id).await, 0);
        assert_eq!(count_entries(&db, item.id, buyer.id).await, 3);

        db.close().await;
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
        }
    }
}
