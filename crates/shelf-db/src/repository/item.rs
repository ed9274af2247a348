//! # Item Repository
//!
//! Catalog items (books) and their read projections.
//!
//! ## Projections
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Item         stored row          get()                                │
//! │  ItemSummary  item + tag ref      list(), list_by_owner(), list_by_tag │
//! │  ItemDetail   summary + owner     get_detail()                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stock is written only on insert here. Every later stock change goes
//! through the cart ledger ([`CartRepository`](super::cart::CartRepository)).

use shelf_core::{
    Item, ItemChanges, ItemDetail, ItemId, ItemSummary, Money, NewItem, OwnerRef, TagId, TagRef,
    UserId,
};
use sqlx::SqlitePool;
use tracing::debug;

use super::ITEM_SUMMARY_SELECT;
use crate::error::{DbError, DbResult};

// =============================================================================
// Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct ItemRow {
    id: ItemId,
    name: String,
    price_cents: i64,
    image_url: String,
    stock: i64,
    description: String,
    owner_id: UserId,
    tag_id: TagId,
}

impl From<ItemRow> for Item {
    fn from(row: ItemRow) -> Self {
        Item {
            id: row.id,
            name: row.name,
            price: Money::from_cents(row.price_cents),
            image_url: row.image_url,
            stock: row.stock,
            description: row.description,
            owner_id: row.owner_id,
            tag_id: row.tag_id,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ItemSummaryRow {
    id: ItemId,
    name: String,
    price_cents: i64,
    image_url: String,
    stock: i64,
    description: String,
    tag_ref_id: Option<TagId>,
    tag_ref_name: Option<String>,
}

impl From<ItemSummaryRow> for ItemSummary {
    fn from(row: ItemSummaryRow) -> Self {
        ItemSummary {
            id: row.id,
            name: row.name,
            price: Money::from_cents(row.price_cents),
            image_url: row.image_url,
            stock: row.stock,
            description: row.description,
            tag: TagRef::new(row.tag_ref_id, row.tag_ref_name),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ItemDetailRow {
    #[sqlx(flatten)]
    summary: ItemSummaryRow,
    owner_id: UserId,
    owner_name: String,
}

impl From<ItemDetailRow> for ItemDetail {
    fn from(row: ItemDetailRow) -> Self {
        ItemDetail {
            item: row.summary.into(),
            owner: OwnerRef {
                id: row.owner_id,
                name: row.owner_name,
            },
        }
    }
}

const ITEM_SELECT: &str = r#"
    SELECT
        id, name, price_cents, image_url, stock, description, owner_id, tag_id
    FROM items
"#;

// =============================================================================
// Repository
// =============================================================================

/// Repository for item database operations.
#[derive(Debug, Clone)]
pub struct ItemRepository {
    pool: SqlitePool,
}

impl ItemRepository {
    /// Creates a new ItemRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ItemRepository { pool }
    }

    /// Gets the stored item by ID.
    pub async fn get(&self, id: ItemId) -> DbResult<Option<Item>> {
        let row: Option<ItemRow> = sqlx::query_as(&format!("{ITEM_SELECT} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Item::from))
    }

    /// Gets the single-item projection (with tag and owner).
    pub async fn get_detail(&self, id: ItemId) -> DbResult<Option<ItemDetail>> {
        let row: Option<ItemDetailRow> = sqlx::query_as(
            r#"
            SELECT
                i.id,
                i.name,
                i.price_cents,
                i.image_url,
                i.stock,
                i.description,
                t.id   AS tag_ref_id,
                t.name AS tag_ref_name,
                u.id   AS owner_id,
                u.name AS owner_name
            FROM items i
            LEFT JOIN tags t ON t.id = i.tag_id
            JOIN users u ON u.id = i.owner_id
            WHERE i.id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ItemDetail::from))
    }

    /// Lists every item.
    pub async fn list(&self) -> DbResult<Vec<ItemSummary>> {
        let rows: Vec<ItemSummaryRow> =
            sqlx::query_as(&format!("{ITEM_SUMMARY_SELECT} ORDER BY i.id"))
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(ItemSummary::from).collect())
    }

    /// Lists items owned by a user. Unknown users simply own nothing.
    pub async fn list_by_owner(&self, owner: UserId) -> DbResult<Vec<ItemSummary>> {
        let rows: Vec<ItemSummaryRow> = sqlx::query_as(&format!(
            "{ITEM_SUMMARY_SELECT} WHERE i.owner_id = ?1 ORDER BY i.id"
        ))
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ItemSummary::from).collect())
    }

    /// Lists items carrying a tag.
    pub async fn list_by_tag(&self, tag: TagId) -> DbResult<Vec<ItemSummary>> {
        let rows: Vec<ItemSummaryRow> = sqlx::query_as(&format!(
            "{ITEM_SUMMARY_SELECT} WHERE i.tag_id = ?1 ORDER BY i.id"
        ))
        .bind(tag)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ItemSummary::from).collect())
    }

    /// Inserts a validated item.
    ///
    /// ## Errors
    /// - `DbError::ForeignKeyViolation` if owner or tag vanished meanwhile
    pub async fn insert(&self, item: &NewItem) -> DbResult<Item> {
        debug!(
            owner_id = %item.owner_id,
            tag_id = %item.tag_id,
            stock = item.stock,
            "Inserting item"
        );

        let result = sqlx::query(
            r#"
            INSERT INTO items (
                name, price_cents, image_url, stock, description, owner_id, tag_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&item.name)
        .bind(item.price.cents())
        .bind(&item.image_url)
        .bind(item.stock)
        .bind(&item.description)
        .bind(item.owner_id)
        .bind(item.tag_id)
        .execute(&self.pool)
        .await?;

        Ok(Item {
            id: ItemId::new(result.last_insert_rowid()),
            name: item.name.clone(),
            price: item.price,
            image_url: item.image_url.clone(),
            stock: item.stock,
            description: item.description.clone(),
            owner_id: item.owner_id,
            tag_id: item.tag_id,
        })
    }

    /// Applies changes to an item. Never touches stock.
    ///
    /// ## Errors
    /// - `DbError::NotFound` when the item doesn't exist
    pub async fn update(&self, id: ItemId, changes: &ItemChanges) -> DbResult<Item> {
        debug!(item_id = %id, "Updating item");

        let result = sqlx::query(
            r#"
            UPDATE items SET
                name = COALESCE(?2, name),
                price_cents = COALESCE(?3, price_cents),
                image_url = COALESCE(?4, image_url),
                description = COALESCE(?5, description),
                tag_id = COALESCE(?6, tag_id)
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(changes.name.as_deref())
        .bind(changes.price.map(|p| p.cents()))
        .bind(changes.image_url.as_deref())
        .bind(changes.description.as_deref())
        .bind(changes.tag_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Item", id));
        }

        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Item", id))
    }

    /// Deletes an item and every cart entry reserving it, in one transaction.
    ///
    /// Returns the number of cart entries removed.
    ///
    /// ## Errors
    /// - `DbError::NotFound` when the item doesn't exist (nothing is removed)
    pub async fn delete_cascade(&self, id: ItemId) -> DbResult<u64> {
        debug!(item_id = %id, "Deleting item with cascade");

        let mut tx = self.pool.begin().await?;

        let entries = sqlx::query("DELETE FROM cart_entries WHERE item_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let item = sqlx::query("DELETE FROM items WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if item.rows_affected() == 0 {
            return Err(DbError::not_found("Item", id));
        }

        tx.commit().await?;

        Ok(entries.rows_affected())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures::{seed_item, seed_tag, seed_user, stock_of, test_db};
    use shelf_core::Role;

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = test_db().await;
        let owner = seed_user(&db, "owner@example.com", Role::Ordinary).await;
        let tag = seed_tag(&db, "Ficção").await;

        let item = seed_item(&db, &owner, &tag, 4, 2990).await;
        let loaded = db.items().get(item.id).await.unwrap().unwrap();

        assert_eq!(loaded, item);
        assert_eq!(loaded.price, Money::from_cents(2990));
        assert!(db.items().get(ItemId::new(999)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_detail_carries_tag_and_owner() {
        let db = test_db().await;
        let owner = seed_user(&db, "owner@example.com", Role::Ordinary).await;
        let tag = seed_tag(&db, "Ficção").await;
        let item = seed_item(&db, &owner, &tag, 1, 1000).await;

        let detail = db.items().get_detail(item.id).await.unwrap().unwrap();
        assert_eq!(detail.item.tag, TagRef::new(Some(tag.id), Some("Ficção".to_string())));
        assert_eq!(detail.owner.id, owner.id);
        assert_eq!(detail.owner.name, owner.name);

        assert!(db.items().get_detail(ItemId::new(999)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_filters() {
        let db = test_db().await;
        let ana = seed_user(&db, "ana@example.com", Role::Ordinary).await;
        let bia = seed_user(&db, "bia@example.com", Role::Ordinary).await;
        let romance = seed_tag(&db, "Romance").await;
        let poesia = seed_tag(&db, "Poesia").await;

        let a1 = seed_item(&db, &ana, &romance, 1, 100).await;
        let a2 = seed_item(&db, &ana, &poesia, 1, 200).await;
        let b1 = seed_item(&db, &bia, &romance, 1, 300).await;

        let ids = |items: Vec<ItemSummary>| items.into_iter().map(|i| i.id).collect::<Vec<_>>();

        assert_eq!(ids(db.items().list().await.unwrap()), vec![a1.id, a2.id, b1.id]);
        assert_eq!(ids(db.items().list_by_owner(ana.id).await.unwrap()), vec![a1.id, a2.id]);
        assert_eq!(ids(db.items().list_by_tag(romance.id).await.unwrap()), vec![a1.id, b1.id]);
        assert!(db.items().list_by_owner(UserId::new(404)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_never_touches_stock() {
        let db = test_db().await;
        let owner = seed_user(&db, "owner@example.com", Role::Ordinary).await;
        let romance = seed_tag(&db, "Romance").await;
        let poesia = seed_tag(&db, "Poesia").await;
        let item = seed_item(&db, &owner, &romance, 3, 1000).await;

        let changes = ItemChanges {
            price: Some(Money::from_cents(1500)),
            tag_id: Some(poesia.id),
            ..Default::default()
        };
        let updated = db.items().update(item.id, &changes).await.unwrap();

        assert_eq!(updated.price, Money::from_cents(1500));
        assert_eq!(updated.tag_id, poesia.id);
        assert_eq!(updated.name, item.name);
        assert_eq!(updated.stock, 3);
    }

    #[tokio::test]
    async fn test_update_missing_item() {
        let db = test_db().await;

        let err = db
            .items()
            .update(ItemId::new(5), &ItemChanges::default())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_cascades_cart_entries() {
        let db = test_db().await;
        let owner = seed_user(&db, "owner@example.com", Role::Ordinary).await;
        let buyer = seed_user(&db, "buyer@example.com", Role::Ordinary).await;
        let tag = seed_tag(&db, "Romance").await;
        let item = seed_item(&db, &owner, &tag, 3, 1000).await;

        db.cart().reserve(item.id, buyer.id).await.unwrap();
        db.cart().reserve(item.id, buyer.id).await.unwrap();
        assert_eq!(stock_of(&db, item.id).await, 1);

        let removed = db.items().delete_cascade(item.id).await.unwrap();
        assert_eq!(removed, 2);
        assert!(db.items().get(item.id).await.unwrap().is_none());
        assert!(db.cart().list(buyer.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_item() {
        let db = test_db().await;

        let err = db.items().delete_cascade(ItemId::new(8)).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_negative_stock_rejected_by_schema() {
        let db = test_db().await;
        let owner = seed_user(&db, "owner@example.com", Role::Ordinary).await;
        let tag = seed_tag(&db, "Romance").await;
        let item = seed_item(&db, &owner, &tag, 1, 1000).await;

        let result = sqlx::query("UPDATE items SET stock = -1 WHERE id = ?1")
            .bind(item.id)
            .execute(db.pool())
            .await;

        assert!(result.is_err());
        assert_eq!(stock_of(&db, item.id).await, 1);
    }
}
