//! # Tag Repository
//!
//! Tags ("filtros") and the cascading tag removal.
//!
//! ## Cascade Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  delete_cascade(tag)          one transaction, dependents first         │
//! │                                                                         │
//! │  1. DELETE cart_entries  of items tagged `tag`                         │
//! │  2. DELETE items         tagged `tag`                                  │
//! │  3. DELETE tags          row itself (0 rows → NotFound, rollback)      │
//! │                                                                         │
//! │  Foreign keys are enforced, so any other order would fail.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use shelf_core::{Tag, TagId};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};

#[derive(Debug, sqlx::FromRow)]
struct TagRow {
    id: TagId,
    name: String,
}

impl From<TagRow> for Tag {
    fn from(row: TagRow) -> Self {
        Tag {
            id: row.id,
            name: row.name,
        }
    }
}

/// What a tag removal took with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagDeletion {
    pub items_removed: u64,
    pub entries_removed: u64,
}

/// Repository for tag database operations.
#[derive(Debug, Clone)]
pub struct TagRepository {
    pool: SqlitePool,
}

impl TagRepository {
    /// Creates a new TagRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TagRepository { pool }
    }

    /// Lists all tags, ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Tag>> {
        let rows: Vec<TagRow> = sqlx::query_as("SELECT id, name FROM tags ORDER BY name, id")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Tag::from).collect())
    }

    /// Gets a tag by ID.
    pub async fn get_by_id(&self, id: TagId) -> DbResult<Option<Tag>> {
        let row: Option<TagRow> = sqlx::query_as("SELECT id, name FROM tags WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Tag::from))
    }

    /// Returns true if the tag exists.
    pub async fn exists(&self, id: TagId) -> DbResult<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM tags WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(found.is_some())
    }

    /// Inserts a tag.
    ///
    /// ## Errors
    /// - `DbError::UniqueViolation` when the name is taken
    pub async fn insert(&self, name: &str) -> DbResult<Tag> {
        debug!(name = %name, "Inserting tag");

        let result = sqlx::query("INSERT INTO tags (name) VALUES (?1)")
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(|e| match DbError::from(e) {
                err if err.is_unique_violation() => DbError::duplicate("tag name", name),
                err => err,
            })?;

        Ok(Tag {
            id: TagId::new(result.last_insert_rowid()),
            name: name.to_string(),
        })
    }

    /// Deletes a tag together with its items and their cart entries.
    ///
    /// All or nothing: on any error the transaction is rolled back.
    ///
    /// ## Errors
    /// - `DbError::NotFound` when the tag doesn't exist
    pub async fn delete_cascade(&self, id: TagId) -> DbResult<TagDeletion> {
        debug!(tag_id = %id, "Deleting tag with cascade");

        let mut tx = self.pool.begin().await?;

        let entries = sqlx::query(
            r#"
            DELETE FROM cart_entries
            WHERE item_id IN (SELECT id FROM items WHERE tag_id = ?1)
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let items = sqlx::query("DELETE FROM items WHERE tag_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let tag = sqlx::query("DELETE FROM tags WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if tag.rows_affected() == 0 {
            // Dropping `tx` rolls back
            return Err(DbError::not_found("Tag", id));
        }

        tx.commit().await?;

        let deletion = TagDeletion {
            items_removed: items.rows_affected(),
            entries_removed: entries.rows_affected(),
        };
        debug!(
            tag_id = %id,
            items = deletion.items_removed,
            entries = deletion.entries_removed,
            "Tag deleted"
        );

        Ok(deletion)
    }
}
