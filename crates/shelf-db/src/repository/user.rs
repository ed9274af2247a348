//! # User Repository
//!
//! Accounts: registration rows, lookup by id or email, profile updates.
//! Credential hashing happens in shelf-api; this layer only stores the PHC
//! string.

use chrono::{DateTime, NaiveDate, Utc};
use shelf_core::{NewUser, Role, User, UserId};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};

/// Row shape of `users`.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: UserId,
    name: String,
    email: String,
    cep: Option<String>,
    cpf: Option<String>,
    birth_date: NaiveDate,
    age: i64,
    password_hash: String,
    role: Role,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            name: row.name,
            email: row.email,
            cep: row.cep,
            cpf: row.cpf,
            birth_date: row.birth_date,
            age: row.age,
            password_hash: row.password_hash,
            role: row.role,
            created_at: row.created_at,
        }
    }
}

const USER_SELECT: &str = r#"
    SELECT
        id, name, email, cep, cpf, birth_date, age,
        password_hash, role, created_at
    FROM users
"#;

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Inserts a new account.
    ///
    /// ## Errors
    /// - `DbError::UniqueViolation` when the email is taken
    pub async fn insert(&self, user: &NewUser) -> DbResult<User> {
        debug!(email = %user.email, role = ?user.role, "Inserting user");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO users (
                name, email, cep, cpf, birth_date, age,
                password_hash, role, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.cep)
        .bind(&user.cpf)
        .bind(user.birth_date)
        .bind(user.age)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(User {
            id: UserId::new(result.last_insert_rowid()),
            name: user.name.clone(),
            email: user.email.clone(),
            cep: user.cep.clone(),
            cpf: user.cpf.clone(),
            birth_date: user.birth_date,
            age: user.age,
            password_hash: user.password_hash.clone(),
            role: user.role,
            created_at: now,
        })
    }

    /// Gets a user by ID.
    pub async fn get_by_id(&self, id: UserId) -> DbResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(&format!("{USER_SELECT} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(User::from))
    }

    /// Gets a user by email (exact match).
    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(&format!("{USER_SELECT} WHERE email = ?1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(User::from))
    }

    /// Changes name and/or email. `None` leaves the column as is.
    ///
    /// ## Errors
    /// - `DbError::NotFound` when the user doesn't exist
    /// - `DbError::UniqueViolation` when the new email is taken
    pub async fn update(
        &self,
        id: UserId,
        name: Option<&str>,
        email: Option<&str>,
    ) -> DbResult<User> {
        debug!(user_id = %id, "Updating user");

        let result = sqlx::query(
            r#"
            UPDATE users SET
                name = COALESCE(?2, name),
                email = COALESCE(?3, email)
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("User", id))
    }

    /// Counts accounts (for diagnostics and seeding).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
