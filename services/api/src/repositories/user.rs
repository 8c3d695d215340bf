//! User repository for database operations

use anyhow::Result;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::info;

use crate::models::{NewUser, UpdateUser, User};

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

fn map_user(row: &SqliteRow) -> User {
    User {
        id: row.get("id"),
        name: row.get("name"),
        login_id: row.get("login_id"),
        password: row.get("password"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new user
    pub async fn create(&self, new_user: &NewUser) -> Result<User> {
        info!("Creating new user: {}", new_user.login_id);

        let now = Utc::now();
        let row = sqlx::query(
            r#"
            INSERT INTO users (name, login_id, password, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, name, login_id, password, created_at, updated_at
            "#,
        )
        .bind(&new_user.name)
        .bind(&new_user.login_id)
        .bind(&new_user.password)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(map_user(&row))
    }

    /// Find a user by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, login_id, password, created_at, updated_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_user))
    }

    /// Find a user by login_id
    pub async fn find_by_login_id(&self, login_id: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, login_id, password, created_at, updated_at
            FROM users
            WHERE login_id = ?
            "#,
        )
        .bind(login_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_user))
    }

    /// Get all users, newest first
    pub async fn get_all(&self) -> Result<Vec<User>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, login_id, password, created_at, updated_at
            FROM users
            ORDER BY id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_user).collect())
    }

    /// Update a user, refreshing `updated_at`. Unset fields keep their value.
    /// Returns `None` when the user does not exist.
    pub async fn update(&self, id: i64, update: &UpdateUser) -> Result<Option<User>> {
        let Some(existing) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        info!("Updating user: {}", id);

        let name = update.name.clone().unwrap_or(existing.name);
        let login_id = update.login_id.clone().unwrap_or(existing.login_id);
        let password = update.password.clone().unwrap_or(existing.password);

        let row = sqlx::query(
            r#"
            UPDATE users
            SET name = ?, login_id = ?, password = ?, updated_at = ?
            WHERE id = ?
            RETURNING id, name, login_id, password, created_at, updated_at
            "#,
        )
        .bind(&name)
        .bind(&login_id)
        .bind(&password)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_user))
    }

    /// Delete a user. Returns true when a row was removed.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        info!("Deleting user: {}", id);

        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
