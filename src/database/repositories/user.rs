//! User repository implementation

use sqlx::{PgConnection, PgPool};
use crate::models::{Page, RatingOrder, User};
use crate::utils::errors::EwmError;

const USER_COLUMNS: &str = "id, name, email, rating";

#[derive(Clone)]
#[derive(Debug)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user; a taken email surfaces as a conflict
    pub async fn create(&self, name: &str, email: &str) -> Result<User, EwmError> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (name, email) VALUES ($1, $2) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(name)
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| EwmError::from_constraint(e, format!("Email '{}' is already registered", email)))
    }

    /// Find user by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, EwmError> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Check existence inside a transaction
    pub async fn exists(&self, conn: &mut PgConnection, id: i64) -> Result<bool, EwmError> {
        let found: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await?;

        Ok(found.is_some())
    }

    /// Lock a user row for a rating rewrite
    pub async fn lock(&self, conn: &mut PgConnection, id: i64) -> Result<Option<User>, EwmError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1 FOR UPDATE",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(user)
    }

    pub async fn set_rating(&self, conn: &mut PgConnection, id: i64, rating: i64) -> Result<(), EwmError> {
        sqlx::query("UPDATE users SET rating = $2 WHERE id = $1")
            .bind(id)
            .bind(rating)
            .execute(conn)
            .await?;

        Ok(())
    }

    /// Delete user, returning whether a row was removed
    pub async fn delete(&self, id: i64) -> Result<bool, EwmError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| EwmError::from_constraint(e, format!("User {} still has events, requests or votes", id)))?;

        Ok(result.rows_affected() > 0)
    }

    /// List users with pagination
    pub async fn list(&self, page: Page) -> Result<Vec<User>, EwmError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users ORDER BY id ASC LIMIT $1 OFFSET $2",
            USER_COLUMNS
        ))
        .bind(page.size)
        .bind(page.from)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// List the given users with pagination
    pub async fn find_by_ids(&self, ids: &[i64], page: Page) -> Result<Vec<User>, EwmError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = ANY($1) ORDER BY id ASC LIMIT $2 OFFSET $3",
            USER_COLUMNS
        ))
        .bind(ids)
        .bind(page.size)
        .bind(page.from)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// List users ordered by rating, ties broken by id
    pub async fn list_by_rating(&self, order: RatingOrder, page: Page) -> Result<Vec<User>, EwmError> {
        let direction = match order {
            RatingOrder::Asc => "ASC",
            RatingOrder::Desc => "DESC",
        };
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users ORDER BY rating {}, id ASC LIMIT $1 OFFSET $2",
            USER_COLUMNS, direction
        ))
        .bind(page.size)
        .bind(page.from)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }
}
