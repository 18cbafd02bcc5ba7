//! Category repository implementation

use sqlx::PgPool;
use crate::models::{Category, Page};
use crate::utils::errors::EwmError;

#[derive(Clone)]
#[derive(Debug)]
pub struct CategoryRepository {
    pool: PgPool,
}

impl CategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new category; a taken name surfaces as a conflict
    pub async fn create(&self, name: &str) -> Result<Category, EwmError> {
        sqlx::query_as::<_, Category>("INSERT INTO categories (name) VALUES ($1) RETURNING id, name")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| EwmError::from_constraint(e, format!("Category '{}' already exists", name)))
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Category>, EwmError> {
        let category = sqlx::query_as::<_, Category>("SELECT id, name FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(category)
    }

    pub async fn rename(&self, id: i64, name: &str) -> Result<Option<Category>, EwmError> {
        sqlx::query_as::<_, Category>("UPDATE categories SET name = $2 WHERE id = $1 RETURNING id, name")
            .bind(id)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| EwmError::from_constraint(e, format!("Category '{}' already exists", name)))
    }

    /// Delete category, returning whether a row was removed
    pub async fn delete(&self, id: i64) -> Result<bool, EwmError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| EwmError::from_constraint(e, format!("Category {} is used by events", id)))?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn has_events(&self, id: i64) -> Result<bool, EwmError> {
        let (exists,): (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM events WHERE category_id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    /// List categories with pagination
    pub async fn list(&self, page: Page) -> Result<Vec<Category>, EwmError> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name FROM categories ORDER BY id ASC LIMIT $1 OFFSET $2"
        )
        .bind(page.size)
        .bind(page.from)
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }
}
