//! Category service implementation

use tracing::info;
use crate::database::repositories::CategoryRepository;
use crate::models::{Category, CreateCategoryRequest, Page};
use crate::utils::errors::{EwmError, Result};
use crate::utils::helpers::{check_length, check_not_blank};

const NAME_LENGTH: (usize, usize) = (1, 50);

#[derive(Clone, Debug)]
pub struct CategoryService {
    category_repository: CategoryRepository,
}

impl CategoryService {
    pub fn new(category_repository: CategoryRepository) -> Self {
        Self { category_repository }
    }

    pub async fn create_category(&self, request: CreateCategoryRequest) -> Result<Category> {
        let name = validate_name(&request.name)?;
        let category = self.category_repository.create(name).await?;
        info!(category_id = category.id, name = %category.name, "Category created");
        Ok(category)
    }

    pub async fn get_category(&self, category_id: i64) -> Result<Category> {
        self.category_repository.find_by_id(category_id).await?
            .ok_or_else(|| EwmError::not_found(format!("Category {} not found", category_id)))
    }

    pub async fn list_categories(&self, page: Page) -> Result<Vec<Category>> {
        self.category_repository.list(page).await
    }

    pub async fn rename_category(&self, category_id: i64, request: CreateCategoryRequest) -> Result<Category> {
        let name = validate_name(&request.name)?;
        let category = self.category_repository.rename(category_id, name).await?
            .ok_or_else(|| EwmError::not_found(format!("Category {} not found", category_id)))?;
        info!(category_id = category.id, name = %category.name, "Category renamed");
        Ok(category)
    }

    /// Delete a category no event refers to
    pub async fn delete_category(&self, category_id: i64) -> Result<()> {
        if self.category_repository.has_events(category_id).await? {
            return Err(EwmError::conflict(format!("Category {} is used by events", category_id)));
        }
        if !self.category_repository.delete(category_id).await? {
            return Err(EwmError::not_found(format!("Category {} not found", category_id)));
        }
        info!(category_id = category_id, "Category deleted");
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<&str> {
    check_not_blank("name", name)?;
    let name = name.trim();
    check_length("name", name, NAME_LENGTH.0, NAME_LENGTH.1)?;
    Ok(name)
}
