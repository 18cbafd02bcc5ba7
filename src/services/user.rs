//! User service implementation
//! 
//! This service handles user registration, lookup, removal and the
//! rating-ordered user listing.

use tracing::{info, debug};
use crate::database::repositories::UserRepository;
use crate::models::{CreateUserRequest, Page, RatingOrder, User};
use crate::utils::errors::{EwmError, Result};
use crate::utils::helpers::{check_length, is_valid_email};

const NAME_LENGTH: (usize, usize) = (2, 250);
const EMAIL_LENGTH: (usize, usize) = (6, 254);

/// User service for managing user operations
#[derive(Clone, Debug)]
pub struct UserService {
    user_repository: UserRepository,
}

impl UserService {
    /// Create a new UserService instance
    pub fn new(user_repository: UserRepository) -> Self {
        Self { user_repository }
    }

    /// Register a new user
    pub async fn create_user(&self, request: CreateUserRequest) -> Result<User> {
        let name = request.name.trim();
        let email = request.email.trim();
        debug!(email = %email, "Registering user");

        check_length("name", name, NAME_LENGTH.0, NAME_LENGTH.1)?;
        check_length("email", email, EMAIL_LENGTH.0, EMAIL_LENGTH.1)?;
        if !is_valid_email(email) {
            return Err(EwmError::validation(format!("Email '{}' is malformed", email)));
        }

        let user = self.user_repository.create(name, email).await?;
        info!(user_id = user.id, "New user registered successfully");

        Ok(user)
    }

    /// Users by id, or every user when `ids` is empty
    pub async fn get_users(&self, ids: &[i64], page: Page) -> Result<Vec<User>> {
        debug!(ids = ids.len(), from = page.from, size = page.size, "Listing users");
        if ids.is_empty() {
            self.user_repository.list(page).await
        } else {
            self.user_repository.find_by_ids(ids, page).await
        }
    }

    /// Get user by ID
    pub async fn get_user(&self, user_id: i64) -> Result<User> {
        self.user_repository.find_by_id(user_id).await?
            .ok_or_else(|| EwmError::not_found(format!("User {} not found", user_id)))
    }

    /// Delete a user that has no events, requests or votes
    pub async fn delete_user(&self, user_id: i64) -> Result<()> {
        if !self.user_repository.delete(user_id).await? {
            return Err(EwmError::not_found(format!("User {} not found", user_id)));
        }
        info!(user_id = user_id, "User deleted");
        Ok(())
    }

    /// Users ordered by reputation
    pub async fn list_users_by_rating(&self, order: RatingOrder, page: Page) -> Result<Vec<User>> {
        self.user_repository.list_by_rating(order, page).await
    }
}
