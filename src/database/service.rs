//! Database service layer
//! 
//! This module bundles the repositories behind one handle and hands out transactions

use sqlx::{Postgres, Transaction};
use crate::database::{DatabasePool, UserRepository, CategoryRepository, EventRepository, RequestRepository, VoteRepository};
use crate::utils::errors::EwmError;

#[derive(Debug, Clone)]
pub struct DatabaseService {
    pool: DatabasePool,
    pub users: UserRepository,
    pub categories: CategoryRepository,
    pub events: EventRepository,
    pub requests: RequestRepository,
    pub votes: VoteRepository,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            categories: CategoryRepository::new(pool.clone()),
            events: EventRepository::new(pool.clone()),
            requests: RequestRepository::new(pool.clone()),
            votes: VoteRepository::new(),
            pool,
        }
    }

    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }

    /// Open a transaction; dropping it without commit rolls back
    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, EwmError> {
        Ok(self.pool.begin().await?)
    }

    /// Check database health
    pub async fn health_check(&self) -> Result<(), EwmError> {
        super::connection::health_check(&self.pool).await
    }
}
