//! Participation request repository implementation

use sqlx::{PgConnection, PgPool};
use chrono::Utc;
use crate::models::request::{ParticipationRequest, RequestStatus, REQUEST_COLUMNS};
use crate::utils::errors::EwmError;

#[derive(Clone)]
#[derive(Debug)]
pub struct RequestRepository {
    pool: PgPool,
}

impl RequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a request; a second live request for the pair surfaces as a conflict
    pub async fn create(
        &self,
        conn: &mut PgConnection,
        event_id: i64,
        requester_id: i64,
        status: RequestStatus,
    ) -> Result<ParticipationRequest, EwmError> {
        sqlx::query_as::<_, ParticipationRequest>(&format!(
            r#"
            INSERT INTO participation_requests (event_id, requester_id, created, status)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            REQUEST_COLUMNS
        ))
        .bind(event_id)
        .bind(requester_id)
        .bind(Utc::now())
        .bind(status)
        .fetch_one(conn)
        .await
        .map_err(|e| {
            EwmError::from_constraint(
                e,
                format!("User {} already has a request for event {}", requester_id, event_id),
            )
        })
    }

    /// Find request by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<ParticipationRequest>, EwmError> {
        let request = sqlx::query_as::<_, ParticipationRequest>(&format!(
            "SELECT {} FROM participation_requests WHERE id = $1",
            REQUEST_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    /// Lock a request row for the rest of the transaction
    pub async fn lock(&self, conn: &mut PgConnection, id: i64) -> Result<Option<ParticipationRequest>, EwmError> {
        let request = sqlx::query_as::<_, ParticipationRequest>(&format!(
            "SELECT {} FROM participation_requests WHERE id = $1 FOR UPDATE",
            REQUEST_COLUMNS
        ))
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(request)
    }

    /// Lock every listed request that belongs to `event_id`
    pub async fn lock_for_event(
        &self,
        conn: &mut PgConnection,
        event_id: i64,
        ids: &[i64],
    ) -> Result<Vec<ParticipationRequest>, EwmError> {
        let requests = sqlx::query_as::<_, ParticipationRequest>(&format!(
            "SELECT {} FROM participation_requests WHERE event_id = $1 AND id = ANY($2) ORDER BY id FOR UPDATE",
            REQUEST_COLUMNS
        ))
        .bind(event_id)
        .bind(ids)
        .fetch_all(conn)
        .await?;

        Ok(requests)
    }

    pub async fn set_status(
        &self,
        conn: &mut PgConnection,
        id: i64,
        status: RequestStatus,
    ) -> Result<ParticipationRequest, EwmError> {
        let request = sqlx::query_as::<_, ParticipationRequest>(&format!(
            "UPDATE participation_requests SET status = $2 WHERE id = $1 RETURNING {}",
            REQUEST_COLUMNS
        ))
        .bind(id)
        .bind(status)
        .fetch_one(conn)
        .await?;

        Ok(request)
    }

    /// Whether the user holds a non-canceled request for the event
    pub async fn has_live(&self, conn: &mut PgConnection, requester_id: i64, event_id: i64) -> Result<bool, EwmError> {
        let (exists,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM participation_requests
                WHERE requester_id = $1 AND event_id = $2 AND status <> 'CANCELED'
            )
            "#
        )
        .bind(requester_id)
        .bind(event_id)
        .fetch_one(conn)
        .await?;

        Ok(exists)
    }

    /// Whether the user holds a confirmed request for the event
    pub async fn has_confirmed(&self, conn: &mut PgConnection, requester_id: i64, event_id: i64) -> Result<bool, EwmError> {
        let (exists,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM participation_requests
                WHERE requester_id = $1 AND event_id = $2 AND status = 'CONFIRMED'
            )
            "#
        )
        .bind(requester_id)
        .bind(event_id)
        .fetch_one(conn)
        .await?;

        Ok(exists)
    }

    /// Requests submitted by a user, oldest first
    pub async fn find_by_requester(&self, requester_id: i64) -> Result<Vec<ParticipationRequest>, EwmError> {
        let requests = sqlx::query_as::<_, ParticipationRequest>(&format!(
            "SELECT {} FROM participation_requests WHERE requester_id = $1 ORDER BY created ASC, id ASC",
            REQUEST_COLUMNS
        ))
        .bind(requester_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    /// Requests against an event, oldest first
    pub async fn find_by_event(&self, event_id: i64) -> Result<Vec<ParticipationRequest>, EwmError> {
        let requests = sqlx::query_as::<_, ParticipationRequest>(&format!(
            "SELECT {} FROM participation_requests WHERE event_id = $1 ORDER BY created ASC, id ASC",
            REQUEST_COLUMNS
        ))
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }
}
