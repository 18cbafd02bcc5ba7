//! Event repository implementation

use std::time::Instant;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use chrono::{DateTime, Utc};
use crate::models::event::{Event, CreateEventRequest, EVENT_COLUMNS};
use crate::models::Page;
use crate::query::{EventFilter, EventOrder};
use crate::utils::errors::EwmError;
use crate::utils::logging::log_database_operation;

#[derive(Clone)]
#[derive(Debug)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new pending event from a validated draft
    pub async fn create(
        &self,
        initiator_id: i64,
        draft: &CreateEventRequest,
        created_on: DateTime<Utc>,
    ) -> Result<Event, EwmError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            r#"
            INSERT INTO events (category_id, initiator_id, annotation, description, title, event_date,
                                created_on, lat, lon, paid, participant_limit, request_moderation)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {}
            "#,
            EVENT_COLUMNS
        ))
        .bind(draft.category)
        .bind(initiator_id)
        .bind(&draft.annotation)
        .bind(&draft.description)
        .bind(&draft.title)
        .bind(draft.event_date)
        .bind(created_on)
        .bind(draft.location.lat)
        .bind(draft.location.lon)
        .bind(draft.paid.unwrap_or(false))
        .bind(draft.participant_limit.unwrap_or(0))
        .bind(draft.request_moderation.unwrap_or(true))
        .fetch_one(&self.pool)
        .await?;

        Ok(event)
    }

    /// Find event by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Event>, EwmError> {
        let event = sqlx::query_as::<_, Event>(&format!("SELECT {} FROM events WHERE id = $1", EVENT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(event)
    }

    /// Lock an event row for the rest of the transaction
    pub async fn lock(&self, conn: &mut PgConnection, id: i64) -> Result<Option<Event>, EwmError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            "SELECT {} FROM events WHERE id = $1 FOR UPDATE",
            EVENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(event)
    }

    /// Persist every mutable column of a locked event
    pub async fn save(&self, conn: &mut PgConnection, event: &Event) -> Result<Event, EwmError> {
        sqlx::query_as::<_, Event>(&format!(
            r#"
            UPDATE events
            SET category_id = $2,
                annotation = $3,
                description = $4,
                title = $5,
                event_date = $6,
                published_on = $7,
                lat = $8,
                lon = $9,
                paid = $10,
                participant_limit = $11,
                request_moderation = $12,
                state = $13
            WHERE id = $1
            RETURNING {}
            "#,
            EVENT_COLUMNS
        ))
        .bind(event.id)
        .bind(event.category_id)
        .bind(&event.annotation)
        .bind(&event.description)
        .bind(&event.title)
        .bind(event.event_date)
        .bind(event.published_on)
        .bind(event.location.lat)
        .bind(event.location.lon)
        .bind(event.paid)
        .bind(event.participant_limit)
        .bind(event.request_moderation)
        .bind(event.state)
        .fetch_one(conn)
        .await
        .map_err(|e| EwmError::from_constraint(e, format!("Event {} update violates a capacity rule", event.id)))
    }

    /// Take one seat if one is free. `None` means the event is full.
    pub async fn increment_confirmed(&self, conn: &mut PgConnection, id: i64) -> Result<Option<i32>, EwmError> {
        let row: Option<(i32,)> = sqlx::query_as(
            r#"
            UPDATE events
            SET confirmed_requests = confirmed_requests + 1
            WHERE id = $1 AND (participant_limit = 0 OR confirmed_requests < participant_limit)
            RETURNING confirmed_requests
            "#
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(row.map(|(confirmed,)| confirmed))
    }

    /// Release one seat, never going below zero
    pub async fn decrement_confirmed(&self, conn: &mut PgConnection, id: i64) -> Result<i32, EwmError> {
        let (confirmed,): (i32,) = sqlx::query_as(
            r#"
            UPDATE events
            SET confirmed_requests = GREATEST(confirmed_requests - 1, 0)
            WHERE id = $1
            RETURNING confirmed_requests
            "#
        )
        .bind(id)
        .fetch_one(conn)
        .await?;

        Ok(confirmed)
    }

    pub async fn set_rating(&self, conn: &mut PgConnection, id: i64, rating: i64) -> Result<(), EwmError> {
        sqlx::query("UPDATE events SET rating = $2 WHERE id = $1")
            .bind(id)
            .bind(rating)
            .execute(conn)
            .await?;

        Ok(())
    }

    /// Events matching `filter`, ordered and paged
    pub async fn find_by_filter(&self, filter: &EventFilter, order: EventOrder, page: Page) -> Result<Vec<Event>, EwmError> {
        self.fetch_filtered(filter, order, Some(page)).await
    }

    /// Every event matching the filter, for orderings computed outside the database
    pub async fn find_all_by_filter(&self, filter: &EventFilter, order: EventOrder) -> Result<Vec<Event>, EwmError> {
        self.fetch_filtered(filter, order, None).await
    }

    async fn fetch_filtered(&self, filter: &EventFilter, order: EventOrder, page: Option<Page>) -> Result<Vec<Event>, EwmError> {
        let started = Instant::now();
        let mut builder = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM events", EVENT_COLUMNS));
        filter.push_where(&mut builder);
        builder.push(" ORDER BY ").push(order.sql());
        if let Some(page) = page {
            builder
                .push(" LIMIT ")
                .push_bind(page.size)
                .push(" OFFSET ")
                .push_bind(page.from);
        }

        let result = builder.build_query_as::<Event>().fetch_all(&self.pool).await;
        log_database_operation(
            "find_by_filter",
            "events",
            started.elapsed().as_millis() as u64,
            result.is_ok(),
        );

        Ok(result?)
    }

    /// Events created by a user, paged
    pub async fn find_by_initiator(&self, initiator_id: i64, page: Page) -> Result<Vec<Event>, EwmError> {
        let events = sqlx::query_as::<_, Event>(&format!(
            "SELECT {} FROM events WHERE initiator_id = $1 ORDER BY id ASC LIMIT $2 OFFSET $3",
            EVENT_COLUMNS
        ))
        .bind(initiator_id)
        .bind(page.size)
        .bind(page.from)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }
}
