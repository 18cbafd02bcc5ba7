//! Test data fixtures
//!
//! Builders for users, categories and events used across the database suites.

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use ExploreWithMe::config::Settings;
use ExploreWithMe::models::{CreateEventRequest, Location};

/// Settings for a service factory under test; statistics disabled unless a base URL is given
pub fn test_settings(database_url: &str, stats_base_url: Option<&str>) -> Settings {
    let mut settings = Settings::default();
    settings.database.url = database_url.to_string();
    match stats_base_url {
        Some(url) => {
            settings.stats.base_url = url.to_string();
            settings.stats.enabled = true;
        }
        None => settings.stats.enabled = false,
    }
    settings
}

pub async fn insert_user(pool: &PgPool, name: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO users (name, email) VALUES ($1, $2) RETURNING id")
        .bind(name)
        .bind(format!("{}@example.com", name.to_lowercase()))
        .fetch_one(pool)
        .await
        .expect("Failed to insert user")
}

pub async fn insert_category(pool: &PgPool, name: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO categories (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await
        .expect("Failed to insert category")
}

/// Shape of an event inserted directly into the table
#[derive(Debug, Clone)]
pub struct EventFixture {
    pub state: &'static str,
    pub participant_limit: i32,
    pub request_moderation: bool,
    pub paid: bool,
    pub annotation: String,
    pub event_date: DateTime<Utc>,
}

impl Default for EventFixture {
    fn default() -> Self {
        Self {
            state: "PUBLISHED",
            participant_limit: 0,
            request_moderation: true,
            paid: false,
            annotation: "Open air swing dance social by the river".to_string(),
            event_date: Utc::now() + Duration::days(7),
        }
    }
}

pub async fn insert_event(pool: &PgPool, initiator_id: i64, category_id: i64, fixture: EventFixture) -> i64 {
    sqlx::query_scalar(
        r#"
        INSERT INTO events (category_id, initiator_id, annotation, description, title, event_date,
                            created_on, published_on, lat, lon, paid, participant_limit,
                            request_moderation, state)
        VALUES ($1, $2, $3, 'Live band, beginner lesson at seven, social dancing after',
                'Swing by the river', $4, NOW() - INTERVAL '1 day',
                $5, 59.93, 30.33, $6, $7, $8, $9::event_state)
        RETURNING id
        "#
    )
    .bind(category_id)
    .bind(initiator_id)
    .bind(&fixture.annotation)
    .bind(fixture.event_date)
    .bind((fixture.state == "PUBLISHED").then(Utc::now))
    .bind(fixture.paid)
    .bind(fixture.participant_limit)
    .bind(fixture.request_moderation)
    .bind(fixture.state)
    .fetch_one(pool)
    .await
    .expect("Failed to insert event")
}

/// Insert a request row directly, bypassing admission
pub async fn insert_request(pool: &PgPool, event_id: i64, requester_id: i64, status: &str) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO participation_requests (event_id, requester_id, status) VALUES ($1, $2, $3::request_status) RETURNING id"
    )
    .bind(event_id)
    .bind(requester_id)
    .bind(status)
    .fetch_one(pool)
    .await
    .expect("Failed to insert request")
}

pub fn event_draft(category_id: i64, event_date: DateTime<Utc>) -> CreateEventRequest {
    CreateEventRequest {
        annotation: "Lindy hop workshop for absolute beginners".to_string(),
        category: category_id,
        description: "Two hours of fundamentals followed by a practice session".to_string(),
        event_date,
        location: Location { lat: 55.75, lon: 37.62 },
        paid: None,
        participant_limit: None,
        request_moderation: None,
        title: "Lindy basics".to_string(),
    }
}
