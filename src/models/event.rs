//! Event model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Column list shared by every query that materializes an [`Event`]
pub const EVENT_COLUMNS: &str = "id, category_id, initiator_id, annotation, description, title, \
    event_date, created_on, published_on, lat, lon, paid, participant_limit, request_moderation, \
    confirmed_requests, state, views, rating";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "event_state", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum EventState {
    Pending,
    Published,
    Canceled,
}

impl std::fmt::Display for EventState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventState::Pending => write!(f, "PENDING"),
            EventState::Published => write!(f, "PUBLISHED"),
            EventState::Canceled => write!(f, "CANCELED"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: i64,
    pub category_id: i64,
    pub initiator_id: i64,
    pub annotation: String,
    pub description: String,
    pub title: String,
    pub event_date: DateTime<Utc>,
    pub created_on: DateTime<Utc>,
    pub published_on: Option<DateTime<Utc>>,
    #[sqlx(flatten)]
    pub location: Location,
    pub paid: bool,
    pub participant_limit: i32,
    pub request_moderation: bool,
    pub confirmed_requests: i32,
    pub state: EventState,
    pub views: i64,
    pub rating: i64,
}

impl Event {
    /// A limit of zero means the event accepts any number of participants
    pub fn is_unlimited(&self) -> bool {
        self.participant_limit == 0
    }

    /// Seats still open, `None` when the event is unlimited
    pub fn remaining_seats(&self) -> Option<i32> {
        if self.is_unlimited() {
            None
        } else {
            Some((self.participant_limit - self.confirmed_requests).max(0))
        }
    }

    pub fn has_free_seat(&self) -> bool {
        self.remaining_seats().map_or(true, |seats| seats > 0)
    }

    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.initiator_id == user_id
    }
}

/// Draft submitted by an initiator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub annotation: String,
    pub category: i64,
    pub description: String,
    pub event_date: DateTime<Utc>,
    pub location: Location,
    pub paid: Option<bool>,
    pub participant_limit: Option<i32>,
    pub request_moderation: Option<bool>,
    pub title: String,
}

/// State change requested by an administrator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdminStateAction {
    PublishEvent,
    RejectEvent,
}

/// State change requested by the event initiator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OwnerStateAction {
    SendToReview,
    CancelReview,
}

/// Partial update of an event; absent fields are left untouched
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateEventRequest<A> {
    pub annotation: Option<String>,
    pub category: Option<i64>,
    pub description: Option<String>,
    pub event_date: Option<DateTime<Utc>>,
    pub location: Option<Location>,
    pub paid: Option<bool>,
    pub participant_limit: Option<i32>,
    pub request_moderation: Option<bool>,
    pub state_action: Option<A>,
    pub title: Option<String>,
}

pub type AdminUpdateEventRequest = UpdateEventRequest<AdminStateAction>;
pub type OwnerUpdateEventRequest = UpdateEventRequest<OwnerStateAction>;

impl<A> Default for UpdateEventRequest<A> {
    fn default() -> Self {
        Self {
            annotation: None,
            category: None,
            description: None,
            event_date: None,
            location: None,
            paid: None,
            participant_limit: None,
            request_moderation: None,
            state_action: None,
            title: None,
        }
    }
}

/// Who is looking at a public event, forwarded to the statistics service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerContext {
    pub uri: String,
    pub client_ip: String,
}

/// Published event fixture for unit tests
#[cfg(test)]
pub(crate) fn sample_event(limit: i32, confirmed: i32) -> Event {
    Event {
        id: 1,
        category_id: 1,
        initiator_id: 10,
        annotation: "An annotation long enough".to_string(),
        description: "A description long enough".to_string(),
        title: "Title".to_string(),
        event_date: Utc::now() + chrono::Duration::days(3),
        created_on: Utc::now(),
        published_on: None,
        location: Location { lat: 55.75, lon: 37.62 },
        paid: false,
        participant_limit: limit,
        request_moderation: true,
        confirmed_requests: confirmed,
        state: EventState::Published,
        views: 0,
        rating: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remaining_seats() {
        assert_eq!(sample_event(0, 5).remaining_seats(), None);
        assert_eq!(sample_event(3, 1).remaining_seats(), Some(2));
        assert_eq!(sample_event(3, 3).remaining_seats(), Some(0));
        assert!(sample_event(0, 100).has_free_seat());
        assert!(!sample_event(2, 2).has_free_seat());
    }

    #[test]
    fn test_state_action_wire_names() {
        let action: AdminStateAction = serde_json::from_str("\"PUBLISH_EVENT\"").unwrap();
        assert_eq!(action, AdminStateAction::PublishEvent);
        let action: OwnerStateAction = serde_json::from_str("\"CANCEL_REVIEW\"").unwrap();
        assert_eq!(action, OwnerStateAction::CancelReview);
        assert_eq!(serde_json::to_string(&EventState::Published).unwrap(), "\"PUBLISHED\"");
    }

    #[test]
    fn test_patch_defaults_to_untouched() {
        let patch: OwnerUpdateEventRequest = serde_json::from_str(r#"{"title": "New title"}"#).unwrap();
        assert_eq!(patch.title.as_deref(), Some("New title"));
        assert!(patch.annotation.is_none());
        assert!(patch.state_action.is_none());
    }
}
