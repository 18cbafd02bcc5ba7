//! Event lifecycle rules
//!
//! Pure checks and transitions for the event aggregate. Nothing here touches
//! the database; services load the event, run these rules and persist the result.

use chrono::{DateTime, Duration, Utc};
use crate::config::RulesConfig;
use crate::models::{
    AdminStateAction, CreateEventRequest, Event, EventState, OwnerStateAction, UpdateEventRequest,
};
use crate::utils::errors::{EwmError, Result};
use crate::utils::helpers::check_length;

pub const ANNOTATION_LENGTH: (usize, usize) = (20, 2000);
pub const DESCRIPTION_LENGTH: (usize, usize) = (20, 7000);
pub const TITLE_LENGTH: (usize, usize) = (3, 120);

/// Scheduling rules applied to drafts and patches
#[derive(Debug, Clone, Copy)]
pub struct EventRules {
    min_lead_time: Duration,
}

impl EventRules {
    pub fn new(min_lead_time: Duration) -> Self {
        Self { min_lead_time }
    }

    pub fn min_lead_time(&self) -> Duration {
        self.min_lead_time
    }

    /// A date in the past is malformed input; a date inside the lead window is a rule conflict.
    pub fn validate_event_date(&self, event_date: DateTime<Utc>, now: DateTime<Utc>) -> Result<()> {
        if event_date <= now {
            return Err(EwmError::validation(format!(
                "Event date {} must be in the future",
                event_date
            )));
        }
        if event_date - now < self.min_lead_time {
            return Err(EwmError::conflict(format!(
                "Event date {} must be at least {} minutes from now",
                event_date,
                self.min_lead_time.num_minutes()
            )));
        }
        Ok(())
    }

    pub fn validate_draft(&self, draft: &CreateEventRequest, now: DateTime<Utc>) -> Result<()> {
        check_length("annotation", &draft.annotation, ANNOTATION_LENGTH.0, ANNOTATION_LENGTH.1)?;
        check_length("description", &draft.description, DESCRIPTION_LENGTH.0, DESCRIPTION_LENGTH.1)?;
        check_length("title", &draft.title, TITLE_LENGTH.0, TITLE_LENGTH.1)?;
        if let Some(limit) = draft.participant_limit {
            check_limit(limit)?;
        }
        self.validate_event_date(draft.event_date, now)
    }

    pub fn validate_patch<A>(&self, patch: &UpdateEventRequest<A>, now: DateTime<Utc>) -> Result<()> {
        if let Some(annotation) = &patch.annotation {
            check_length("annotation", annotation, ANNOTATION_LENGTH.0, ANNOTATION_LENGTH.1)?;
        }
        if let Some(description) = &patch.description {
            check_length("description", description, DESCRIPTION_LENGTH.0, DESCRIPTION_LENGTH.1)?;
        }
        if let Some(title) = &patch.title {
            check_length("title", title, TITLE_LENGTH.0, TITLE_LENGTH.1)?;
        }
        if let Some(limit) = patch.participant_limit {
            check_limit(limit)?;
        }
        if let Some(event_date) = patch.event_date {
            self.validate_event_date(event_date, now)?;
        }
        Ok(())
    }
}

impl From<&RulesConfig> for EventRules {
    fn from(config: &RulesConfig) -> Self {
        Self::new(config.min_lead_time())
    }
}

impl Default for EventRules {
    fn default() -> Self {
        Self::new(Duration::hours(2))
    }
}

fn check_limit(limit: i32) -> Result<()> {
    if limit < 0 {
        return Err(EwmError::validation(format!(
            "Participant limit must not be negative, got {}",
            limit
        )));
    }
    Ok(())
}

/// Resulting state of an administrative review. Only PENDING events can be reviewed.
pub fn admin_transition(current: EventState, action: Option<AdminStateAction>) -> Result<EventState> {
    if current != EventState::Pending {
        return Err(EwmError::conflict(format!(
            "Only pending events can be changed by an administrator, event is {}",
            current
        )));
    }
    Ok(match action {
        Some(AdminStateAction::PublishEvent) => EventState::Published,
        Some(AdminStateAction::RejectEvent) => EventState::Canceled,
        None => current,
    })
}

/// Resulting state of an initiator edit. Published and canceled events are frozen.
pub fn owner_transition(current: EventState, action: Option<OwnerStateAction>) -> Result<EventState> {
    match current {
        EventState::Published => {
            return Err(EwmError::conflict("Published events cannot be changed by the initiator"));
        }
        EventState::Canceled => {
            return Err(EwmError::conflict("Canceled events cannot be changed by the initiator"));
        }
        EventState::Pending => {}
    }
    Ok(match action {
        Some(OwnerStateAction::CancelReview) => EventState::Canceled,
        Some(OwnerStateAction::SendToReview) => EventState::Pending,
        None => current,
    })
}

/// Copy every present non-state field of `patch` onto `event`.
///
/// The category is copied as an id; the caller resolves it first.
pub fn apply_patch<A>(event: &mut Event, patch: &UpdateEventRequest<A>) -> Result<()> {
    if let Some(limit) = patch.participant_limit {
        if limit > 0 && limit < event.confirmed_requests {
            return Err(EwmError::conflict(format!(
                "Participant limit {} is below the {} already confirmed requests",
                limit, event.confirmed_requests
            )));
        }
        event.participant_limit = limit;
    }
    if let Some(annotation) = &patch.annotation {
        event.annotation = annotation.clone();
    }
    if let Some(description) = &patch.description {
        event.description = description.clone();
    }
    if let Some(title) = &patch.title {
        event.title = title.clone();
    }
    if let Some(category) = patch.category {
        event.category_id = category;
    }
    if let Some(event_date) = patch.event_date {
        event.event_date = event_date;
    }
    if let Some(location) = patch.location {
        event.location = location;
    }
    if let Some(paid) = patch.paid {
        event.paid = paid;
    }
    if let Some(moderation) = patch.request_moderation {
        event.request_moderation = moderation;
    }
    Ok(())
}
