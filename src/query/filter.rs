//! Composable event predicates
//!
//! A filter is a conjunction of named predicates. Each predicate can be
//! checked against an in-memory [`Event`] or rendered into a
//! `sqlx::QueryBuilder` WHERE clause; both renderings agree.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Postgres, QueryBuilder};
use crate::models::{Event, EventState};
use crate::utils::errors::{EwmError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum EventPredicate {
    InitiatorIn(Vec<i64>),
    StateIn(Vec<EventState>),
    CategoryIn(Vec<i64>),
    /// Inclusive lower bound on the event date
    DateFrom(DateTime<Utc>),
    /// Inclusive upper bound on the event date
    DateTo(DateTime<Utc>),
    /// Case-insensitive substring over annotation or description
    Text(String),
    Paid(bool),
    /// Unlimited events, or limited events with a seat left
    OnlyAvailable,
}

impl EventPredicate {
    pub fn name(&self) -> &'static str {
        match self {
            EventPredicate::InitiatorIn(_) => "initiator_in",
            EventPredicate::StateIn(_) => "state_in",
            EventPredicate::CategoryIn(_) => "category_in",
            EventPredicate::DateFrom(_) => "date_from",
            EventPredicate::DateTo(_) => "date_to",
            EventPredicate::Text(_) => "text",
            EventPredicate::Paid(_) => "paid",
            EventPredicate::OnlyAvailable => "only_available",
        }
    }

    pub fn matches(&self, event: &Event) -> bool {
        match self {
            EventPredicate::InitiatorIn(ids) => ids.contains(&event.initiator_id),
            EventPredicate::StateIn(states) => states.contains(&event.state),
            EventPredicate::CategoryIn(ids) => ids.contains(&event.category_id),
            EventPredicate::DateFrom(start) => event.event_date >= *start,
            EventPredicate::DateTo(end) => event.event_date <= *end,
            EventPredicate::Text(text) => {
                let needle = text.to_lowercase();
                event.annotation.to_lowercase().contains(&needle)
                    || event.description.to_lowercase().contains(&needle)
            }
            EventPredicate::Paid(paid) => event.paid == *paid,
            EventPredicate::OnlyAvailable => event.has_free_seat(),
        }
    }

    pub fn push_sql(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        match self {
            EventPredicate::InitiatorIn(ids) => {
                builder.push("initiator_id = ANY(").push_bind(ids.clone()).push(")");
            }
            EventPredicate::StateIn(states) => {
                let names: Vec<String> = states.iter().map(ToString::to_string).collect();
                builder.push("state::text = ANY(").push_bind(names).push(")");
            }
            EventPredicate::CategoryIn(ids) => {
                builder.push("category_id = ANY(").push_bind(ids.clone()).push(")");
            }
            EventPredicate::DateFrom(start) => {
                builder.push("event_date >= ").push_bind(*start);
            }
            EventPredicate::DateTo(end) => {
                builder.push("event_date <= ").push_bind(*end);
            }
            EventPredicate::Text(text) => {
                let pattern = like_pattern(text);
                builder
                    .push("(annotation ILIKE ")
                    .push_bind(pattern.clone())
                    .push(" ESCAPE '\\' OR description ILIKE ")
                    .push_bind(pattern)
                    .push(" ESCAPE '\\')");
            }
            EventPredicate::Paid(paid) => {
                builder.push("paid = ").push_bind(*paid);
            }
            EventPredicate::OnlyAvailable => {
                builder.push("(participant_limit = 0 OR confirmed_requests < participant_limit)");
            }
        }
    }
}

/// Wrap `text` in `%` wildcards, escaping LIKE metacharacters it contains
fn like_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Conjunction of predicates; an empty filter matches every event
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventFilter {
    predicates: Vec<EventPredicate>,
}

impl EventFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, predicate: EventPredicate) -> Self {
        self.push(predicate);
        self
    }

    pub fn push(&mut self, predicate: EventPredicate) {
        self.predicates.push(predicate);
    }

    pub fn predicates(&self) -> &[EventPredicate] {
        &self.predicates
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn matches(&self, event: &Event) -> bool {
        self.predicates.iter().all(|predicate| predicate.matches(event))
    }

    /// Append ` WHERE p1 AND p2 ...`, or nothing for an empty filter
    pub fn push_where(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        for (i, predicate) in self.predicates.iter().enumerate() {
            builder.push(if i == 0 { " WHERE " } else { " AND " });
            predicate.push_sql(builder);
        }
    }
}

/// Public sort options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventSort {
    EventDate,
    Views,
}

/// Row order applied by the database
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOrder {
    ById,
    EventDateAsc,
    RatingAsc,
    RatingDesc,
}

impl EventOrder {
    pub fn sql(&self) -> &'static str {
        match self {
            EventOrder::ById => "id ASC",
            EventOrder::EventDateAsc => "event_date ASC, id ASC",
            EventOrder::RatingAsc => "rating ASC, id ASC",
            EventOrder::RatingDesc => "rating DESC, id ASC",
        }
    }
}

/// Most viewed first, ties by id
pub fn sort_by_views(events: &mut [Event]) {
    events.sort_by(|a, b| b.views.cmp(&a.views).then(a.id.cmp(&b.id)));
}

fn check_range(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Result<()> {
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            return Err(EwmError::validation(format!(
                "Range end {} is earlier than range start {}",
                end, start
            )));
        }
    }
    Ok(())
}

/// Criteria accepted by the public search
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PublicSearchCriteria {
    pub text: Option<String>,
    pub categories: Option<Vec<i64>>,
    pub paid: Option<bool>,
    pub range_start: Option<DateTime<Utc>>,
    pub range_end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub only_available: bool,
    pub sort: Option<EventSort>,
}

impl PublicSearchCriteria {
    /// Build the filter. State is pinned to PUBLISHED and the lower bound
    /// defaults to `now` when no bound is given.
    pub fn to_filter(&self, now: DateTime<Utc>) -> Result<EventFilter> {
        check_range(self.range_start, self.range_end)?;

        let mut filter = EventFilter::new().with(EventPredicate::StateIn(vec![EventState::Published]));

        if let Some(text) = self.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            filter.push(EventPredicate::Text(text.to_string()));
        }
        if let Some(categories) = self.categories.as_ref().filter(|c| !c.is_empty()) {
            filter.push(EventPredicate::CategoryIn(categories.clone()));
        }
        if let Some(paid) = self.paid {
            filter.push(EventPredicate::Paid(paid));
        }
        match (self.range_start, self.range_end) {
            (None, None) => filter.push(EventPredicate::DateFrom(now)),
            (start, end) => {
                if let Some(start) = start {
                    filter.push(EventPredicate::DateFrom(start));
                }
                if let Some(end) = end {
                    filter.push(EventPredicate::DateTo(end));
                }
            }
        }
        if self.only_available {
            filter.push(EventPredicate::OnlyAvailable);
        }
        Ok(filter)
    }

    /// Database order for the requested sort. View order is applied after annotation.
    pub fn order(&self) -> EventOrder {
        match self.sort {
            Some(EventSort::EventDate) => EventOrder::EventDateAsc,
            Some(EventSort::Views) | None => EventOrder::ById,
        }
    }
}

/// Criteria accepted by the administrative search
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminSearchCriteria {
    pub users: Option<Vec<i64>>,
    pub states: Option<Vec<EventState>>,
    pub categories: Option<Vec<i64>>,
    pub range_start: Option<DateTime<Utc>>,
    pub range_end: Option<DateTime<Utc>>,
}

impl AdminSearchCriteria {
    pub fn to_filter(&self) -> Result<EventFilter> {
        check_range(self.range_start, self.range_end)?;

        let mut filter = EventFilter::new();
        if let Some(users) = self.users.as_ref().filter(|u| !u.is_empty()) {
            filter.push(EventPredicate::InitiatorIn(users.clone()));
        }
        if let Some(states) = self.states.as_ref().filter(|s| !s.is_empty()) {
            filter.push(EventPredicate::StateIn(states.clone()));
        }
        if let Some(categories) = self.categories.as_ref().filter(|c| !c.is_empty()) {
            filter.push(EventPredicate::CategoryIn(categories.clone()));
        }
        if let Some(start) = self.range_start {
            filter.push(EventPredicate::DateFrom(start));
        }
        if let Some(end) = self.range_end {
            filter.push(EventPredicate::DateTo(end));
        }
        Ok(filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::Duration;
    use crate::models::event::sample_event;

    #[test]
    fn test_public_filter_pins_published_and_defaults_start() {
        let now = Utc::now();
        let filter = PublicSearchCriteria::default().to_filter(now).unwrap();
        assert_eq!(
            filter.predicates(),
            &[
                EventPredicate::StateIn(vec![EventState::Published]),
                EventPredicate::DateFrom(now),
            ]
        );
    }

    #[test]
    fn test_public_filter_rejects_inverted_range() {
        let now = Utc::now();
        let criteria = PublicSearchCriteria {
            range_start: Some(now + Duration::days(2)),
            range_end: Some(now + Duration::days(1)),
            ..Default::default()
        };
        assert_matches!(criteria.to_filter(now), Err(EwmError::Validation(_)));
    }

    #[test]
    fn test_explicit_end_suppresses_default_start() {
        let now = Utc::now();
        let end = now + Duration::days(1);
        let criteria = PublicSearchCriteria { range_end: Some(end), ..Default::default() };
        let filter = criteria.to_filter(now).unwrap();
        assert!(filter.predicates().contains(&EventPredicate::DateTo(end)));
        assert!(!filter.predicates().iter().any(|p| matches!(p, EventPredicate::DateFrom(_))));
    }

    #[test]
    fn test_in_memory_matching() {
        let mut event = sample_event(2, 1);
        event.annotation = "Lindy Hop workshop for beginners".to_string();

        assert!(EventPredicate::Text("lindy".to_string()).matches(&event));
        assert!(!EventPredicate::Text("tango".to_string()).matches(&event));
        assert!(EventPredicate::OnlyAvailable.matches(&event));
        assert!(!EventPredicate::OnlyAvailable.matches(&sample_event(2, 2)));
        assert!(EventPredicate::OnlyAvailable.matches(&sample_event(0, 50)));
        assert!(EventPredicate::DateFrom(event.event_date).matches(&event));
        assert!(EventPredicate::DateTo(event.event_date).matches(&event));

        let filter = EventFilter::new()
            .with(EventPredicate::Paid(false))
            .with(EventPredicate::CategoryIn(vec![1, 2]));
        assert!(filter.matches(&event));
        assert!(!filter.clone().with(EventPredicate::InitiatorIn(vec![99])).matches(&event));
        assert!(EventFilter::new().matches(&event));
    }

    #[test]
    fn test_where_clause_rendering() {
        let filter = EventFilter::new()
            .with(EventPredicate::StateIn(vec![EventState::Published]))
            .with(EventPredicate::Paid(true))
            .with(EventPredicate::OnlyAvailable);

        let mut builder = QueryBuilder::<Postgres>::new("SELECT id FROM events");
        filter.push_where(&mut builder);
        assert_eq!(
            builder.sql(),
            "SELECT id FROM events WHERE state::text = ANY($1) AND paid = $2 \
             AND (participant_limit = 0 OR confirmed_requests < participant_limit)"
        );

        let mut empty = QueryBuilder::<Postgres>::new("SELECT id FROM events");
        EventFilter::new().push_where(&mut empty);
        assert_eq!(empty.sql(), "SELECT id FROM events");
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[test]
    fn test_admin_filter_skips_empty_lists() {
        let criteria = AdminSearchCriteria {
            users: Some(vec![]),
            states: Some(vec![EventState::Pending, EventState::Canceled]),
            ..Default::default()
        };
        let filter = criteria.to_filter().unwrap();
        assert_eq!(
            filter.predicates(),
            &[EventPredicate::StateIn(vec![EventState::Pending, EventState::Canceled])]
        );
    }

    #[test]
    fn test_sort_by_views() {
        let mut a = sample_event(0, 0);
        a.id = 1;
        a.views = 5;
        let mut b = sample_event(0, 0);
        b.id = 2;
        b.views = 9;
        let mut c = sample_event(0, 0);
        c.id = 3;
        c.views = 5;
        let mut events = vec![a, b, c];
        sort_by_views(&mut events);
        assert_eq!(events.iter().map(|e| e.id).collect::<Vec<_>>(), vec![2, 1, 3]);
    }
}
