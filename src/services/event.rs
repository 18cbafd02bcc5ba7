//! Event lifecycle service
//!
//! Creation, administrative review, initiator edits and the public and
//! administrative read paths. Read paths annotate events with view counts
//! from the statistics service on a best-effort basis.

use chrono::Utc;
use tracing::debug;
use crate::database::DatabaseService;
use crate::models::{
    AdminUpdateEventRequest, CreateEventRequest, Event, EventState, OwnerUpdateEventRequest, Page,
    RatingOrder, ViewerContext,
};
use crate::query::{
    sort_by_views, AdminSearchCriteria, EventFilter, EventOrder, EventPredicate, EventSort,
    PublicSearchCriteria,
};
use crate::services::stats::StatsClient;
use crate::state::{admin_transition, apply_patch, owner_transition, EventRules};
use crate::utils::errors::{EwmError, Result};
use crate::utils::helpers::event_uri;
use crate::utils::logging::{log_event_action, log_stats_failure};

#[derive(Clone, Debug)]
pub struct EventService {
    db: DatabaseService,
    stats: StatsClient,
    rules: EventRules,
}

impl EventService {
    pub fn new(db: DatabaseService, stats: StatsClient, rules: EventRules) -> Self {
        Self { db, stats, rules }
    }

    /// Submit a new event for review
    pub async fn create_event(&self, initiator_id: i64, draft: CreateEventRequest) -> Result<Event> {
        let now = Utc::now();

        if self.db.users.find_by_id(initiator_id).await?.is_none() {
            return Err(EwmError::not_found(format!("User {} not found", initiator_id)));
        }
        self.rules.validate_draft(&draft, now)?;
        self.ensure_category(draft.category).await?;

        let event = self.db.events.create(initiator_id, &draft, now).await?;
        log_event_action(event.id, "create", Some(initiator_id), None);

        Ok(event)
    }

    /// Review or edit a pending event as an administrator
    pub async fn admin_update(&self, event_id: i64, patch: AdminUpdateEventRequest) -> Result<Event> {
        let now = Utc::now();
        let mut tx = self.db.begin().await?;

        let mut event = self.db.events.lock(&mut *tx, event_id).await?
            .ok_or_else(|| EwmError::not_found(format!("Event {} not found", event_id)))?;

        let next_state = admin_transition(event.state, patch.state_action)?;
        self.rules.validate_patch(&patch, now)?;
        if let Some(category) = patch.category {
            self.ensure_category(category).await?;
        }

        apply_patch(&mut event, &patch)?;
        if next_state == EventState::Published && event.state != EventState::Published {
            event.published_on = Some(now);
        }
        event.state = next_state;

        let event = self.db.events.save(&mut *tx, &event).await?;
        tx.commit().await?;

        log_event_action(event.id, "admin_update", None, Some(&event.state.to_string()));
        Ok(event)
    }

    /// Edit or withdraw an unpublished event as its initiator
    pub async fn owner_update(&self, user_id: i64, event_id: i64, patch: OwnerUpdateEventRequest) -> Result<Event> {
        let now = Utc::now();

        if self.db.users.find_by_id(user_id).await?.is_none() {
            return Err(EwmError::not_found(format!("User {} not found", user_id)));
        }

        let mut tx = self.db.begin().await?;

        let mut event = self.db.events.lock(&mut *tx, event_id).await?
            .filter(|event| event.is_owned_by(user_id))
            .ok_or_else(|| {
                EwmError::not_found(format!("Event {} with initiator {} not found", event_id, user_id))
            })?;

        let next_state = owner_transition(event.state, patch.state_action)?;
        self.rules.validate_patch(&patch, now)?;
        if let Some(category) = patch.category {
            self.ensure_category(category).await?;
        }

        apply_patch(&mut event, &patch)?;
        event.state = next_state;

        let event = self.db.events.save(&mut *tx, &event).await?;
        tx.commit().await?;

        log_event_action(event.id, "owner_update", Some(user_id), Some(&event.state.to_string()));
        Ok(event)
    }

    /// A published event with its view count
    pub async fn get_published(&self, event_id: i64, viewer: Option<&ViewerContext>) -> Result<Event> {
        let mut event = self.db.events.find_by_id(event_id).await?
            .filter(|event| event.state == EventState::Published)
            .ok_or_else(|| EwmError::not_found(format!("Published event {} not found", event_id)))?;

        if let Some(viewer) = viewer {
            self.record_view(&event_uri(event.id), &viewer.client_ip).await;
        }
        self.annotate_views(std::slice::from_mut(&mut event)).await;

        Ok(event)
    }

    /// Public search over published events
    pub async fn list_published_filtered(
        &self,
        criteria: &PublicSearchCriteria,
        page: Page,
        viewer: Option<&ViewerContext>,
    ) -> Result<Vec<Event>> {
        let filter = criteria.to_filter(Utc::now())?;
        let by_views = criteria.sort == Some(EventSort::Views);

        // View order spans the whole result set, so paging waits until after annotation
        let mut events = if by_views {
            self.db.events.find_all_by_filter(&filter, criteria.order()).await?
        } else {
            self.db.events.find_by_filter(&filter, criteria.order(), page).await?
        };
        debug!(count = events.len(), predicates = filter.predicates().len(), "Public event search");

        if let Some(viewer) = viewer {
            self.record_view(&viewer.uri, &viewer.client_ip).await;
        }
        self.annotate_views(&mut events).await;
        if by_views {
            sort_by_views(&mut events);
            events = page.slice(events);
        }

        Ok(events)
    }

    /// Published events ordered by rating
    pub async fn list_by_rating(
        &self,
        order: RatingOrder,
        page: Page,
        viewer: Option<&ViewerContext>,
    ) -> Result<Vec<Event>> {
        let filter = EventFilter::new().with(EventPredicate::StateIn(vec![EventState::Published]));
        let order = match order {
            RatingOrder::Asc => EventOrder::RatingAsc,
            RatingOrder::Desc => EventOrder::RatingDesc,
        };
        let mut events = self.db.events.find_by_filter(&filter, order, page).await?;

        if let Some(viewer) = viewer {
            self.record_view(&viewer.uri, &viewer.client_ip).await;
        }
        self.annotate_views(&mut events).await;

        Ok(events)
    }

    /// Events created by a user
    pub async fn list_owned_events(&self, user_id: i64, page: Page) -> Result<Vec<Event>> {
        if self.db.users.find_by_id(user_id).await?.is_none() {
            return Err(EwmError::not_found(format!("User {} not found", user_id)));
        }
        let mut events = self.db.events.find_by_initiator(user_id, page).await?;
        self.annotate_views(&mut events).await;
        Ok(events)
    }

    /// One event as seen by its initiator, in any state
    pub async fn get_owned_event(&self, user_id: i64, event_id: i64) -> Result<Event> {
        let mut event = self.db.events.find_by_id(event_id).await?
            .filter(|event| event.is_owned_by(user_id))
            .ok_or_else(|| {
                EwmError::not_found(format!("Event {} with initiator {} not found", event_id, user_id))
            })?;
        self.annotate_views(std::slice::from_mut(&mut event)).await;
        Ok(event)
    }

    /// Administrative search over events in any state
    pub async fn search_events_admin(&self, criteria: &AdminSearchCriteria, page: Page) -> Result<Vec<Event>> {
        let filter = criteria.to_filter()?;
        self.db.events.find_by_filter(&filter, EventOrder::ById, page).await
    }

    async fn ensure_category(&self, category_id: i64) -> Result<()> {
        if self.db.categories.find_by_id(category_id).await?.is_none() {
            return Err(EwmError::not_found(format!("Category {} not found", category_id)));
        }
        Ok(())
    }

    async fn record_view(&self, uri: &str, client_ip: &str) {
        if let Err(e) = self.stats.record_hit(uri, client_ip, Utc::now()).await {
            log_stats_failure("record_hit", &e.to_string());
        }
    }

    /// Overlay unique view counts; on failure the stored counts are kept
    async fn annotate_views(&self, events: &mut [Event]) {
        let Some(start) = events.iter().map(|event| event.created_on).min() else {
            return;
        };
        let ids: Vec<i64> = events.iter().map(|event| event.id).collect();

        match self.stats.views_by_event(&ids, start, Utc::now()).await {
            Ok(views) => {
                for event in events.iter_mut() {
                    event.views = views.get(&event.id).copied().unwrap_or(0);
                }
            }
            Err(e) => log_stats_failure("views_by_event", &e.to_string()),
        }
        debug!(count = ids.len(), "Annotated events with view counts");
    }
}
