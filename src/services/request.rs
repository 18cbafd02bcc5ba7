//! Participation request service
//!
//! Admission of participation requests against an event's seat limit.
//! Every counter change runs in one transaction that first locks the
//! event row; locks are always taken event first, then requests.

use std::collections::HashSet;
use tracing::{debug, info};
use crate::database::DatabaseService;
use crate::models::{ParticipationRequest, RequestStatus, RequestStatusUpdate, RequestStatusUpdateResult};
use crate::state::{check_bulk_preconditions, check_can_apply, initial_status, plan_bulk_decision};
use crate::utils::errors::{EwmError, Result};
use crate::utils::logging::log_admission_decision;

#[derive(Clone, Debug)]
pub struct RequestService {
    db: DatabaseService,
}

impl RequestService {
    pub fn new(db: DatabaseService) -> Self {
        Self { db }
    }

    /// Apply for a seat at a published event
    pub async fn apply(&self, user_id: i64, event_id: i64) -> Result<ParticipationRequest> {
        self.ensure_user(user_id).await?;

        let mut tx = self.db.begin().await?;

        let event = self.db.events.lock(&mut *tx, event_id).await?
            .ok_or_else(|| EwmError::not_found(format!("Event {} not found", event_id)))?;

        let has_live = self.db.requests.has_live(&mut *tx, user_id, event_id).await?;
        check_can_apply(&event, user_id, has_live)?;

        let status = initial_status(&event);
        let mut confirmed_requests = event.confirmed_requests;
        if status == RequestStatus::Confirmed {
            confirmed_requests = self.db.events.increment_confirmed(&mut *tx, event_id).await?
                .ok_or_else(|| EwmError::conflict(format!("Event {} has no free seats", event_id)))?;
        }

        let request = self.db.requests.create(&mut *tx, event_id, user_id, status).await?;
        tx.commit().await?;

        log_admission_decision(event_id, request.id, &request.status.to_string(), confirmed_requests);
        Ok(request)
    }

    /// Withdraw a request, releasing its seat if it held one
    pub async fn cancel(&self, user_id: i64, request_id: i64) -> Result<ParticipationRequest> {
        self.ensure_user(user_id).await?;

        let not_found = || EwmError::not_found(format!("Request {} of user {} not found", request_id, user_id));

        let request = self.db.requests.find_by_id(request_id).await?
            .filter(|request| request.requester_id == user_id)
            .ok_or_else(not_found)?;
        if request.status == RequestStatus::Canceled {
            return Ok(request);
        }

        let mut tx = self.db.begin().await?;

        // Event lock first, then re-read the request under its own lock
        self.db.events.lock(&mut *tx, request.event_id).await?
            .ok_or_else(|| EwmError::not_found(format!("Event {} not found", request.event_id)))?;
        let request = self.db.requests.lock(&mut *tx, request_id).await?
            .ok_or_else(not_found)?;

        let mut confirmed_requests = None;
        match request.status {
            RequestStatus::Canceled => return Ok(request),
            RequestStatus::Confirmed => {
                confirmed_requests = Some(self.db.events.decrement_confirmed(&mut *tx, request.event_id).await?);
            }
            RequestStatus::Pending | RequestStatus::Rejected => {}
        }

        let request = self.db.requests.set_status(&mut *tx, request_id, RequestStatus::Canceled).await?;
        tx.commit().await?;

        info!(
            request_id = request.id,
            event_id = request.event_id,
            confirmed_requests = confirmed_requests,
            "Participation request canceled"
        );
        Ok(request)
    }

    /// Confirm or reject a batch of pending requests as the event's initiator
    pub async fn bulk_decide(
        &self,
        owner_id: i64,
        event_id: i64,
        update: RequestStatusUpdate,
    ) -> Result<RequestStatusUpdateResult> {
        self.ensure_user(owner_id).await?;

        let mut seen = HashSet::new();
        let request_ids: Vec<i64> = update.request_ids
            .iter()
            .copied()
            .filter(|id| seen.insert(*id))
            .collect();

        let mut tx = self.db.begin().await?;

        let event = self.db.events.lock(&mut *tx, event_id).await?
            .ok_or_else(|| EwmError::not_found(format!("Event {} not found", event_id)))?;

        let targeted = self.db.requests.lock_for_event(&mut *tx, event_id, &request_ids).await?;
        if targeted.len() != request_ids.len() {
            return Err(EwmError::not_found(format!(
                "Some of the requests {:?} do not exist for event {}",
                request_ids, event_id
            )));
        }
        check_bulk_preconditions(&event, owner_id, &targeted)?;

        // Settled requests in the batch keep their status and are left out of the result
        let pending: HashSet<i64> = targeted
            .iter()
            .filter(|request| request.status == RequestStatus::Pending)
            .map(|request| request.id)
            .collect();
        let ordered: Vec<i64> = request_ids.into_iter().filter(|id| pending.contains(id)).collect();

        let plan = plan_bulk_decision(event.remaining_seats(), &ordered, update.status);
        debug!(
            event_id = event_id,
            confirm = plan.confirm.len(),
            reject = plan.reject.len(),
            "Applying batch decision"
        );

        let mut result = RequestStatusUpdateResult::default();
        let mut confirmed_requests = event.confirmed_requests;

        for id in plan.confirm {
            confirmed_requests = self.db.events.increment_confirmed(&mut *tx, event_id).await?
                .ok_or_else(|| EwmError::conflict(format!("Event {} has no free seats", event_id)))?;
            let request = self.db.requests.set_status(&mut *tx, id, RequestStatus::Confirmed).await?;
            log_admission_decision(event_id, id, "CONFIRMED", confirmed_requests);
            result.confirmed_requests.push(request);
        }
        for id in plan.reject {
            let request = self.db.requests.set_status(&mut *tx, id, RequestStatus::Rejected).await?;
            log_admission_decision(event_id, id, "REJECTED", confirmed_requests);
            result.rejected_requests.push(request);
        }

        tx.commit().await?;
        Ok(result)
    }

    /// Requests submitted by a user
    pub async fn list_user_requests(&self, user_id: i64) -> Result<Vec<ParticipationRequest>> {
        self.ensure_user(user_id).await?;
        self.db.requests.find_by_requester(user_id).await
    }

    /// Requests against an event, visible to its initiator only
    pub async fn list_event_requests(&self, owner_id: i64, event_id: i64) -> Result<Vec<ParticipationRequest>> {
        self.ensure_user(owner_id).await?;
        self.db.events.find_by_id(event_id).await?
            .filter(|event| event.is_owned_by(owner_id))
            .ok_or_else(|| {
                EwmError::not_found(format!("Event {} with initiator {} not found", event_id, owner_id))
            })?;
        self.db.requests.find_by_event(event_id).await
    }

    async fn ensure_user(&self, user_id: i64) -> Result<()> {
        if self.db.users.find_by_id(user_id).await?.is_none() {
            return Err(EwmError::not_found(format!("User {} not found", user_id)));
        }
        Ok(())
    }
}
