//! Participation admission rules
//!
//! Decides what happens to a participation request given the event's
//! capacity and moderation policy.

use crate::models::{Event, EventState, ParticipationRequest, RequestDecision, RequestStatus};
use crate::utils::errors::{EwmError, Result};

/// Preconditions for a new participation request
pub fn check_can_apply(event: &Event, user_id: i64, has_live_request: bool) -> Result<()> {
    if has_live_request {
        return Err(EwmError::conflict(format!(
            "User {} already has a request for event {}",
            user_id, event.id
        )));
    }
    if event.state != EventState::Published {
        return Err(EwmError::conflict(format!("Event {} is not published", event.id)));
    }
    if event.is_owned_by(user_id) {
        return Err(EwmError::conflict("The initiator cannot apply to their own event"));
    }
    if !event.has_free_seat() {
        return Err(EwmError::conflict(format!("Event {} has no free seats", event.id)));
    }
    Ok(())
}

/// Status a fresh request starts in.
///
/// Unlimited events and events without moderation confirm immediately.
pub fn initial_status(event: &Event) -> RequestStatus {
    if event.is_unlimited() || !event.request_moderation {
        RequestStatus::Confirmed
    } else {
        RequestStatus::Pending
    }
}

/// Preconditions for an owner's batch decision
pub fn check_bulk_preconditions(event: &Event, owner_id: i64, targeted: &[ParticipationRequest]) -> Result<()> {
    if !event.is_owned_by(owner_id) {
        return Err(EwmError::conflict(format!(
            "User {} is not the initiator of event {}",
            owner_id, event.id
        )));
    }
    if !event.request_moderation {
        return Err(EwmError::conflict(format!("Event {} does not require moderation", event.id)));
    }
    if !event.has_free_seat() {
        return Err(EwmError::conflict(format!("Event {} has no free seats", event.id)));
    }
    if !targeted.iter().any(|request| request.status == RequestStatus::Pending) {
        return Err(EwmError::conflict("None of the targeted requests is pending"));
    }
    Ok(())
}

/// Outcome of a batch decision, in caller order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkPlan {
    pub confirm: Vec<i64>,
    pub reject: Vec<i64>,
}

/// Split `request_ids` into confirmations and rejections.
///
/// `remaining` is `None` for unlimited events. Confirmations are granted in
/// caller order while seats remain; everything after that is rejected.
pub fn plan_bulk_decision(remaining: Option<i32>, request_ids: &[i64], decision: RequestDecision) -> BulkPlan {
    let mut plan = BulkPlan::default();

    if decision == RequestDecision::Rejected || remaining == Some(0) {
        plan.reject = request_ids.to_vec();
        return plan;
    }

    let mut seats = remaining;
    for &id in request_ids {
        match seats {
            None => plan.confirm.push(id),
            Some(left) if left > 0 => {
                plan.confirm.push(id);
                seats = Some(left - 1);
            }
            Some(_) => plan.reject.push(id),
        }
    }
    plan
}
