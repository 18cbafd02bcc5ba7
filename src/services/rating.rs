//! Rating service
//!
//! Likes and dislikes from confirmed participants. Every vote mutation and
//! the full recount of the affected event and initiator ratings share one
//! transaction.

use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use crate::database::DatabaseService;
use crate::models::{Event, Vote, VoteKind};
use crate::utils::errors::{EwmError, Result};
use crate::utils::logging::log_rating_change;

/// Ratings after a recount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingUpdate {
    pub event_id: i64,
    pub event_rating: i64,
    pub initiator_id: i64,
    pub initiator_rating: i64,
}

#[derive(Clone, Debug)]
pub struct RatingService {
    db: DatabaseService,
}

impl RatingService {
    pub fn new(db: DatabaseService) -> Self {
        Self { db }
    }

    /// Cast a first vote on an event the user takes part in
    pub async fn cast_vote(&self, user_id: i64, event_id: i64, kind: VoteKind) -> Result<Vote> {
        let mut tx = self.db.begin().await?;

        let event = self.lock_event(&mut *tx, event_id).await?;
        self.ensure_participant(&mut *tx, user_id, event_id).await?;

        let vote = self.db.votes.create(&mut *tx, user_id, event_id, kind).await?;
        self.recount(&mut *tx, &event).await?;
        tx.commit().await?;

        Ok(vote)
    }

    /// Flip an existing vote
    pub async fn change_vote(&self, user_id: i64, event_id: i64, vote_id: i64, kind: VoteKind) -> Result<Vote> {
        let mut tx = self.db.begin().await?;

        let event = self.lock_event(&mut *tx, event_id).await?;
        let vote = self.db.votes.lock(&mut *tx, vote_id).await?
            .filter(|vote| vote.user_id == user_id && vote.event_id == event_id)
            .ok_or_else(|| {
                EwmError::not_found(format!("Vote {} of user {} on event {} not found", vote_id, user_id, event_id))
            })?;
        self.ensure_participant(&mut *tx, user_id, event_id).await?;
        if vote.kind == kind {
            return Err(EwmError::validation(format!(
                "User {} already voted {:?} on event {}",
                user_id, kind, event_id
            )));
        }

        let vote = self.db.votes.set_kind(&mut *tx, vote_id, kind).await?;
        self.recount(&mut *tx, &event).await?;
        tx.commit().await?;

        Ok(vote)
    }

    /// Drop every vote on an event and reset the derived ratings
    pub async fn clear_votes(&self, event_id: i64) -> Result<RatingUpdate> {
        let mut tx = self.db.begin().await?;

        let event = self.lock_event(&mut *tx, event_id).await?;
        let removed = self.db.votes.delete_for_event(&mut *tx, event_id).await?;
        if removed == 0 {
            return Err(EwmError::validation(format!("Event {} has no votes", event_id)));
        }

        let update = self.recount(&mut *tx, &event).await?;
        tx.commit().await?;

        Ok(update)
    }

    /// Rebuild both ratings of an event from the ledger without changing it
    pub async fn recompute_ratings(&self, event_id: i64) -> Result<RatingUpdate> {
        let mut tx = self.db.begin().await?;

        let event = self.lock_event(&mut *tx, event_id).await?;
        let update = self.recount(&mut *tx, &event).await?;
        tx.commit().await?;

        Ok(update)
    }

    async fn lock_event(&self, conn: &mut PgConnection, event_id: i64) -> Result<Event> {
        self.db.events.lock(conn, event_id).await?
            .ok_or_else(|| EwmError::not_found(format!("Event {} not found", event_id)))
    }

    async fn ensure_participant(&self, conn: &mut PgConnection, user_id: i64, event_id: i64) -> Result<()> {
        if !self.db.users.exists(&mut *conn, user_id).await? {
            return Err(EwmError::not_found(format!("User {} not found", user_id)));
        }
        if !self.db.requests.has_confirmed(&mut *conn, user_id, event_id).await? {
            return Err(EwmError::validation(format!(
                "User {} has no confirmed request for event {}",
                user_id, event_id
            )));
        }
        Ok(())
    }

    /// Full recount of the event and its initiator from the vote ledger.
    /// The event row must already be locked by the caller.
    async fn recount(&self, conn: &mut PgConnection, event: &Event) -> Result<RatingUpdate> {
        let event_tally = self.db.votes.tally_for_event(&mut *conn, event.id).await?;
        self.db.events.set_rating(&mut *conn, event.id, event_tally.net()).await?;
        log_rating_change("event", event.id, event.rating, event_tally.net());

        let initiator = self.db.users.lock(&mut *conn, event.initiator_id).await?
            .ok_or_else(|| EwmError::not_found(format!("User {} not found", event.initiator_id)))?;
        let initiator_tally = self.db.votes.tally_for_initiator(&mut *conn, event.initiator_id).await?;
        self.db.users.set_rating(&mut *conn, initiator.id, initiator_tally.net()).await?;
        log_rating_change("user", initiator.id, initiator.rating, initiator_tally.net());

        Ok(RatingUpdate {
            event_id: event.id,
            event_rating: event_tally.net(),
            initiator_id: initiator.id,
            initiator_rating: initiator_tally.net(),
        })
    }
}
