//! Vote ledger repository implementation

use sqlx::PgConnection;
use crate::models::rating::{Vote, VoteKind, VoteTally, VOTE_COLUMNS};
use crate::utils::errors::EwmError;

/// All vote access happens inside the rating transaction, so the repository is stateless
#[derive(Clone, Copy, Debug, Default)]
pub struct VoteRepository;

impl VoteRepository {
    pub fn new() -> Self {
        Self
    }

    /// Record a vote; a second vote by the same user on the same event is rejected as invalid input
    pub async fn create(
        &self,
        conn: &mut PgConnection,
        user_id: i64,
        event_id: i64,
        kind: VoteKind,
    ) -> Result<Vote, EwmError> {
        sqlx::query_as::<_, Vote>(&format!(
            "INSERT INTO votes (user_id, event_id, kind) VALUES ($1, $2, $3) RETURNING {}",
            VOTE_COLUMNS
        ))
        .bind(user_id)
        .bind(event_id)
        .bind(kind)
        .fetch_one(conn)
        .await
        .map_err(|e| {
            if EwmError::is_unique_violation(&e) {
                EwmError::validation(format!("User {} has already voted on event {}", user_id, event_id))
            } else {
                EwmError::Database(e)
            }
        })
    }

    pub async fn lock(&self, conn: &mut PgConnection, id: i64) -> Result<Option<Vote>, EwmError> {
        let vote = sqlx::query_as::<_, Vote>(&format!("SELECT {} FROM votes WHERE id = $1 FOR UPDATE", VOTE_COLUMNS))
            .bind(id)
            .fetch_optional(conn)
            .await?;

        Ok(vote)
    }

    pub async fn set_kind(&self, conn: &mut PgConnection, id: i64, kind: VoteKind) -> Result<Vote, EwmError> {
        let vote = sqlx::query_as::<_, Vote>(&format!(
            "UPDATE votes SET kind = $2 WHERE id = $1 RETURNING {}",
            VOTE_COLUMNS
        ))
        .bind(id)
        .bind(kind)
        .fetch_one(conn)
        .await?;

        Ok(vote)
    }

    /// Delete the whole ledger of an event, returning the number of removed votes
    pub async fn delete_for_event(&self, conn: &mut PgConnection, event_id: i64) -> Result<u64, EwmError> {
        let result = sqlx::query("DELETE FROM votes WHERE event_id = $1")
            .bind(event_id)
            .execute(conn)
            .await?;

        Ok(result.rows_affected())
    }

    /// Likes and dislikes cast on one event
    pub async fn tally_for_event(&self, conn: &mut PgConnection, event_id: i64) -> Result<VoteTally, EwmError> {
        let tally = sqlx::query_as::<_, VoteTally>(
            r#"
            SELECT COUNT(*) FILTER (WHERE kind = 'LIKE') AS likes,
                   COUNT(*) FILTER (WHERE kind = 'DISLIKE') AS dislikes
            FROM votes
            WHERE event_id = $1
            "#
        )
        .bind(event_id)
        .fetch_one(conn)
        .await?;

        Ok(tally)
    }

    /// Likes and dislikes cast on every event a user initiated
    pub async fn tally_for_initiator(&self, conn: &mut PgConnection, initiator_id: i64) -> Result<VoteTally, EwmError> {
        let tally = sqlx::query_as::<_, VoteTally>(
            r#"
            SELECT COUNT(*) FILTER (WHERE v.kind = 'LIKE') AS likes,
                   COUNT(*) FILTER (WHERE v.kind = 'DISLIKE') AS dislikes
            FROM votes v
            JOIN events e ON e.id = v.event_id
            WHERE e.initiator_id = $1
            "#
        )
        .bind(initiator_id)
        .fetch_one(conn)
        .await?;

        Ok(tally)
    }
}
