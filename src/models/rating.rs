//! Vote ledger model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const VOTE_COLUMNS: &str = "id, user_id, event_id, kind";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "vote_kind", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum VoteKind {
    Like,
    Dislike,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Vote {
    pub id: i64,
    pub user_id: i64,
    pub event_id: i64,
    pub kind: VoteKind,
}

/// Like and dislike counts over a slice of the ledger
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct VoteTally {
    pub likes: i64,
    pub dislikes: i64,
}

impl VoteTally {
    /// Net rating: likes minus dislikes
    pub fn net(&self) -> i64 {
        self.likes - self.dislikes
    }
}

/// Direction for rating-ordered listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RatingOrder {
    Asc,
    Desc,
}
