//! Notification events for the Moneymatch audit trail.
//!
//! Every state-changing operation appends at least one [`MatchEvent`].
//! A resolving vote appends `Agree` followed by `Win` or `Freeze`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountId, Amount, MatchId};

/// What happened to a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchEvent {
    /// A match was opened and the initiator's stake escrowed.
    Sent {
        id: MatchId,
        initiator: AccountId,
        opponent: AccountId,
        amount: Amount,
    },
    /// The opponent matched the stake; the series has started.
    Accepted { id: MatchId, opponent: AccountId },
    /// The opponent refused; the initiator's stake was returned.
    Declined {
        id: MatchId,
        opponent: AccountId,
        refunded: Amount,
    },
    /// A participant voted for a round winner.
    Agree {
        id: MatchId,
        voter: AccountId,
        claimed_winner: AccountId,
    },
    /// The series was won and the pot paid out.
    Win {
        id: MatchId,
        winner: AccountId,
        payout: Amount,
    },
    /// The disagreement bound was reached.
    Freeze { id: MatchId, attempts: u8 },
    /// A moderator returned each party's own stake.
    Disputed {
        id: MatchId,
        moderator: AccountId,
        refunded_each: Amount,
    },
}

impl MatchEvent {
    /// The match this event belongs to.
    #[must_use]
    pub fn match_id(&self) -> MatchId {
        match self {
            Self::Sent { id, .. }
            | Self::Accepted { id, .. }
            | Self::Declined { id, .. }
            | Self::Agree { id, .. }
            | Self::Win { id, .. }
            | Self::Freeze { id, .. }
            | Self::Disputed { id, .. } => *id,
        }
    }

    /// Stable event name.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Sent { .. } => "MATCH_SENT",
            Self::Accepted { .. } => "MATCH_ACCEPTED",
            Self::Declined { .. } => "MATCH_DECLINED",
            Self::Agree { .. } => "ROUND_AGREE",
            Self::Win { .. } => "MATCH_WIN",
            Self::Freeze { .. } => "MATCH_FREEZE",
            Self::Disputed { .. } => "MATCH_DISPUTED",
        }
    }
}

impl std::fmt::Display for MatchEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.kind(), self.match_id())
    }
}

/// An event as appended to the engine's log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Position in the log, starting at 0. Never reused, even after draining.
    pub sequence: u64,
    pub event: MatchEvent,
    pub emitted_at: DateTime<Utc>,
}
