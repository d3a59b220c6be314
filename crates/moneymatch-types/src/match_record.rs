//! # Match: the escrowed best-of-N wager
//!
//! ## State Machine
//!
//! ```text
//!   ┌──────┐ accept ┌─────────┐ first vote ┌────────┐ 3rd disagreement ┌────────┐
//!   │ SENT ├───────▶│ STARTED ├───────────▶│ VOTING ├─────────────────▶│ FROZEN │
//!   └──┬───┘        └─────────┘◀───────────┴───┬────┘                  └───┬────┘
//!      │ decline          ▲   round agreed     │ series won                │ moderator
//!      ▼                  │                    ▼                           ▼
//!   (deleted)             │               ┌──────────┐               ┌──────────┐
//!                         │               │ FINISHED │               │ DISPUTED │
//!                         │               └──────────┘               └──────────┘
//! ```
//!
//! FINISHED and DISPUTED are terminal: reaching either deletes the record,
//! as does a decline. A deleted record reads back as [`Match::default`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountId, Amount, MatchId};

/// Lifecycle state of a match.
///
/// `Sent` is the zero value, so a blank record reads as `Sent` like every
/// other zeroed field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchState {
    /// Initiator's stake is escrowed; waiting for the opponent.
    #[default]
    Sent,
    /// Both stakes escrowed; no vote cast for the current round.
    Started,
    /// At least one vote is pending, or a disagreement left the round open.
    Voting,
    /// Series won and paid out. **Terminal.**
    Finished,
    /// Disagreement bound exhausted; only a moderator can unwind it.
    Frozen,
    /// Unwound by a moderator, stakes returned. **Terminal.**
    Disputed,
}

impl MatchState {
    /// Whether the agreement protocol accepts votes in this state.
    #[must_use]
    pub fn accepts_votes(&self) -> bool {
        matches!(self, Self::Started | Self::Voting)
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished | Self::Disputed)
    }
}

impl std::fmt::Display for MatchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sent => write!(f, "SENT"),
            Self::Started => write!(f, "STARTED"),
            Self::Voting => write!(f, "VOTING"),
            Self::Finished => write!(f, "FINISHED"),
            Self::Frozen => write!(f, "FROZEN"),
            Self::Disputed => write!(f, "DISPUTED"),
        }
    }
}

/// A wager between two accounts over a best-of-`max_matches` series.
///
/// `amount` is the per-side stake and never changes; `pot` is what the escrow
/// currently holds for this match (`amount` once sent, `2×amount` once
/// accepted).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub initiator: AccountId,
    pub opponent: AccountId,
    /// Per-side stake.
    pub amount: Amount,
    /// Pooled escrow balance for this match.
    pub pot: Amount,
    /// Series length; always odd.
    pub max_matches: u32,
    pub initiator_score: u32,
    pub opponent_score: u32,
    /// `AccountId::NULL` until the series is won.
    pub winner: AccountId,
    /// Initiator's pending vote for the current round.
    pub initiator_agreement: AccountId,
    /// Opponent's pending vote for the current round.
    pub opponent_agreement: AccountId,
    /// Consecutive disagreements since the last agreed round.
    pub attempts: u8,
    pub frozen: bool,
    pub state: MatchState,
    pub created_at: DateTime<Utc>,
}

impl Match {
    /// A freshly sent match: initiator's stake escrowed, everything else zeroed.
    #[must_use]
    pub fn open(
        id: MatchId,
        initiator: AccountId,
        opponent: AccountId,
        amount: Amount,
        max_matches: u32,
    ) -> Self {
        Self {
            id,
            initiator,
            opponent,
            amount,
            pot: amount,
            max_matches,
            created_at: Utc::now(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_participant(&self, account: &AccountId) -> bool {
        !account.is_null() && (*account == self.initiator || *account == self.opponent)
    }

    /// The other party, if `account` is a participant.
    #[must_use]
    pub fn counterpart(&self, account: &AccountId) -> Option<AccountId> {
        if account.is_null() {
            None
        } else if *account == self.initiator {
            Some(self.opponent)
        } else if *account == self.opponent {
            Some(self.initiator)
        } else {
            None
        }
    }

    /// Current score of `account`, or `None` for outsiders.
    #[must_use]
    pub fn score_of(&self, account: &AccountId) -> Option<u32> {
        if account.is_null() {
            None
        } else if *account == self.initiator {
            Some(self.initiator_score)
        } else if *account == self.opponent {
            Some(self.opponent_score)
        } else {
            None
        }
    }

    /// What the escrow must hold on behalf of this record.
    #[must_use]
    pub fn escrowed(&self) -> Amount {
        match self.state {
            MatchState::Sent => self.amount,
            MatchState::Started | MatchState::Voting | MatchState::Frozen => self.pot,
            MatchState::Finished | MatchState::Disputed => 0,
        }
    }

    /// Whether this is the zero-valued record.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.id.is_nil()
    }
}

/// Registry lookup result.
///
/// A match that never existed and one that was deleted on reaching a terminal
/// state are the same `Absent`; callers cannot tell them apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchEntry {
    Absent,
    Active(Match),
}

impl MatchEntry {
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }

    /// The record, or the zero-valued record when absent.
    #[must_use]
    pub fn into_record(self) -> Match {
        match self {
            Self::Absent => Match::default(),
            Self::Active(record) => record,
        }
    }
}

impl From<Option<Match>> for MatchEntry {
    fn from(record: Option<Match>) -> Self {
        record.map_or(Self::Absent, Self::Active)
    }
}
