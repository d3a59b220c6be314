//! The two-slot round agreement protocol.
//!
//! ```text
//!   STARTED --vote--> VOTING (one slot filled)
//!   VOTING  --vote--> VOTING (other slot still empty; a repeat vote overwrites)
//!   VOTING  --vote--> both slots filled:
//!       same account   -> score += 1, attempts = 0
//!                         -> FINISHED if the score reaches the majority
//!                         -> STARTED otherwise
//!       different      -> attempts += 1
//!                         -> FROZEN at the bound
//!                         -> VOTING otherwise
//! ```
//!
//! Slots are cleared after every resolution, agreed or not.

use moneymatch_types::{AccountId, Match, MatchState, MoneymatchError, Result};
use serde::{Deserialize, Serialize};

use crate::majority::wins_needed;
use crate::seat::{Seat, seat_of};

/// What a single vote did to the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoteOutcome {
    /// First vote of the round; the match moved to `Voting`.
    Opened,
    /// Vote stored; waiting for the other participant.
    Recorded,
    /// Both agreed; the round winner scored but the series continues.
    RoundWon { winner: AccountId, score: u32 },
    /// Both agreed and the round winner reached the majority. The record is
    /// `Finished` with `winner` set; the pot has not been paid yet.
    SeriesWon { winner: AccountId, score: u32 },
    /// The votes differed; the round stays open.
    Disagreed { attempts: u8 },
    /// The votes differed for the last allowed time; the match is `Frozen`.
    Frozen { attempts: u8 },
}

impl VoteOutcome {
    /// Whether this vote resolved the round (agreed or not).
    #[must_use]
    pub fn is_resolution(&self) -> bool {
        !matches!(self, Self::Opened | Self::Recorded)
    }
}

/// Apply `voter`'s claim that `claimed_winner` won the current round.
///
/// Checks, in order: the match accepts votes, `voter` is a participant,
/// `claimed_winner` is a participant. On error the record is untouched.
///
/// # Errors
/// - `WrongState` outside `Started` / `Voting`
/// - `NotParticipant` if `voter` is not in the match
/// - `InvalidClaimedWinner` if `claimed_winner` is not in the match
/// - `ScoreOverflow` if the score cannot be incremented
pub fn cast_vote(
    record: &mut Match,
    voter: &AccountId,
    claimed_winner: &AccountId,
    max_attempts: u8,
) -> Result<VoteOutcome> {
    if !record.state.accepts_votes() {
        return Err(MoneymatchError::WrongState {
            operation: "agree",
            actual: record.state,
        });
    }
    let seat = seat_of(record, voter).ok_or(MoneymatchError::NotParticipant(*voter))?;
    let claimed_seat = seat_of(record, claimed_winner)
        .ok_or(MoneymatchError::InvalidClaimedWinner(*claimed_winner))?;

    let opening = record.state == MatchState::Started;
    if opening {
        // Leftovers from the previous round never count.
        clear_slots(record);
    }
    *slot_mut(record, seat) = *claimed_winner;

    if opening {
        record.state = MatchState::Voting;
        return Ok(VoteOutcome::Opened);
    }
    if slot(record, seat.other()).is_null() {
        return Ok(VoteOutcome::Recorded);
    }

    let other_claim = *slot(record, seat.other());
    clear_slots(record);
    if other_claim == *claimed_winner {
        settle_round(record, claimed_seat)
    } else {
        Ok(register_disagreement(record, max_attempts))
    }
}

fn settle_round(record: &mut Match, winner_seat: Seat) -> Result<VoteOutcome> {
    record.attempts = 0;
    record.frozen = false;

    let (winner, score) = match winner_seat {
        Seat::Initiator => (record.initiator, &mut record.initiator_score),
        Seat::Opponent => (record.opponent, &mut record.opponent_score),
    };
    *score = score
        .checked_add(1)
        .ok_or(MoneymatchError::ScoreOverflow {
            score: *score,
            max_matches: record.max_matches,
        })?;
    let score = *score;

    if score >= wins_needed(record.max_matches) {
        record.winner = winner;
        record.state = MatchState::Finished;
        Ok(VoteOutcome::SeriesWon { winner, score })
    } else {
        record.state = MatchState::Started;
        Ok(VoteOutcome::RoundWon { winner, score })
    }
}

fn register_disagreement(record: &mut Match, max_attempts: u8) -> VoteOutcome {
    record.attempts = record.attempts.saturating_add(1).min(max_attempts);
    if record.attempts >= max_attempts {
        record.frozen = true;
        record.state = MatchState::Frozen;
        VoteOutcome::Frozen {
            attempts: record.attempts,
        }
    } else {
        record.state = MatchState::Voting;
        VoteOutcome::Disagreed {
            attempts: record.attempts,
        }
    }
}

fn slot(record: &Match, seat: Seat) -> &AccountId {
    match seat {
        Seat::Initiator => &record.initiator_agreement,
        Seat::Opponent => &record.opponent_agreement,
    }
}

fn slot_mut(record: &mut Match, seat: Seat) -> &mut AccountId {
    match seat {
        Seat::Initiator => &mut record.initiator_agreement,
        Seat::Opponent => &mut record.opponent_agreement,
    }
}

fn clear_slots(record: &mut Match) {
    record.initiator_agreement = AccountId::NULL;
    record.opponent_agreement = AccountId::NULL;
}
