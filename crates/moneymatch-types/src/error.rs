//! Error types for the Moneymatch escrow.
//!
//! All errors use the `MM_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Match lifecycle errors
//! - 2xx: Identity / authorization errors
//! - 3xx: Economic and ledger errors
//! - 4xx: Consensus errors
//! - 6xx: Settlement and invariant errors
//! - 9xx: Configuration / internal errors

use thiserror::Error;

use crate::{AccountId, Amount, MatchId, MatchState};

/// Central error enum for all Moneymatch operations.
///
/// Every variant is a precondition violation: an operation that returns one
/// of these has changed nothing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneymatchError {
    // =================================================================
    // Match Lifecycle Errors (1xx)
    // =================================================================
    /// No live match is registered under this id.
    #[error("MM_ERR_100: Match must exist: {0}")]
    MatchNotFound(MatchId),

    /// The nil id was supplied.
    #[error("MM_ERR_101: Match id must not be null")]
    NullMatchId,

    /// A freshly derived id is already taken.
    #[error("MM_ERR_102: Match already exists: {0}")]
    DuplicateMatch(MatchId),

    /// The match is not in a state that allows this operation.
    #[error("MM_ERR_103: Wrong match state for {operation}: {actual}")]
    WrongState {
        operation: &'static str,
        actual: MatchState,
    },

    /// Emergency withdrawal requested while the parties can still agree.
    #[error("MM_ERR_104: Users can still try to reach a consensus (attempts {attempts}/{max})")]
    ConsensusStillPossible { attempts: u8, max: u8 },

    /// `max_matches` is even (or zero); a series could end tied.
    #[error("MM_ERR_105: maxMatches must be odd, got {0}")]
    EvenSeriesLength(u32),

    /// `max_matches` exceeds the configured series bound.
    #[error("MM_ERR_106: maxMatches {requested} exceeds limit {limit}")]
    SeriesTooLong { requested: u32, limit: u32 },

    // =================================================================
    // Identity / Authorization Errors (2xx)
    // =================================================================
    /// The opponent is the null account.
    #[error("MM_ERR_200: Opponent must not be the null account")]
    NullOpponent,

    /// The initiator named themselves as opponent.
    #[error("MM_ERR_201: You cannot face yourself in a moneymatch")]
    SelfMatch,

    /// Only the recorded opponent may accept or decline.
    #[error("MM_ERR_202: Caller must be the opponent")]
    NotOpponent,

    /// The caller is neither initiator nor opponent.
    #[error("MM_ERR_203: Not in the match: {0}")]
    NotParticipant(AccountId),

    /// The claimed round winner is neither initiator nor opponent.
    #[error("MM_ERR_204: Claimed winner is not in the match: {0}")]
    InvalidClaimedWinner(AccountId),

    /// The caller lacks the moderator capability.
    #[error("MM_ERR_205: Caller is not a moderator: {0}")]
    NotModerator(AccountId),

    /// The caller lacks the privilege for an administrative action.
    #[error("MM_ERR_206: Unauthorized account: {0}")]
    Unauthorized(AccountId),

    /// A null account was supplied where a real one is required.
    #[error("MM_ERR_207: Null account not allowed")]
    NullAccount,

    // =================================================================
    // Economic / Ledger Errors (3xx)
    // =================================================================
    /// Zero wager.
    #[error("MM_ERR_300: Positive amount is required")]
    ZeroAmount,

    /// The acceptance amount differs from the recorded wager.
    #[error("MM_ERR_301: Amount should be the same as agreed: expected {expected}, got {offered}")]
    AmountMismatch { expected: Amount, offered: Amount },

    /// Not enough balance to perform the operation.
    #[error("MM_ERR_302: Insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: Amount, available: Amount },

    /// The escrow has not been approved to move this much on the payer's behalf.
    #[error("MM_ERR_303: Insufficient allowance: need {needed}, approved {approved}")]
    InsufficientAllowance { needed: Amount, approved: Amount },

    /// An amount computation would overflow.
    #[error("MM_ERR_304: Amount overflow")]
    AmountOverflow,

    // =================================================================
    // Consensus Errors (4xx)
    // =================================================================
    /// A vote resolved into an impossible score (a series that cannot end).
    #[error("MM_ERR_400: Score overflow: {score} rounds in a best-of-{max_matches}")]
    ScoreOverflow { score: u32, max_matches: u32 },

    // =================================================================
    // Settlement / Invariant Errors (6xx)
    // =================================================================
    /// A payout leg failed and the completed legs were reversed.
    #[error("MM_ERR_600: Settlement failed: {reason}")]
    SettlementFailed { reason: String },

    /// Escrow conservation invariant violated. Critical safety alert.
    #[error("MM_ERR_601: Escrow invariant violation: {reason}")]
    EscrowInvariantViolation { reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("MM_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Configuration error (invalid bounds, null escrow account, etc.).
    #[error("MM_ERR_902: Configuration error: {0}")]
    Configuration(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, MoneymatchError>;
