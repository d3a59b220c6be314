//! # moneymatch-consensus
//!
//! **Pure round-agreement protocol for Moneymatch.**
//!
//! Two participants must name the same round winner before the score moves.
//! This crate decides what a vote does to a [`Match`] record and nothing
//! else:
//!
//! - **Zero side effects**: no ledger calls, no registry, no events
//! - **Deterministic**: same record + same vote -> same outcome
//! - **Bounded disagreement**: a saturating counter freezes the match once
//!   the parties have disagreed too often in a row
//!
//! The escrow engine runs [`cast_vote`] on a copy of the record and acts on
//! the returned [`VoteOutcome`] (paying out on [`VoteOutcome::SeriesWon`]).
//!
//! [`Match`]: moneymatch_types::Match

pub mod agreement;
pub mod majority;
pub mod seat;

pub use agreement::{VoteOutcome, cast_vote};
pub use majority::{is_valid_series_length, wins_needed};
pub use seat::{Seat, seat_of};
