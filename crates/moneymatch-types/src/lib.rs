//! # moneymatch-types
//!
//! Shared types, errors, and configuration for the **Moneymatch** wager escrow.
//!
//! This crate is the leaf dependency of the workspace. It defines:
//!
//! - **Identifiers**: [`AccountId`], [`MatchId`], [`Amount`]
//! - **Match model**: [`Match`], [`MatchState`], [`MatchEntry`]
//! - **Events**: [`MatchEvent`], [`EventRecord`]
//! - **Configuration**: [`EscrowConfig`]
//! - **Errors**: [`MoneymatchError`] with `MM_ERR_` prefix codes
//! - **Constants**: protocol bounds and defaults

pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod ids;
pub mod match_record;

pub use config::*;
pub use error::*;
pub use event::*;
pub use ids::*;
pub use match_record::*;

// Constants are accessed via `moneymatch_types::constants::FOO`.
