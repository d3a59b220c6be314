//! # moneymatch-escrow
//!
//! **The escrow engine**: custody of both stakes across the whole match
//! lifecycle, with no trusted coordinator.
//!
//! ## Architecture
//!
//! 1. **MatchRegistry**: live match records plus a per-participant index
//! 2. **EscrowEngine**: `start`, `accept`, `decline`, `agree`,
//!    `emergency_withdraw` and the read queries
//! 3. **Settlement**: escrow payouts that either complete every leg or none
//! 4. **EscrowConservation**: escrow balance == Σ live matches' stakes
//! 5. **EventLog**: append-only notification trail
//!
//! ## Operation order
//!
//! ```text
//! validate → pull stake / pay out (Ledger) → mutate record → update index → emit event
//! ```
//!
//! A failure at any step leaves the registry, the index, the ledger and the
//! event log exactly as they were.

pub mod conservation;
pub mod engine;
pub mod events;
pub mod index;
pub mod registry;
pub mod settlement;

pub use conservation::EscrowConservation;
pub use engine::EscrowEngine;
pub use events::EventLog;
pub use index::ParticipantIndex;
pub use moneymatch_consensus::VoteOutcome;
pub use registry::MatchRegistry;
pub use settlement::{PayoutLeg, payout};
