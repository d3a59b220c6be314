//! # moneymatch-ledger
//!
//! **Collaborator boundary** of the escrow engine: the fungible token ledger
//! it moves stakes through, and the moderator capability it consults before
//! an emergency unwind.
//!
//! ## Architecture
//!
//! 1. **Ledger**: balance / allowance queries, direct and delegated transfers
//! 2. **TokenLedger**: reference in-memory fungible token (owner-minted)
//! 3. **ModeratorCheck**: the single boolean the engine needs from access control
//! 4. **RoleRegistry**: reference role-based access control
//!
//! The engine only ever talks to the traits; any ledger that honours the
//! all-or-nothing transfer contract can back it.

pub mod access;
pub mod ledger;
pub mod token;

pub use access::{ModeratorCheck, Role, RoleRegistry};
pub use ledger::Ledger;
pub use token::TokenLedger;
