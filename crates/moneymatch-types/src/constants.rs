//! System-wide constants for the Moneymatch escrow.

/// Consecutive disagreements tolerated before a match freezes.
pub const DEFAULT_MAX_AGREEMENT_ATTEMPTS: u8 = 3;

/// Longest series a match may be created with (must be odd).
pub const DEFAULT_MAX_SERIES_LENGTH: u32 = 99;

/// Domain separator for match id derivation.
pub const MATCH_ID_DOMAIN: &[u8] = b"moneymatch:match_id:v1:";

/// Default name of the wager token.
pub const DEFAULT_TOKEN_NAME: &str = "Smashpros";

/// Default ticker of the wager token.
pub const DEFAULT_TOKEN_SYMBOL: &str = "SMSH";

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "Moneymatch";
