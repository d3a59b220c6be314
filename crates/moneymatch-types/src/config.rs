//! Configuration for the escrow engine.

use serde::{Deserialize, Serialize};

use crate::{constants, AccountId, MoneymatchError, Result};

/// Configuration for a single escrow engine instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowConfig {
    /// The engine's own ledger account. Stakes are pulled into it and paid
    /// out of it.
    pub escrow_account: AccountId,
    /// Consecutive disagreements before a match freezes.
    pub max_agreement_attempts: u8,
    /// Longest series a match may be opened with.
    pub max_series_length: u32,
}

impl EscrowConfig {
    /// Default bounds for the given escrow account.
    #[must_use]
    pub fn new(escrow_account: AccountId) -> Self {
        Self {
            escrow_account,
            ..Self::default()
        }
    }

    /// Reject configurations the engine cannot run with.
    ///
    /// # Errors
    /// Returns [`MoneymatchError::Configuration`] for a null escrow account,
    /// a zero attempt bound, or a series bound that is zero or even.
    pub fn validate(&self) -> Result<()> {
        if self.escrow_account.is_null() {
            return Err(MoneymatchError::Configuration(
                "escrow account must not be null".into(),
            ));
        }
        if self.max_agreement_attempts == 0 {
            return Err(MoneymatchError::Configuration(
                "max_agreement_attempts must be at least 1".into(),
            ));
        }
        if self.max_series_length % 2 == 0 {
            return Err(MoneymatchError::Configuration(format!(
                "max_series_length must be odd, got {}",
                self.max_series_length
            )));
        }
        Ok(())
    }
}

impl Default for EscrowConfig {
    fn default() -> Self {
        Self {
            escrow_account: AccountId::NULL,
            max_agreement_attempts: constants::DEFAULT_MAX_AGREEMENT_ATTEMPTS,
            max_series_length: constants::DEFAULT_MAX_SERIES_LENGTH,
        }
    }
}
