//! Escrow conservation checker.
//!
//! Two views of the escrow must always agree:
//! ```text
//! Σ(pulled in) - Σ(paid out) == Σ(escrowed by live matches) == ledger.balance_of(escrow)
//! ```
//!
//! The first comes from this tracker, the second from the registry, the third
//! from the ledger. Any disagreement means a stake was lost or minted.

use moneymatch_types::{Amount, MoneymatchError, Result};

/// Running totals of every stake moved in or out of escrow.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EscrowConservation {
    pulled_in: Amount,
    paid_out: Amount,
}

impl EscrowConservation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a stake pulled into escrow.
    pub fn record_pull(&mut self, amount: Amount) {
        self.pulled_in = self.pulled_in.saturating_add(amount);
    }

    /// Record an amount paid out of escrow.
    pub fn record_payout(&mut self, amount: Amount) {
        self.paid_out = self.paid_out.saturating_add(amount);
    }

    /// What the escrow should hold: pulled in minus paid out.
    #[must_use]
    pub fn expected_held(&self) -> Amount {
        self.pulled_in.saturating_sub(self.paid_out)
    }

    #[must_use]
    pub fn total_pulled_in(&self) -> Amount {
        self.pulled_in
    }

    #[must_use]
    pub fn total_paid_out(&self) -> Amount {
        self.paid_out
    }

    /// Check the tracker against the ledger balance and the registry's
    /// committed total.
    ///
    /// # Errors
    /// Returns [`MoneymatchError::EscrowInvariantViolation`] if any two
    /// disagree or more was paid out than pulled in.
    pub fn verify(&self, actual_held: Amount, committed: Amount) -> Result<()> {
        let expected = self.expected_held();
        if self.paid_out > self.pulled_in || actual_held != expected || committed != expected {
            return Err(MoneymatchError::EscrowInvariantViolation {
                reason: format!(
                    "escrow holds {actual_held}, live matches commit {committed}, \
                     expected {expected} (pulled_in={}, paid_out={})",
                    self.pulled_in, self.paid_out,
                ),
            });
        }
        Ok(())
    }
}
