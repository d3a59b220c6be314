//! The fungible ledger as seen by the escrow engine.

use moneymatch_types::{AccountId, Amount, Result};

/// Balance storage and transfers.
///
/// Implementations must be all-or-nothing: a transfer that returns an error
/// leaves every balance and allowance exactly as it was.
pub trait Ledger {
    /// Spendable balance of `account`. Unknown accounts hold zero.
    fn balance_of(&self, account: &AccountId) -> Amount;

    /// How much `spender` may still pull from `owner` via [`Ledger::transfer_from`].
    fn allowance(&self, owner: &AccountId, spender: &AccountId) -> Amount;

    /// Move `amount` from `from` to `to`, authorised by `from` itself.
    ///
    /// # Errors
    /// `InsufficientBalance` if `from` holds less than `amount`.
    fn transfer(&mut self, from: &AccountId, to: &AccountId, amount: Amount) -> Result<()>;

    /// Move `amount` from `from` to `to` on the strength of an allowance
    /// `from` granted to `spender`. Consumes that allowance.
    ///
    /// # Errors
    /// `InsufficientBalance` if `from` holds less than `amount`;
    /// `InsufficientAllowance` if the approval does not cover it.
    fn transfer_from(
        &mut self,
        spender: &AccountId,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<()>;
}
