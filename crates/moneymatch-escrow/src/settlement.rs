//! Escrow payouts.
//!
//! A payout is a list of legs out of the escrow account. Either every leg
//! lands or none does:
//!
//! ```text
//! Σ legs ≤ escrow balance?   no  → EscrowInvariantViolation, nothing moved
//!        │ yes
//!        ▼
//! transfer leg 1 … leg n     leg k fails → reverse legs 1..k-1 → SettlementFailed
//! ```

use moneymatch_ledger::Ledger;
use moneymatch_types::{AccountId, Amount, MoneymatchError, Result};

/// One transfer out of escrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayoutLeg {
    pub to: AccountId,
    pub amount: Amount,
}

impl PayoutLeg {
    #[must_use]
    pub fn new(to: AccountId, amount: Amount) -> Self {
        Self { to, amount }
    }
}

/// Total paid by `legs`.
///
/// # Errors
/// Returns `AmountOverflow` if the sum does not fit in an [`Amount`].
pub fn total(legs: &[PayoutLeg]) -> Result<Amount> {
    legs.iter().try_fold(0, |acc: Amount, leg| {
        acc.checked_add(leg.amount)
            .ok_or(MoneymatchError::AmountOverflow)
    })
}

/// Pay every leg from `escrow`, or none of them.
///
/// # Errors
/// - `EscrowInvariantViolation` if the escrow does not hold the total
/// - `SettlementFailed` if a leg is refused by the ledger; completed legs
///   are reversed first
pub fn payout<L: Ledger + ?Sized>(
    ledger: &mut L,
    escrow: &AccountId,
    legs: &[PayoutLeg],
) -> Result<()> {
    let needed = total(legs)?;
    let held = ledger.balance_of(escrow);
    if held < needed {
        tracing::error!(escrow = %escrow, held, needed, "escrow cannot cover payout");
        return Err(MoneymatchError::EscrowInvariantViolation {
            reason: format!("escrow holds {held}, payout needs {needed}"),
        });
    }

    for (done, leg) in legs.iter().enumerate() {
        if leg.amount == 0 {
            continue;
        }
        if let Err(err) = ledger.transfer(escrow, &leg.to, leg.amount) {
            tracing::warn!(to = %leg.to, amount = leg.amount, error = %err, "payout leg refused, reversing");
            reverse(ledger, escrow, &legs[..done]);
            return Err(MoneymatchError::SettlementFailed {
                reason: format!("transfer of {} to {} failed: {err}", leg.amount, leg.to),
            });
        }
    }
    Ok(())
}

fn reverse<L: Ledger + ?Sized>(ledger: &mut L, escrow: &AccountId, completed: &[PayoutLeg]) {
    for leg in completed.iter().rev().filter(|leg| leg.amount > 0) {
        if let Err(err) = ledger.transfer(&leg.to, escrow, leg.amount) {
            tracing::error!(to = %leg.to, amount = leg.amount, error = %err, "payout reversal failed");
        }
    }
}
