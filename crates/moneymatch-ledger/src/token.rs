//! Reference fungible token.
//!
//! Tracks per-account balances and per-(owner, spender) allowances. Supply
//! only grows through owner-gated minting. All mutations are atomic: either
//! the full operation succeeds or nothing changes.

use std::collections::HashMap;

use moneymatch_types::{constants, AccountId, Amount, MoneymatchError, Result};

use crate::ledger::Ledger;

/// In-memory allowance-based token.
#[derive(Debug, Clone)]
pub struct TokenLedger {
    name: String,
    symbol: String,
    /// The only account allowed to mint.
    owner: AccountId,
    balances: HashMap<AccountId, Amount>,
    /// Keyed by (owner, spender).
    allowances: HashMap<(AccountId, AccountId), Amount>,
    total_supply: Amount,
}

impl TokenLedger {
    /// Create an empty token with the given minting owner.
    #[must_use]
    pub fn new(owner: AccountId, name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            owner,
            balances: HashMap::new(),
            allowances: HashMap::new(),
            total_supply: 0,
        }
    }

    /// Create the default wager token (`Smashpros` / `SMSH`).
    #[must_use]
    pub fn smashpros(owner: AccountId) -> Self {
        Self::new(
            owner,
            constants::DEFAULT_TOKEN_NAME,
            constants::DEFAULT_TOKEN_SYMBOL,
        )
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    #[must_use]
    pub fn owner(&self) -> AccountId {
        self.owner
    }

    #[must_use]
    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    /// Create `amount` new tokens for `to`.
    ///
    /// # Errors
    /// - `Unauthorized` if `caller` is not the token owner
    /// - `NullAccount` if `to` is null
    /// - `AmountOverflow` if supply would overflow
    pub fn mint(&mut self, caller: &AccountId, to: &AccountId, amount: Amount) -> Result<()> {
        if *caller != self.owner {
            return Err(MoneymatchError::Unauthorized(*caller));
        }
        if to.is_null() {
            return Err(MoneymatchError::NullAccount);
        }
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(MoneymatchError::AmountOverflow)?;

        *self.balances.entry(*to).or_default() += amount;
        self.total_supply = supply;
        tracing::debug!(to = %to, amount, "minted");
        Ok(())
    }

    /// Set the allowance `owner` grants `spender`, replacing any previous one.
    ///
    /// # Errors
    /// Returns `NullAccount` if either side is null.
    pub fn approve(&mut self, owner: &AccountId, spender: &AccountId, amount: Amount) -> Result<()> {
        if owner.is_null() || spender.is_null() {
            return Err(MoneymatchError::NullAccount);
        }
        self.allowances.insert((*owner, *spender), amount);
        Ok(())
    }

    /// Sum of every balance. Equals [`TokenLedger::total_supply`] unless
    /// something has gone badly wrong.
    #[must_use]
    pub fn circulating(&self) -> Amount {
        self.balances.values().sum()
    }

    /// Check the recipient and the payer's balance; return the payer's balance.
    fn check_move(&self, from: &AccountId, to: &AccountId, amount: Amount) -> Result<Amount> {
        if to.is_null() {
            return Err(MoneymatchError::NullAccount);
        }
        let available = self.balance_of(from);
        if available < amount {
            return Err(MoneymatchError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        Ok(available)
    }

    fn apply_move(&mut self, from: &AccountId, to: &AccountId, amount: Amount, available: Amount) {
        self.balances.insert(*from, available - amount);
        *self.balances.entry(*to).or_default() += amount;
    }
}

impl Ledger for TokenLedger {
    fn balance_of(&self, account: &AccountId) -> Amount {
        self.balances.get(account).copied().unwrap_or_default()
    }

    fn allowance(&self, owner: &AccountId, spender: &AccountId) -> Amount {
        self.allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or_default()
    }

    fn transfer(&mut self, from: &AccountId, to: &AccountId, amount: Amount) -> Result<()> {
        let available = self.check_move(from, to, amount)?;
        self.apply_move(from, to, amount, available);
        Ok(())
    }

    fn transfer_from(
        &mut self,
        spender: &AccountId,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<()> {
        let available = self.check_move(from, to, amount)?;
        let approved = self.allowance(from, spender);
        if approved < amount {
            return Err(MoneymatchError::InsufficientAllowance {
                needed: amount,
                approved,
            });
        }

        self.allowances.insert((*from, *spender), approved - amount);
        self.apply_move(from, to, amount, available);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (TokenLedger, AccountId, AccountId, AccountId) {
        let owner = AccountId::from_seed([1; 32]);
        let alice = AccountId::from_seed([2; 32]);
        let bob = AccountId::from_seed([3; 32]);
        (TokenLedger::smashpros(owner), owner, alice, bob)
    }

    #[test]
    fn token_metadata() {
        let (token, owner, ..) = setup();
        assert_eq!(token.name(), "Smashpros");
        assert_eq!(token.symbol(), "SMSH");
        assert_eq!(token.owner(), owner);
    }

    #[test]
    fn owner_mints() {
        let (mut token, owner, alice, _) = setup();
        token.mint(&owner, &alice, 10_000).unwrap();
        assert_eq!(token.balance_of(&alice), 10_000);
        assert_eq!(token.total_supply(), 10_000);
        assert_eq!(token.circulating(), 10_000);
    }

    #[test]
    fn non_owner_cannot_mint() {
        let (mut token, _, alice, _) = setup();
        let err = token.mint(&alice, &alice, 10_000).unwrap_err();
        assert_eq!(err, MoneymatchError::Unauthorized(alice));
        assert_eq!(token.total_supply(), 0);
    }

    #[test]
    fn mint_to_null_fails() {
        let (mut token, owner, ..) = setup();
        let err = token.mint(&owner, &AccountId::NULL, 1).unwrap_err();
        assert_eq!(err, MoneymatchError::NullAccount);
    }

    #[test]
    fn transfer_moves_balance() {
        let (mut token, owner, alice, bob) = setup();
        token.mint(&owner, &alice, 1_000).unwrap();
        token.transfer(&alice, &bob, 400).unwrap();
        assert_eq!(token.balance_of(&alice), 600);
        assert_eq!(token.balance_of(&bob), 400);
        assert_eq!(token.circulating(), token.total_supply());
    }

    #[test]
    fn transfer_insufficient_fails_without_change() {
        let (mut token, owner, alice, bob) = setup();
        token.mint(&owner, &alice, 100).unwrap();
        let err = token.transfer(&alice, &bob, 200).unwrap_err();
        assert!(matches!(err, MoneymatchError::InsufficientBalance { .. }));
        assert_eq!(token.balance_of(&alice), 100);
        assert_eq!(token.balance_of(&bob), 0);
    }

    #[test]
    fn transfer_from_consumes_allowance() {
        let (mut token, owner, alice, bob) = setup();
        let escrow = AccountId::from_seed([9; 32]);
        token.mint(&owner, &alice, 1_000).unwrap();
        token.approve(&alice, &escrow, 700).unwrap();

        token.transfer_from(&escrow, &alice, &escrow, 500).unwrap();
        assert_eq!(token.balance_of(&alice), 500);
        assert_eq!(token.balance_of(&escrow), 500);
        assert_eq!(token.allowance(&alice, &escrow), 200);

        // Allowance is per spender.
        assert_eq!(token.allowance(&alice, &bob), 0);
    }

    #[test]
    fn transfer_from_without_approval_fails() {
        let (mut token, owner, alice, _) = setup();
        let escrow = AccountId::from_seed([9; 32]);
        token.mint(&owner, &alice, 1_000).unwrap();

        let err = token.transfer_from(&escrow, &alice, &escrow, 500).unwrap_err();
        assert_eq!(
            err,
            MoneymatchError::InsufficientAllowance {
                needed: 500,
                approved: 0
            }
        );
        assert_eq!(token.balance_of(&alice), 1_000);
        assert_eq!(token.balance_of(&escrow), 0);
    }

    #[test]
    fn transfer_from_checks_balance_before_allowance() {
        let (mut token, owner, alice, _) = setup();
        let escrow = AccountId::from_seed([9; 32]);
        token.mint(&owner, &alice, 100).unwrap();

        let err = token.transfer_from(&escrow, &alice, &escrow, 500).unwrap_err();
        assert!(matches!(err, MoneymatchError::InsufficientBalance { .. }));
    }

    #[test]
    fn approve_overwrites() {
        let (mut token, _, alice, bob) = setup();
        token.approve(&alice, &bob, 500).unwrap();
        token.approve(&alice, &bob, 50).unwrap();
        assert_eq!(token.allowance(&alice, &bob), 50);
    }

    #[test]
    fn unknown_account_is_zero() {
        let (token, ..) = setup();
        assert_eq!(token.balance_of(&AccountId::random()), 0);
    }
}
