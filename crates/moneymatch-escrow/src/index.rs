//! Per-participant secondary index: account → match ids, insertion-ordered.
//!
//! The index duplicates what the records already say. It is updated in the
//! same call as every record mutation so that a participant's match list is
//! never stale relative to the registry.

use std::collections::HashMap;

use moneymatch_types::{AccountId, MatchId};

/// Which matches each account is currently indexed under.
#[derive(Debug, Default, Clone)]
pub struct ParticipantIndex {
    /// Per-account ids, oldest first.
    by_account: HashMap<AccountId, Vec<MatchId>>,
}

impl ParticipantIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Index `id` under `account`. Re-adding an indexed id keeps its
    /// first position.
    pub fn add(&mut self, account: AccountId, id: MatchId) {
        let ids = self.by_account.entry(account).or_default();
        if !ids.contains(&id) {
            ids.push(id);
        }
    }

    /// Drop `id` from `account`'s list. Empty lists are removed entirely.
    pub fn remove(&mut self, account: &AccountId, id: &MatchId) {
        if let Some(ids) = self.by_account.get_mut(account) {
            ids.retain(|existing| existing != id);
            if ids.is_empty() {
                self.by_account.remove(account);
            }
        }
    }

    /// Ids indexed under `account`, oldest first.
    #[must_use]
    pub fn ids_for(&self, account: &AccountId) -> &[MatchId] {
        self.by_account
            .get(account)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn contains(&self, account: &AccountId, id: &MatchId) -> bool {
        self.ids_for(account).contains(id)
    }

    /// Number of accounts with at least one indexed match.
    #[must_use]
    pub fn account_count(&self) -> usize {
        self.by_account.len()
    }
}
