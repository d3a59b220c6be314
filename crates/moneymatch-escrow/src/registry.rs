//! Match registry: the arena of live records plus the participant index.
//!
//! The registry only stores what it is given; the engine decides when a
//! record may be written. Every write keeps the records and the index in step:
//!
//! - `insert` indexes the initiator
//! - `index_opponent` is called once, on acceptance
//! - `remove` drops the id from both participants

use std::collections::HashMap;

use moneymatch_types::{AccountId, Match, MatchEntry, MatchId, MoneymatchError, Result};

use crate::index::ParticipantIndex;

/// All live matches.
#[derive(Debug, Default, Clone)]
pub struct MatchRegistry {
    records: HashMap<MatchId, Match>,
    index: ParticipantIndex,
}

impl MatchRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail unless `id` is free.
    ///
    /// # Errors
    /// Returns `DuplicateMatch` if a live record already uses `id`.
    pub fn ensure_vacant(&self, id: &MatchId) -> Result<()> {
        if self.records.contains_key(id) {
            Err(MoneymatchError::DuplicateMatch(*id))
        } else {
            Ok(())
        }
    }

    /// Store a new record and index it under its initiator.
    ///
    /// # Errors
    /// Returns `DuplicateMatch` if `record.id` is taken; nothing is
    /// overwritten.
    pub fn insert(&mut self, record: Match) -> Result<()> {
        self.ensure_vacant(&record.id)?;
        self.index.add(record.initiator, record.id);
        self.records.insert(record.id, record);
        Ok(())
    }

    /// Overwrite an existing record. Participants never change, so the index
    /// is untouched.
    ///
    /// # Errors
    /// Returns `MatchNotFound` if there is no live record to replace.
    pub fn replace(&mut self, record: Match) -> Result<()> {
        let slot = self
            .records
            .get_mut(&record.id)
            .ok_or(MoneymatchError::MatchNotFound(record.id))?;
        *slot = record;
        Ok(())
    }

    /// Index a live match under its opponent.
    ///
    /// # Errors
    /// Returns `MatchNotFound` if `id` is not live.
    pub fn index_opponent(&mut self, id: &MatchId) -> Result<()> {
        let opponent = self
            .records
            .get(id)
            .map(|record| record.opponent)
            .ok_or(MoneymatchError::MatchNotFound(*id))?;
        self.index.add(opponent, *id);
        Ok(())
    }

    /// Delete a record and drop it from both participants' lists.
    ///
    /// # Errors
    /// Returns `MatchNotFound` if `id` is not live.
    pub fn remove(&mut self, id: &MatchId) -> Result<Match> {
        let record = self
            .records
            .remove(id)
            .ok_or(MoneymatchError::MatchNotFound(*id))?;
        self.index.remove(&record.initiator, id);
        self.index.remove(&record.opponent, id);
        Ok(record)
    }

    #[must_use]
    pub fn get(&self, id: &MatchId) -> Option<&Match> {
        self.records.get(id)
    }

    /// Tagged lookup: `Absent` for unknown and deleted ids alike.
    #[must_use]
    pub fn entry(&self, id: &MatchId) -> MatchEntry {
        self.records.get(id).cloned().into()
    }

    /// Live matches `account` is indexed under, oldest first.
    #[must_use]
    pub fn matches_for(&self, account: &AccountId) -> Vec<Match> {
        self.index
            .ids_for(account)
            .iter()
            .filter_map(|id| self.records.get(id))
            .cloned()
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Match> {
        self.records.values()
    }

    #[must_use]
    pub fn index(&self) -> &ParticipantIndex {
        &self.index
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
