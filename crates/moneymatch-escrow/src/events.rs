//! Append-only event log.

use chrono::Utc;
use moneymatch_types::{EventRecord, MatchEvent, MatchId};

/// Events emitted by the engine, in emission order.
///
/// Sequence numbers keep counting across [`EventLog::drain`], so a consumer
/// that drains periodically can detect gaps.
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    records: Vec<EventRecord>,
    next_sequence: u64,
}

impl EventLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `event`; returns its sequence number.
    pub fn emit(&mut self, event: MatchEvent) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        tracing::trace!(sequence, %event, "event emitted");
        self.records.push(EventRecord {
            sequence,
            event,
            emitted_at: Utc::now(),
        });
        sequence
    }

    /// Everything not yet drained.
    #[must_use]
    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    /// Events for one match, oldest first.
    pub fn for_match(&self, id: MatchId) -> impl Iterator<Item = &MatchEvent> {
        self.records
            .iter()
            .map(|record| &record.event)
            .filter(move |event| event.match_id() == id)
    }

    /// Hand the pending records to the caller and clear the log.
    pub fn drain(&mut self) -> Vec<EventRecord> {
        std::mem::take(&mut self.records)
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
