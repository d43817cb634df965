//! crates/study_companion_core/src/generation.rs
//!
//! Tracks the latest in-flight generation request per (document, feature)
//! pair. A response may only be applied while its ticket is still current.

use crate::domain::Feature;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

/// Identifies one generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationTicket {
    pub document_id: Uuid,
    pub feature: Feature,
    sequence: u64,
}

#[derive(Default)]
struct TrackerState {
    next_sequence: u64,
    latest: HashMap<(Uuid, Feature), u64>,
}

#[derive(Default)]
pub struct GenerationTracker {
    state: Mutex<TrackerState>,
}

impl GenerationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, TrackerState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Starts a request, superseding any earlier one for the same pair.
    pub fn begin(&self, document_id: Uuid, feature: Feature) -> GenerationTicket {
        let mut state = self.lock();
        state.next_sequence += 1;
        let sequence = state.next_sequence;
        state.latest.insert((document_id, feature), sequence);
        GenerationTicket {
            document_id,
            feature,
            sequence,
        }
    }

    pub fn is_current(&self, ticket: &GenerationTicket) -> bool {
        self.lock().latest.get(&(ticket.document_id, ticket.feature)) == Some(&ticket.sequence)
    }

    /// Releases the pair if `ticket` is still the latest request for it.
    pub fn finish(&self, ticket: &GenerationTicket) {
        let mut state = self.lock();
        let key = (ticket.document_id, ticket.feature);
        if state.latest.get(&key) == Some(&ticket.sequence) {
            state.latest.remove(&key);
        }
    }

    pub fn is_pending(&self, document_id: Uuid, feature: Feature) -> bool {
        self.lock().latest.contains_key(&(document_id, feature))
    }

    /// Drops every pending request for a document, so late responses are discarded.
    pub fn forget_document(&self, document_id: Uuid) {
        self.lock().latest.retain(|(id, _), _| *id != document_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_request_supersedes_older() {
        let tracker = GenerationTracker::new();
        let doc = Uuid::new_v4();
        let first = tracker.begin(doc, Feature::Summary);
        let second = tracker.begin(doc, Feature::Summary);

        assert!(!tracker.is_current(&first));
        assert!(tracker.is_current(&second));
    }

    #[test]
    fn features_and_documents_are_independent() {
        let tracker = GenerationTracker::new();
        let doc = Uuid::new_v4();
        let summary = tracker.begin(doc, Feature::Summary);
        let _quiz = tracker.begin(doc, Feature::Quiz);
        let _other = tracker.begin(Uuid::new_v4(), Feature::Summary);

        assert!(tracker.is_current(&summary));
    }

    #[test]
    fn finishing_a_stale_ticket_keeps_the_newer_one_pending() {
        let tracker = GenerationTracker::new();
        let doc = Uuid::new_v4();
        let first = tracker.begin(doc, Feature::Notes);
        let second = tracker.begin(doc, Feature::Notes);

        tracker.finish(&first);
        assert!(tracker.is_pending(doc, Feature::Notes));
        tracker.finish(&second);
        assert!(!tracker.is_pending(doc, Feature::Notes));
    }

    #[test]
    fn forgetting_a_document_invalidates_its_tickets() {
        let tracker = GenerationTracker::new();
        let doc = Uuid::new_v4();
        let ticket = tracker.begin(doc, Feature::Flashcards);
        tracker.forget_document(doc);
        assert!(!tracker.is_current(&ticket));
    }
}
