use crate::messages::{LogEntry, RequestId, Term};
use std::collections::VecDeque;

// GC can overtake the record it's meant to clear. Remember that many ids it didn't find.
const MAX_EARLY_GC: usize = 1024;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum RecordOutcome {
    Accepted,
    /// A recovering leader drained this witness; nothing is recorded until it's unfrozen.
    Frozen,
    /// The request was issued against a different term than the witness's.
    StaleTerm,
    /// The entry touches a key some other recorded entry touches.
    Conflict,
}

/// Witness holds commands recorded by clients but possibly not yet synced by the leader. It only
/// keeps a set of mutually commutative entries, so replaying them in any order is safe.
pub(crate) struct Witness {
    term: Term,
    frozen: bool,
    recorded: Vec<LogEntry>,
    collected_early: VecDeque<RequestId>,
}

impl Witness {
    pub fn new(term: Term) -> Self {
        Witness {
            term,
            frozen: false,
            recorded: Vec::new(),
            collected_early: VecDeque::new(),
        }
    }

    pub fn term(&self) -> Term {
        self.term
    }

    pub fn record(&mut self, entry: LogEntry, term: Term) -> RecordOutcome {
        if self.frozen {
            return RecordOutcome::Frozen;
        }
        if term != self.term {
            return RecordOutcome::StaleTerm;
        }

        let id = entry.id();
        if let Some(position) = self.collected_early.iter().position(|c| *c == id) {
            // Already synced by the leader, so there's nothing to hold on to.
            self.collected_early.remove(position);
            return RecordOutcome::Accepted;
        }
        if self.recorded.iter().any(|e| e.id() == id) {
            // Client retry of something we already hold.
            return RecordOutcome::Accepted;
        }
        if !self.recorded.iter().all(|e| e.commutes_with(&entry)) {
            return RecordOutcome::Conflict;
        }

        self.recorded.push(entry);
        RecordOutcome::Accepted
    }

    pub fn set_term(&mut self, term: Term) {
        self.term = term;
    }

    /// Freezes the witness and hands over everything it recorded.
    pub fn recovery_data(&mut self) -> Vec<LogEntry> {
        self.frozen = true;
        std::mem::take(&mut self.recorded)
    }

    pub fn unfreeze(&mut self) {
        self.frozen = false;
    }

    /// Forgets entries the leader has made durable.
    pub fn gc(&mut self, synced: &[RequestId]) -> usize {
        let before = self.recorded.len();
        let mut not_found = synced.to_vec();
        self.recorded.retain(|e| {
            let id = e.id();
            match not_found.iter().position(|s| *s == id) {
                Some(position) => {
                    not_found.swap_remove(position);
                    false
                }
                None => true,
            }
        });

        for id in not_found {
            if self.collected_early.len() == MAX_EARLY_GC {
                self.collected_early.pop_front();
            }
            self.collected_early.push_back(id);
        }

        before - self.recorded.len()
    }

    pub fn len(&self) -> usize {
        self.recorded.len()
    }
}
