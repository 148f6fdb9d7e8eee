//! Invocation recorder.
//!
//! One recorder per context holds every mock's log. All appends go through
//! the context's single recorder lock, which keeps the context-wide sequence
//! and the per-mock logs consistent with each other.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use doppel_types::{Invocation, MethodSignature, MockId, Sequence, Value};

#[derive(Debug, Default)]
pub(crate) struct InvocationRecorder {
    last_sequence: u64,
    logs: HashMap<MockId, Vec<Arc<Invocation>>>,
    /// Calls matched by a successful verification.
    verified: HashSet<Sequence>,
}

impl InvocationRecorder {
    /// Append a new invocation with fresh global and per-mock sequence numbers.
    pub(crate) fn record(
        &mut self,
        mock: MockId,
        mock_name: &str,
        signature: MethodSignature,
        args: Vec<Value>,
    ) -> Arc<Invocation> {
        self.last_sequence += 1;
        let log = self.logs.entry(mock).or_default();
        let invocation = Arc::new(Invocation::new(
            mock,
            mock_name,
            signature,
            args,
            Sequence::new(self.last_sequence),
            log.len() as u64 + 1,
        ));
        log.push(Arc::clone(&invocation));
        invocation
    }

    pub(crate) fn history(&self, mock: MockId) -> Vec<Arc<Invocation>> {
        self.logs.get(&mock).cloned().unwrap_or_default()
    }

    /// Histories of several mocks merged by global sequence.
    pub(crate) fn all_history(&self, mocks: &[MockId]) -> Vec<Arc<Invocation>> {
        let mut seen = HashSet::new();
        let mut merged: Vec<Arc<Invocation>> = mocks
            .iter()
            .filter(|id| seen.insert(**id))
            .filter_map(|id| self.logs.get(id))
            .flatten()
            .cloned()
            .collect();
        merged.sort_by_key(|inv| inv.sequence());
        merged
    }

    pub(crate) fn everything(&self) -> Vec<Arc<Invocation>> {
        let mut merged: Vec<Arc<Invocation>> = self.logs.values().flatten().cloned().collect();
        merged.sort_by_key(|inv| inv.sequence());
        merged
    }

    pub(crate) fn mark_verified(&mut self, sequences: impl IntoIterator<Item = Sequence>) {
        self.verified.extend(sequences);
    }

    pub(crate) fn unverified(&self, mock: MockId) -> Vec<Arc<Invocation>> {
        self.logs
            .get(&mock)
            .map(|log| {
                log.iter()
                    .filter(|inv| !self.verified.contains(&inv.sequence()))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}
