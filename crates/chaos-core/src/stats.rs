//! Run statistics

use crate::operation::{Intent, OperationKind};
use crate::outcome::{Outcome, OutcomeClass};
use std::collections::BTreeMap;

/// Outcome counts for one operation kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OperationTally {
    pub succeeded: u64,
    pub rejected: u64,
    pub malformed: u64,
    pub transport_failed: u64,
    pub skipped: u64,
}

impl OperationTally {
    pub fn record(&mut self, class: OutcomeClass) {
        match class {
            OutcomeClass::Succeeded => self.succeeded += 1,
            OutcomeClass::Rejected => self.rejected += 1,
            OutcomeClass::Malformed => self.malformed += 1,
            OutcomeClass::TransportFailed => self.transport_failed += 1,
            OutcomeClass::Skipped => self.skipped += 1,
        }
    }

    /// Requests that actually went out (skips excluded)
    #[must_use]
    pub fn sent(&self) -> u64 {
        self.succeeded + self.rejected + self.malformed + self.transport_failed
    }
}

/// Aggregate counters for one run
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    /// Completed dispatch iterations
    pub iterations: u64,
    /// Iterations that drew from the valid catalogue
    pub valid_selected: u64,
    /// Iterations that drew from the error catalogue
    pub error_selected: u64,
    /// Registry refreshes preceding each iteration
    pub refreshes: OperationTally,
    /// Per-kind outcomes, warm-up included
    pub per_operation: BTreeMap<OperationKind, OperationTally>,
}

impl RunStats {
    pub fn record_selection(&mut self, intent: Intent) {
        match intent {
            Intent::Valid => self.valid_selected += 1,
            Intent::Error => self.error_selected += 1,
        }
    }

    pub fn record_refresh(&mut self, outcome: &Outcome) {
        self.refreshes.record(outcome.class());
    }

    pub fn record(&mut self, kind: OperationKind, outcome: &Outcome) {
        self.per_operation.entry(kind).or_default().record(outcome.class());
    }

    /// Tally for one kind (zero when never run)
    #[must_use]
    pub fn tally(&self, kind: OperationKind) -> OperationTally {
        self.per_operation.get(&kind).copied().unwrap_or_default()
    }

    /// Every request issued, refreshes included
    #[must_use]
    pub fn requests_sent(&self) -> u64 {
        self.refreshes.sent() + self.per_operation.values().map(OperationTally::sent).sum::<u64>()
    }

    /// Transport failures across refreshes and operations
    #[must_use]
    pub fn transport_failures(&self) -> u64 {
        self.refreshes.transport_failed
            + self
                .per_operation
                .values()
                .map(|t| t.transport_failed)
                .sum::<u64>()
    }

    /// Fraction of selections that drew from the error catalogue
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn error_share(&self) -> f64 {
        let total = self.valid_selected + self.error_selected;
        if total == 0 {
            0.0
        } else {
            self.error_selected as f64 / total as f64
        }
    }
}
