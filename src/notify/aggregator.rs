use crate::model::{BatchSummary, DispatchOutcome, DispatchStatus, OutcomeDetail};
use crate::notify::error::{DispatchError, DispatchResult};

/// Run-scoped counters. One instance per batch run, never shared.
#[derive(Debug, Default)]
pub struct OutcomeAggregator {
    total: usize,
    successful: usize,
    failed: usize,
    skipped: usize,
    failures: Vec<OutcomeDetail>,
    skips: Vec<OutcomeDetail>,
}

impl OutcomeAggregator {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    pub fn record(&mut self, outcome: &DispatchOutcome) {
        match outcome.status {
            DispatchStatus::Success => self.successful += 1,
            DispatchStatus::Failed => {
                self.failed += 1;
                self.failures.push(outcome.detail());
            }
            DispatchStatus::Skipped => {
                self.skipped += 1;
                self.skips.push(outcome.detail());
            }
        }
    }

    pub fn processed(&self) -> usize {
        self.successful + self.failed + self.skipped
    }

    pub fn is_balanced(&self) -> bool {
        self.processed() == self.total
    }

    /// Closes the run. Fails if any employee was dropped or counted twice.
    pub fn finish(self) -> DispatchResult<BatchSummary> {
        if !self.is_balanced() {
            return Err(DispatchError::CounterMismatch {
                total: self.total,
                successful: self.successful,
                failed: self.failed,
                skipped: self.skipped,
            });
        }

        Ok(BatchSummary {
            total: self.total,
            successful: self.successful,
            failed: self.failed,
            skipped: self.skipped,
            failure_details: self.failures,
            skip_details: self.skips,
        })
    }
}
