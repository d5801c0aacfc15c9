//! Human-readable audit trail of report runs.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::model::{BatchSummary, DispatchOutcome, DispatchStatus};
use crate::services::AuditLog;

const SEPARATOR: &str = "═══════════════════════════════════════════════════";
const NO_ADDRESS: &str = "N/A";

#[derive(Clone)]
pub struct AuditTrail {
    sink: Arc<dyn AuditLog>,
    timezone: Tz,
}

impl AuditTrail {
    pub fn new(sink: Arc<dyn AuditLog>, timezone: Tz) -> Self {
        Self { sink, timezone }
    }

    pub fn run_started(&self, employee_count: usize) {
        self.write(SEPARATOR);
        self.write(&format!("Scheduled Report - {employee_count} employees to process"));
    }

    pub fn outcome(&self, outcome: &DispatchOutcome) {
        self.write(&outcome_line(outcome));
    }

    pub fn run_completed(&self, summary: &BatchSummary) {
        self.write(SEPARATOR);
        self.write("Scheduled report completed");
        self.write(&format!(
            "Total: {} | Success: {} | Failed: {} | Skipped: {}",
            summary.total, summary.successful, summary.failed, summary.skipped
        ));
        self.write(SEPARATOR);
        self.write("");
    }

    fn write(&self, message: &str) {
        let line = stamp(Utc::now(), self.timezone, message);
        self.sink.append(&line);
    }
}

/// `[dd/mm/yyyy, HH:MM:SS] message` in the given zone.
pub fn stamp(at: DateTime<Utc>, timezone: Tz, message: &str) -> String {
    let local = at.with_timezone(&timezone);
    format!("[{}] {}", local.format("%d/%m/%Y, %H:%M:%S"), message)
}

pub fn outcome_line(outcome: &DispatchOutcome) -> String {
    let address = outcome.address.as_deref().unwrap_or(NO_ADDRESS);
    match outcome.status {
        DispatchStatus::Success => {
            format!("{} - DNI: {} | Phone: {}", outcome.status, outcome.dni, address)
        }
        DispatchStatus::Failed => {
            let mut line = format!(
                "{} - DNI: {} | Phone: {} | Reason: {}",
                outcome.status, outcome.dni, address, outcome.reason
            );
            if let Some(error) = &outcome.error {
                line.push_str(&format!(" | Error: {error}"));
            }
            line
        }
        DispatchStatus::Skipped => {
            format!("{} - DNI: {} | Reason: {}", outcome.status, outcome.dni, outcome.reason)
        }
    }
}
