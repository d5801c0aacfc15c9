use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use futures::FutureExt;
use tracing::{error, info, instrument, warn};

use crate::audit::AuditTrail;
use crate::model::outcome::{
    REASON_GATEWAY_REJECTED, REASON_NO_RECORDS, REASON_NOT_FOUND, REASON_UNEXPECTED,
};
use crate::model::{AttendanceWindow, BatchSummary, DispatchOutcome, Employee, TargetedResult};
use crate::notify::aggregator::OutcomeAggregator;
use crate::notify::error::{DispatchError, DispatchResult};
use crate::notify::phone::normalize_phone;
use crate::notify::report::TemplateVariables;
use crate::services::{AttendanceStore, EmployeeDirectory, GatewayResponse, NotificationGateway};

/// Knobs that shape each run.
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    pub template_id: String,
    pub window_days: u32,
    pub excluded_device_serial: String,
    pub timezone: Tz,
}

/// Drives batch and targeted report runs.
///
/// Holds no per-run state, so concurrent runs only share the collaborators.
#[derive(Clone)]
pub struct ReportDispatcher {
    directory: Arc<dyn EmployeeDirectory>,
    attendance: Arc<dyn AttendanceStore>,
    gateway: Arc<dyn NotificationGateway>,
    audit: AuditTrail,
    settings: DispatchSettings,
}

impl ReportDispatcher {
    pub fn new(
        directory: Arc<dyn EmployeeDirectory>,
        attendance: Arc<dyn AttendanceStore>,
        gateway: Arc<dyn NotificationGateway>,
        audit: AuditTrail,
        settings: DispatchSettings,
    ) -> Self {
        Self {
            directory,
            attendance,
            gateway,
            audit,
            settings,
        }
    }

    pub fn settings(&self) -> &DispatchSettings {
        &self.settings
    }

    /// Sends the weekly report to every eligible employee, one at a time.
    ///
    /// Only a failure to list employees aborts the run; everything that goes
    /// wrong for a single employee ends up in the summary.
    #[instrument(skip(self), fields(run_id = %uuid::Uuid::new_v4()))]
    pub async fn run_batch(&self) -> DispatchResult<BatchSummary> {
        let employees = self.directory.list_eligible().await.map_err(|e| {
            error!(error = %e, "Failed to load eligible employees");
            DispatchError::Directory(format!("{e:#}"))
        })?;

        info!(count = employees.len(), "Starting report run");
        self.audit.run_started(employees.len());

        let window = self.window_for(self.today());
        let mut aggregator = OutcomeAggregator::new(employees.len());

        for employee in &employees {
            let outcome = self.dispatch_isolated(employee, &window).await;
            self.audit.outcome(&outcome);
            aggregator.record(&outcome);
        }

        let summary = aggregator.finish()?;
        self.audit.run_completed(&summary);
        info!(
            total = summary.total,
            successful = summary.successful,
            failed = summary.failed,
            skipped = summary.skipped,
            "Report run completed"
        );
        Ok(summary)
    }

    /// Sends the report to a single employee, outside of any batch.
    #[instrument(skip(self))]
    pub async fn run_targeted(&self, dni: &str) -> TargetedResult {
        let result = match AssertUnwindSafe(self.targeted_outcome(dni)).catch_unwind().await {
            Ok(result) => result,
            Err(panic) => Ok(panicked_outcome(dni, panic.as_ref())),
        };

        match result {
            Ok(outcome) => {
                self.audit.outcome(&outcome);
                TargetedResult::from(&outcome)
            }
            Err(err) => {
                warn!(error = %err, "Targeted report rejected");
                self.audit
                    .outcome(&DispatchOutcome::failed(dni, None, REASON_NOT_FOUND, None));
                match err {
                    DispatchError::EmployeeNotFound(dni) => {
                        TargetedResult::failure(format!("{REASON_NOT_FOUND}: {dni}"))
                    }
                    other => TargetedResult::failure(other.to_string()),
                }
            }
        }
    }

    async fn targeted_outcome(&self, dni: &str) -> DispatchResult<DispatchOutcome> {
        let employee = match self.directory.get_by_dni(dni).await {
            Ok(Some(employee)) => employee,
            Ok(None) => return Err(DispatchError::EmployeeNotFound(dni.to_string())),
            Err(e) => {
                error!(error = %e, "Failed to load employee");
                return Ok(DispatchOutcome::failed(dni, None, REASON_UNEXPECTED, Some(format!("{e:#}"))));
            }
        };

        let window = self.window_for(self.today());
        Ok(self.dispatch_employee(&employee, &window).await)
    }

    pub fn window_for(&self, today: NaiveDate) -> AttendanceWindow {
        AttendanceWindow::ending_before(
            today,
            self.settings.window_days,
            &self.settings.excluded_device_serial,
        )
    }

    fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.settings.timezone).date_naive()
    }

    /// Runs one employee's pipeline, turning even a panic into a `Failed` outcome.
    async fn dispatch_isolated(&self, employee: &Employee, window: &AttendanceWindow) -> DispatchOutcome {
        match AssertUnwindSafe(self.dispatch_employee(employee, window))
            .catch_unwind()
            .await
        {
            Ok(outcome) => outcome,
            Err(panic) => panicked_outcome(&employee.dni, panic.as_ref()),
        }
    }

    #[instrument(skip(self, employee, window), fields(dni = %employee.dni))]
    async fn dispatch_employee(&self, employee: &Employee, window: &AttendanceWindow) -> DispatchOutcome {
        let records = match self.attendance.get_records(&employee.dni, window).await {
            Ok(records) => records,
            Err(e) => {
                error!(error = %e, "Failed to load attendance records");
                return DispatchOutcome::failed(&employee.dni, None, REASON_UNEXPECTED, Some(format!("{e:#}")));
            }
        };

        if records.is_empty() {
            info!("No attendance records in window, skipping");
            return DispatchOutcome::skipped(&employee.dni, REASON_NO_RECORDS);
        }

        let variables = TemplateVariables::for_employee(employee, &records);
        let address = normalize_phone(&employee.telefono);

        match self
            .gateway
            .send_templated(&address, &self.settings.template_id, &variables)
            .await
        {
            GatewayResponse::Delivered { message_id, status } => {
                info!(message_id = %message_id, status = %status, records = records.len(), "Report sent");
                DispatchOutcome::success(&employee.dni, address, message_id)
            }
            GatewayResponse::Rejected { error } => {
                warn!(error = %error, "Gateway rejected report");
                DispatchOutcome::failed(&employee.dni, Some(address), REASON_GATEWAY_REJECTED, Some(error))
            }
        }
    }
}

fn panicked_outcome(dni: &str, panic: &(dyn Any + Send)) -> DispatchOutcome {
    let message = if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic during report dispatch".to_string()
    };
    error!(dni = %dni, error = %message, "Report dispatch panicked");
    DispatchOutcome::failed(dni, None, REASON_UNEXPECTED, Some(message))
}
