//! Weekly trigger for batch report runs.

pub mod cron;

use std::sync::Mutex;

use actix_web::rt::task::JoinHandle;
use chrono::Utc;
use chrono_tz::Tz;
use tracing::{error, info, warn};

use crate::model::BatchSummary;
use crate::notify::ReportDispatcher;

pub use cron::{CronParseError, CronSchedule};

/// Timer that calls [`ReportDispatcher::run_batch`] on a cron schedule.
///
/// The timer task runs on the actix runtime it was started from.
pub struct ReportScheduler {
    schedule: CronSchedule,
    timezone: Tz,
    dispatcher: ReportDispatcher,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl ReportScheduler {
    pub fn new(schedule: CronSchedule, timezone: Tz, dispatcher: ReportDispatcher) -> Self {
        Self {
            schedule,
            timezone,
            dispatcher,
            handle: Mutex::new(None),
        }
    }

    /// Spawns the timer loop. Returns `false` if it was already running.
    pub fn start(&self) -> bool {
        let mut handle = self.lock_handle();
        if handle.as_ref().is_some_and(|h| !h.is_finished()) {
            warn!("Report scheduler already running");
            return false;
        }

        let schedule = self.schedule.clone();
        let timezone = self.timezone;
        let dispatcher = self.dispatcher.clone();
        *handle = Some(actix_web::rt::spawn(async move {
            run_loop(schedule, timezone, dispatcher).await;
        }));
        info!(timezone = %self.timezone, "Report scheduler started");
        true
    }

    /// Aborts the timer loop. A run already in progress finishes on its own.
    pub fn stop(&self) -> bool {
        match self.lock_handle().take() {
            Some(handle) => {
                handle.abort();
                info!("Report scheduler stopped");
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.lock_handle().as_ref().is_some_and(|h| !h.is_finished())
    }

    fn lock_handle(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        match self.handle.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Drop for ReportScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_loop(schedule: CronSchedule, timezone: Tz, dispatcher: ReportDispatcher) {
    loop {
        let now = Utc::now().with_timezone(&timezone);
        let Some(next) = schedule.next_after(&now) else {
            error!("Report schedule has no upcoming fire time, scheduler exiting");
            return;
        };

        info!(next_run = %next, "Next scheduled report run");
        let wait = (next.with_timezone(&Utc) - Utc::now())
            .to_std()
            .unwrap_or_default();
        actix_web::rt::time::sleep(wait).await;

        run_scheduled(&dispatcher).await;
    }
}

/// One scheduled fire. Errors and panics are logged and never propagate,
/// so the next fire happens regardless.
pub async fn run_scheduled(dispatcher: &ReportDispatcher) -> Option<BatchSummary> {
    info!("Running scheduled report...");
    let dispatcher = dispatcher.clone();
    let task = actix_web::rt::spawn(async move { dispatcher.run_batch().await });

    match task.await {
        Ok(Ok(summary)) => {
            info!(
                total = summary.total,
                successful = summary.successful,
                failed = summary.failed,
                skipped = summary.skipped,
                "Reports sent"
            );
            Some(summary)
        }
        Ok(Err(e)) => {
            error!(error = %e, "Scheduled report failed");
            None
        }
        Err(e) => {
            error!(error = %e, "Scheduled report task aborted");
            None
        }
    }
}
