use derive_more::Display;

pub type DispatchResult<T> = Result<T, DispatchError>;

/// Run-level errors. Per-employee problems never show up here; they are
/// reported as [`crate::model::DispatchOutcome`] values instead.
#[derive(Debug, Display)]
pub enum DispatchError {
    #[display(fmt = "employee not found: {}", _0)]
    EmployeeNotFound(String),

    #[display(fmt = "employee directory unavailable: {}", _0)]
    Directory(String),

    #[display(
        fmt = "outcome counters out of balance: {} successful + {} failed + {} skipped != {} total",
        successful,
        failed,
        skipped,
        total
    )]
    CounterMismatch {
        total: usize,
        successful: usize,
        failed: usize,
        skipped: usize,
    },
}

impl std::error::Error for DispatchError {}
