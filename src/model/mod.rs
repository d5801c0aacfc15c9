pub mod attendance;
pub mod employee;
pub mod outcome;

pub use attendance::{AttendanceRecord, AttendanceWindow};
pub use employee::Employee;
pub use outcome::{BatchSummary, DispatchOutcome, DispatchStatus, OutcomeDetail, TargetedResult};
