//! Collaborators the dispatch pipeline talks to.
//!
//! Each one is a narrow trait so the dispatcher can be driven by in-memory
//! doubles in tests; production implementations live in the submodules.

use anyhow::Result;
use async_trait::async_trait;

use crate::model::{AttendanceRecord, AttendanceWindow, Employee};
use crate::notify::report::TemplateVariables;

pub mod audit_file;
pub mod mysql_store;
pub mod twilio;

pub use audit_file::FileAuditLog;
pub use mysql_store::MySqlDataStore;
pub use twilio::{TwilioConfig, TwilioGateway};

#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    /// Active employees that should receive the weekly report.
    async fn list_eligible(&self) -> Result<Vec<Employee>>;

    /// `Ok(None)` when the dni is unknown.
    async fn get_by_dni(&self, dni: &str) -> Result<Option<Employee>>;
}

#[async_trait]
pub trait AttendanceStore: Send + Sync {
    /// One row per day inside `window`, ascending by date.
    async fn get_records(&self, dni: &str, window: &AttendanceWindow) -> Result<Vec<AttendanceRecord>>;
}

/// What the delivery API said about one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayResponse {
    Delivered { message_id: String, status: String },
    Rejected { error: String },
}

#[async_trait]
pub trait NotificationGateway: Send + Sync {
    async fn send_templated(
        &self,
        address: &str,
        template_id: &str,
        variables: &TemplateVariables,
    ) -> GatewayResponse;
}

/// Append-only sink for already timestamped audit lines.
pub trait AuditLog: Send + Sync {
    fn append(&self, line: &str);
}
