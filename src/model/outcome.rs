use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};
use utoipa::ToSchema;

pub const REASON_SENT: &str = "Message sent";
pub const REASON_NO_RECORDS: &str = "No records found";
pub const REASON_GATEWAY_REJECTED: &str = "Gateway rejected message";
pub const REASON_UNEXPECTED: &str = "Unexpected error";
pub const REASON_NOT_FOUND: &str = "Employee not found";

/// Terminal state of one employee within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DispatchStatus {
    #[strum(serialize = "SUCCESS")]
    Success,
    #[strum(serialize = "FAILED")]
    Failed,
    #[strum(serialize = "SKIPPED")]
    Skipped,
}

/// Result of processing a single employee. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchOutcome {
    pub dni: String,
    pub status: DispatchStatus,
    pub reason: String,
    pub error: Option<String>,
    /// Normalized address, known once the pipeline got past report building.
    pub address: Option<String>,
    pub message_id: Option<String>,
}

impl DispatchOutcome {
    pub fn success(dni: &str, address: String, message_id: String) -> Self {
        Self {
            dni: dni.to_string(),
            status: DispatchStatus::Success,
            reason: REASON_SENT.to_string(),
            error: None,
            address: Some(address),
            message_id: Some(message_id),
        }
    }

    pub fn skipped(dni: &str, reason: &str) -> Self {
        Self {
            dni: dni.to_string(),
            status: DispatchStatus::Skipped,
            reason: reason.to_string(),
            error: None,
            address: None,
            message_id: None,
        }
    }

    pub fn failed(dni: &str, address: Option<String>, reason: &str, error: Option<String>) -> Self {
        Self {
            dni: dni.to_string(),
            status: DispatchStatus::Failed,
            reason: reason.to_string(),
            error,
            address,
            message_id: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == DispatchStatus::Success
    }

    pub fn detail(&self) -> OutcomeDetail {
        OutcomeDetail {
            dni: self.dni.clone(),
            reason: self.reason.clone(),
            error: self.error.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OutcomeDetail {
    #[schema(example = "30111222")]
    pub dni: String,
    #[schema(example = "Gateway rejected message")]
    pub reason: String,
    #[schema(example = "Invalid 'To' Phone Number", nullable = true)]
    pub error: Option<String>,
}

/// Aggregate result of one batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "total": 3,
        "successful": 1,
        "failed": 1,
        "skipped": 1,
        "failure_details": [{"dni": "111", "reason": "Gateway rejected message", "error": "Invalid 'To' Phone Number"}],
        "skip_details": [{"dni": "333", "reason": "No records found", "error": null}]
    })
)]
pub struct BatchSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub skipped: usize,
    pub failure_details: Vec<OutcomeDetail>,
    pub skip_details: Vec<OutcomeDetail>,
}

/// Reply of a targeted (single dni) run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TargetedResult {
    #[schema(example = true)]
    pub success: bool,
    #[schema(example = "Message sent")]
    pub message: String,
}

impl TargetedResult {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

impl From<&DispatchOutcome> for TargetedResult {
    fn from(outcome: &DispatchOutcome) -> Self {
        match outcome.status {
            DispatchStatus::Success => Self {
                success: true,
                message: outcome.reason.clone(),
            },
            DispatchStatus::Skipped => Self::failure(outcome.reason.clone()),
            DispatchStatus::Failed => {
                Self::failure(outcome.error.clone().unwrap_or_else(|| outcome.reason.clone()))
            }
        }
    }
}
