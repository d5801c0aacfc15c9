use crate::api::reports::TargetRequest;
use crate::model::{BatchSummary, DispatchStatus, OutcomeDetail, TargetedResult};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendance Notifier API",
        version = "1.0.0",
        description = r#"
## Weekly Attendance Reports

Sends every eligible employee a WhatsApp template message with their access
records for the previous seven days.

### 🔹 Key Features
- **Batch run**
  - Same run the weekly scheduler fires; returns per-run counters and failure details
- **Targeted run**
  - Re-sends the report to a single employee by DNI

### 📦 Response Format
- JSON bodies; per-employee failures are reported in the body, not as HTTP errors

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::reports::send_to_all,
        crate::api::reports::send_to_target
    ),
    components(
        schemas(
            BatchSummary,
            OutcomeDetail,
            DispatchStatus,
            TargetRequest,
            TargetedResult
        )
    ),
    tags(
        (name = "Reports", description = "Attendance report dispatch"),
    )
)]
pub struct ApiDoc;
