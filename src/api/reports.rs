use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info, instrument};
use utoipa::ToSchema;

use crate::model::TargetedResult;
use crate::notify::ReportDispatcher;

#[derive(Deserialize, Serialize, ToSchema)]
pub struct TargetRequest {
    #[schema(example = "30111222", nullable = true)]
    pub dni: Option<String>,
}

/// Send the weekly attendance report to every eligible employee
#[utoipa::path(
    post,
    path = "/api/reports/send-to-all",
    responses(
        (status = 200, description = "Run finished; per-employee results in the summary", body = crate::model::BatchSummary),
        (status = 500, description = "Employee directory unavailable", body = Object, example = json!({
            "error": "employee directory unavailable: connection refused"
        }))
    ),
    tag = "Reports"
)]
#[instrument(name = "send_to_all", skip(dispatcher))]
pub async fn send_to_all(dispatcher: web::Data<ReportDispatcher>) -> impl Responder {
    info!("Batch report requested");

    match dispatcher.run_batch().await {
        Ok(summary) => HttpResponse::Ok().json(summary),
        Err(e) => {
            error!(error = %e, "Batch report failed");
            HttpResponse::InternalServerError().json(json!({
                "error": e.to_string()
            }))
        }
    }
}

/// Send the attendance report to one employee
#[utoipa::path(
    post,
    path = "/api/reports/send-to-target",
    request_body = TargetRequest,
    responses(
        (status = 200, description = "Outcome for the requested employee", body = TargetedResult, example = json!({
            "success": false,
            "message": "No records found"
        }))
    ),
    tag = "Reports"
)]
#[instrument(name = "send_to_target", skip(dispatcher, payload))]
pub async fn send_to_target(
    dispatcher: web::Data<ReportDispatcher>,
    payload: Option<web::Json<TargetRequest>>,
) -> impl Responder {
    // An empty or non-JSON body counts as a missing dni.
    let dni = match payload.as_ref().and_then(|p| p.dni.as_deref()).map(str::trim) {
        Some(dni) if !dni.is_empty() => dni.to_string(),
        _ => return HttpResponse::Ok().json(TargetedResult::failure("DNI is required")),
    };

    info!(dni = %dni, "Targeted report requested");
    let result = dispatcher.run_targeted(&dni).await;
    HttpResponse::Ok().json(result)
}
