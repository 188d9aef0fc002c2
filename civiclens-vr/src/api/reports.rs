//! Report submission and listing API handlers

use axum::{
    extract::{Query, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::models::{EvidenceImage, GeoPoint, ViolationReport, ViolationVerdict};
use crate::services::report_assembler::ReportSubmission;
use crate::AppState;

/// POST /reports request
#[derive(Debug, Deserialize)]
pub struct SubmitReportRequest {
    /// Reporter identity from the auth layer; absent means unauthorized
    #[serde(default)]
    pub reporter_email: Option<String>,
    /// Verdict from a prior /analyze call
    pub verdict: ViolationVerdict,
    /// Human-readable administrative area
    pub place: String,
    pub lat: f64,
    pub lon: f64,
    /// Base64 evidence image, optionally as a data URL
    pub image: String,
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub offense_date: Option<String>,
    #[serde(default)]
    pub offense_time: Option<String>,
}

/// POST /reports response
#[derive(Debug, Serialize)]
pub struct SubmitReportResponse {
    pub report: ViolationReport,
    pub forwarded_to: String,
}

/// GET /reports query parameters
#[derive(Debug, Deserialize)]
pub struct ListReportsParams {
    #[serde(default)]
    pub reporter_email: Option<String>,
}

/// POST /reports
///
/// Assemble and persist a report from an actionable verdict. The
/// enforcement authority is resolved server-side; the response carries
/// the persisted report including the final forwarded-to name.
pub async fn submit_report(
    State(state): State<AppState>,
    Json(request): Json<SubmitReportRequest>,
) -> ApiResult<Json<SubmitReportResponse>> {
    let reporter_email = request.reporter_email.unwrap_or_default();

    let evidence = EvidenceImage::from_client_data(&request.image, request.media_type.as_deref())
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let submission = ReportSubmission {
        reporter_email,
        verdict: request.verdict,
        place: request.place,
        position: GeoPoint {
            lat: request.lat,
            lon: request.lon,
        },
        evidence,
        offense_date: request.offense_date,
        offense_time: request.offense_time,
    };

    match state.assembler.submit(submission).await {
        Ok(report) => {
            let forwarded_to = report.forwarded_to.clone();
            Ok(Json(SubmitReportResponse {
                report,
                forwarded_to,
            }))
        }
        Err(e) => {
            if matches!(e, civiclens_common::Error::Database(_)) {
                state.record_error(e.to_string()).await;
            }
            Err(e.into())
        }
    }
}

/// GET /reports
///
/// Reports for one reporter, newest first. An absent reporter identity
/// yields an empty list.
pub async fn list_reports(
    State(state): State<AppState>,
    Query(params): Query<ListReportsParams>,
) -> ApiResult<Json<Vec<ViolationReport>>> {
    let reporter_email = match params.reporter_email.filter(|e| !e.trim().is_empty()) {
        Some(email) => email,
        None => return Ok(Json(Vec::new())),
    };

    let reports = crate::db::reports::list_reports_for_reporter(&state.db, &reporter_email).await?;
    Ok(Json(reports))
}

/// Build report routes
pub fn report_routes() -> Router<AppState> {
    Router::new().route("/reports", post(submit_report).get(list_reports))
}
