//! Image analysis API handler

use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::models::{EvidenceImage, ViolationVerdict};
use crate::AppState;

/// POST /analyze request
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    /// Base64 image payload, optionally as a data URL
    pub image: String,
    /// Declared media type (used when the payload carries no data-URL prefix)
    #[serde(default)]
    pub media_type: Option<String>,
    /// Human-readable administrative area from reverse geocoding
    #[serde(default)]
    pub place: Option<String>,
}

/// POST /analyze
///
/// Classify one image. No persistence happens here; the verdict is
/// returned to the caller for display and a possible report submission.
pub async fn analyze_image(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> ApiResult<Json<ViolationVerdict>> {
    let image = EvidenceImage::from_client_data(&request.image, request.media_type.as_deref())
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let place = request
        .place
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| "Unknown District".to_string());

    match state.classifier.classify(&image, &place).await {
        Ok(verdict) => Ok(Json(verdict)),
        Err(e) => {
            state.record_error(e.to_string()).await;
            Err(e.into())
        }
    }
}

/// Build analysis routes
pub fn analyze_routes() -> Router<AppState> {
    Router::new().route("/analyze", post(analyze_image))
}
