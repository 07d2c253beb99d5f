use axum::{extract::State, response::Json, routing::post, Router};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{services::receipt_scan::ScanResult, ApiResponse, ApiResult, AppState};

/// Build the receipts Router scoped under `/api/v1/receipts`.
pub fn receipts_routes() -> Router<AppState> {
    Router::new().route("/scan", post(scan_receipt))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ScanReceiptRequest {
    /// Receipt photo as base64 or a data URL
    pub image: String,
}

/// Extract line items from a receipt photo
#[utoipa::path(
    post,
    path = "/api/v1/receipts/scan",
    request_body = ScanReceiptRequest,
    responses(
        (status = 200, description = "Receipt scanned", body = ApiResponse<ScanResult>),
        (status = 400, description = "No image provided", body = crate::errors::ErrorResponse),
        (status = 502, description = "Vision model unavailable", body = crate::errors::ErrorResponse),
        (status = 503, description = "Scanning not configured", body = crate::errors::ErrorResponse)
    ),
    tag = "Receipts"
)]
pub async fn scan_receipt(
    State(state): State<AppState>,
    Json(request): Json<ScanReceiptRequest>,
) -> ApiResult<ScanResult> {
    let result = state.services.receipt_scan.scan(&request.image).await?;
    Ok(Json(ApiResponse::success(result)))
}
