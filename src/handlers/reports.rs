use axum::{extract::State, response::Json};

use crate::{services::reports::ReportView, ApiResponse, ApiResult, AppState};

/// Get the 12-month P&L, cash-flow and product performance report
#[utoipa::path(
    get,
    path = "/api/v1/reports",
    responses(
        (status = 200, description = "Report computed successfully", body = ApiResponse<ReportView>)
    ),
    tag = "Reports"
)]
pub async fn get_report(State(state): State<AppState>) -> ApiResult<ReportView> {
    let view = state.services.reports.get_report().await;
    Ok(Json(ApiResponse::success(view)))
}
