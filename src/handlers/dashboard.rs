use axum::{extract::State, response::Json};

use crate::{services::dashboard::DashboardView, ApiResponse, ApiResult, AppState};

/// Get the dashboard view model for the current month
#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    responses(
        (status = 200, description = "Dashboard computed successfully", body = ApiResponse<DashboardView>)
    ),
    tag = "Dashboard"
)]
pub async fn get_dashboard(State(state): State<AppState>) -> ApiResult<DashboardView> {
    let view = state.services.dashboard.get_dashboard().await;
    Ok(Json(ApiResponse::success(view)))
}
