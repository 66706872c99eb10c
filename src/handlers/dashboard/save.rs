use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::database::models::SaveDashboardRequest;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::types::CurrentUser;

/// POST /dashboard - create a dashboard when no id is given, update it otherwise.
/// Responds with the dashboard id.
pub async fn save(
    State(state): State<AppState>,
    user: CurrentUser,
    payload: Result<Json<SaveDashboardRequest>, JsonRejection>,
) -> ApiResult<String> {
    let Json(req) = payload?;
    let id = state.dashboards.save(&user, req).await?;
    Ok(ApiResponse::success(id))
}
