use axum::extract::{Path, State};

use crate::database::models::DashboardRevision;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /dashboard/:id/history - recorded revisions, newest first
pub async fn history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Vec<DashboardRevision>> {
    let revisions = state.dashboards.history(&id).await?;
    Ok(ApiResponse::success(revisions))
}
