use axum::extract::{Path, State};

use crate::database::models::{DashboardSimple, DashboardSummary};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::types::TeamId;

/// GET /team/:id/dashboards
pub async fn team_dashboards(
    State(state): State<AppState>,
    Path(team_id): Path<String>,
) -> ApiResult<Vec<DashboardSummary>> {
    let team_id: TeamId = team_id
        .parse()
        .map_err(|_| ApiError::bad_request(format!("invalid team id `{}`", team_id)))?;

    let dashboards = state.dashboards.list_by_team(team_id).await?;
    Ok(ApiResponse::success(dashboards))
}

/// GET /dashboards/simple - every dashboard, oldest first
pub async fn simple_list(State(state): State<AppState>) -> ApiResult<Vec<DashboardSimple>> {
    let dashboards = state.dashboards.list_simple().await?;
    Ok(ApiResponse::success(dashboards))
}
