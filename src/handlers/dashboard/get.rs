use axum::extract::{Path, State};

use crate::database::models::Dashboard;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /dashboard/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Dashboard> {
    let dash = state.dashboards.get(&id).await?;
    Ok(ApiResponse::success(dash))
}
