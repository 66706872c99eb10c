use axum::extract::{Path, State};

use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::types::CurrentUser;

/// DELETE /dashboard/:id - removes the dashboard and its stars
pub async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.dashboards.delete(&user, &id).await?;
    Ok(ApiResponse::empty())
}
