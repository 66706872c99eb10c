use axum::extract::{Path, State};

use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::types::CurrentUser;

/// POST /dashboard/:id/star
pub async fn star(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.stars.star(&user, &id).await?;
    Ok(ApiResponse::empty())
}

/// DELETE /dashboard/:id/star
pub async fn unstar(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.stars.unstar(&user, &id).await?;
    Ok(ApiResponse::empty())
}

/// GET /dashboard/:id/starred
pub async fn starred(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<bool> {
    let starred = state.stars.is_starred(&user, &id).await?;
    Ok(ApiResponse::success(starred))
}

/// GET /dashboards/starred - ids starred by the caller
pub async fn all_starred(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Vec<String>> {
    let ids = state.stars.starred(&user).await?;
    Ok(ApiResponse::success(ids))
}
