use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::database::models::UpdateOwnedBy;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::types::CurrentUser;

/// POST /dashboard/ownedBy - transfer a dashboard to another team
pub async fn update_owned_by(
    State(state): State<AppState>,
    user: CurrentUser,
    payload: Result<Json<UpdateOwnedBy>, JsonRejection>,
) -> ApiResult<()> {
    let Json(req) = payload?;
    state.dashboards.update_owned_by(&user, req).await?;
    Ok(ApiResponse::empty())
}
