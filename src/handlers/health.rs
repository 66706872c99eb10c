use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::state::AppState;

/// GET / - service description
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Dashboard API",
            "version": version,
            "endpoints": {
                "health": "/health (public)",
                "dashboard": "/dashboard[/:id] (protected)",
                "ownership": "/dashboard/ownedBy (protected)",
                "stars": "/dashboard/:id/star, /dashboard/:id/starred, /dashboards/starred (protected)",
                "lists": "/team/:id/dashboards, /dashboards/simple (protected)",
                "history": "/dashboard/:id/history (protected)",
            }
        }
    }))
}

/// GET /health - store connectivity
pub async fn health(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let now = chrono::Utc::now();

    let database = match state.pool.as_ref() {
        None => "memory",
        Some(pool) => {
            DatabaseManager::health_check(pool).await.map_err(|e| {
                tracing::warn!(error = %e, "database health check failed");
                ApiError::service_unavailable("database unavailable")
            })?;
            "ok"
        }
    };

    Ok(Json(json!({
        "success": true,
        "data": { "status": "ok", "timestamp": now, "database": database }
    })))
}
