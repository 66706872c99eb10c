use axum::{
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers::{dashboard, health};
use crate::middleware::jwt_auth_middleware;
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state);

    Router::new()
        // Public
        .route("/", get(health::root))
        .route("/health", get(health::health))
        // Protected API
        .merge(dashboard_routes(state.clone()))
        // Global middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn dashboard_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/dashboard", post(dashboard::save))
        .route("/dashboard/ownedBy", post(dashboard::update_owned_by))
        .route("/dashboard/:id", get(dashboard::get).delete(dashboard::delete))
        .route(
            "/dashboard/:id/star",
            post(dashboard::star).delete(dashboard::unstar),
        )
        .route("/dashboard/:id/starred", get(dashboard::starred))
        .route("/dashboard/:id/history", get(dashboard::history))
        .route("/dashboards/simple", get(dashboard::simple_list))
        .route("/dashboards/starred", get(dashboard::all_starred))
        .route("/team/:id/dashboards", get(dashboard::team_dashboards))
        .route_layer(from_fn_with_state(state, jwt_auth_middleware))
}

fn cors_layer(state: &AppState) -> CorsLayer {
    let security = &state.config.security;
    if !security.enable_cors {
        return CorsLayer::new();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}
