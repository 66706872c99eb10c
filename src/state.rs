use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AppConfig;
use crate::database::{
    DashboardRepository, HistoryRepository, PgStore, StarRepository, TeamDirectory,
};
use crate::services::{DashboardService, HistoryPublisher, HistoryRecorder, StarService};

/// Shared application state passed to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub dashboards: DashboardService,
    pub stars: StarService,
    /// Present when backed by Postgres; used by the health check
    pub pool: Option<PgPool>,
}

/// Storage seams the state is assembled from
pub struct Stores {
    pub dashboards: Arc<dyn DashboardRepository>,
    pub stars: Arc<dyn StarRepository>,
    pub teams: Arc<dyn TeamDirectory>,
    pub revisions: Arc<dyn HistoryRepository>,
}

impl Stores {
    pub fn postgres(pool: PgPool) -> Self {
        let store = Arc::new(PgStore::new(pool));
        Self {
            dashboards: store.clone(),
            stars: store.clone(),
            teams: store.clone(),
            revisions: store,
        }
    }
}

impl AppState {
    /// Build the state and the history recorder that must be spawned next to it
    pub fn new(config: AppConfig, stores: Stores, pool: Option<PgPool>) -> (Self, HistoryRecorder) {
        let (publisher, rx) = HistoryPublisher::channel(config.history.queue_capacity);
        let recorder = HistoryRecorder::new(rx, stores.revisions.clone());

        let dashboards = DashboardService::new(
            stores.dashboards,
            stores.teams,
            stores.revisions,
            publisher,
            config.dashboard.clone(),
        );

        let state = Self {
            config: Arc::new(config),
            dashboards,
            stars: StarService::new(stores.stars),
            pool,
        };
        (state, recorder)
    }
}
