use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Dashboard, DashboardRevision, DashboardRow, DashboardSimple, DashboardSummary,
};
use crate::types::{TeamId, UserId};

/// Persistence of dashboard documents
#[async_trait]
pub trait DashboardRepository: Send + Sync {
    /// Insert a new dashboard. A duplicate id surfaces as `DatabaseError::Conflict`.
    async fn insert(&self, row: &DashboardRow) -> Result<(), DatabaseError>;

    /// Overwrite title, tags, data and updated of an existing dashboard.
    /// Returns the number of rows touched.
    async fn update(&self, row: &DashboardRow) -> Result<u64, DatabaseError>;

    async fn find(&self, id: &str) -> Result<Option<Dashboard>, DatabaseError>;

    /// Team the dashboard currently belongs to
    async fn owned_by(&self, id: &str) -> Result<Option<TeamId>, DatabaseError>;

    async fn update_owned_by(&self, id: &str, team_id: TeamId) -> Result<u64, DatabaseError>;

    /// Remove the dashboard together with every star pointing at it, atomically
    async fn delete_with_stars(&self, id: &str) -> Result<u64, DatabaseError>;

    async fn list_by_team(&self, team_id: TeamId) -> Result<Vec<DashboardSummary>, DatabaseError>;

    /// Every dashboard, oldest first
    async fn list_simple(&self) -> Result<Vec<DashboardSimple>, DatabaseError>;
}

/// Per-user starred dashboards
#[async_trait]
pub trait StarRepository: Send + Sync {
    async fn star(
        &self,
        user_id: UserId,
        dashboard_id: &str,
        at: DateTime<Utc>,
    ) -> Result<(), DatabaseError>;

    async fn unstar(&self, user_id: UserId, dashboard_id: &str) -> Result<u64, DatabaseError>;

    async fn is_starred(&self, user_id: UserId, dashboard_id: &str) -> Result<bool, DatabaseError>;

    async fn starred_by(&self, user_id: UserId) -> Result<Vec<String>, DatabaseError>;
}

/// Team lookups owned by the team service
#[async_trait]
pub trait TeamDirectory: Send + Sync {
    async fn team_exists(&self, team_id: TeamId) -> Result<bool, DatabaseError>;

    async fn is_team_admin(&self, team_id: TeamId, user_id: UserId) -> Result<bool, DatabaseError>;
}

/// Recorded dashboard revisions
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    async fn record(&self, revision: &DashboardRevision) -> Result<(), DatabaseError>;

    /// Revisions of one dashboard, newest first
    async fn list(&self, dashboard_id: &str) -> Result<Vec<DashboardRevision>, DatabaseError>;
}
