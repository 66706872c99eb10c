use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::config::DashboardConfig;
use crate::database::models::{
    generate_dashboard_id, Dashboard, DashboardRevision, DashboardSimple, DashboardSummary,
    SaveDashboardRequest, UpdateOwnedBy,
};
use crate::database::{DashboardRepository, DatabaseError, HistoryRepository, TeamDirectory};
use crate::services::{HistoryPublisher, PermissionChecker, ServiceError};
use crate::types::{CurrentUser, TeamId};

/// Permission-gated persistence workflow for dashboards
#[derive(Clone)]
pub struct DashboardService {
    dashboards: Arc<dyn DashboardRepository>,
    teams: Arc<dyn TeamDirectory>,
    revisions: Arc<dyn HistoryRepository>,
    permissions: PermissionChecker,
    history: HistoryPublisher,
    config: DashboardConfig,
}

impl DashboardService {
    pub fn new(
        dashboards: Arc<dyn DashboardRepository>,
        teams: Arc<dyn TeamDirectory>,
        revisions: Arc<dyn HistoryRepository>,
        history: HistoryPublisher,
        config: DashboardConfig,
    ) -> Self {
        Self {
            permissions: PermissionChecker::new(teams.clone()),
            dashboards,
            teams,
            revisions,
            history,
            config,
        }
    }

    /// Create the dashboard when it has no id yet, update it otherwise.
    /// Returns the dashboard id.
    pub async fn save(
        &self,
        user: &CurrentUser,
        mut req: SaveDashboardRequest,
    ) -> Result<String, ServiceError> {
        let dash = &mut req.dashboard;
        if dash.title.trim().is_empty() {
            return Err(ServiceError::param_invalid("dashboard title is required"));
        }
        if dash.owned_by <= 0 {
            return Err(ServiceError::param_invalid("dashboard must be owned by a team"));
        }

        self.permissions.require(user, dash.owned_by).await?;

        // Stored form of a missing document; revisions must match the row
        if dash.data.is_null() {
            dash.data = Value::Object(Map::new());
        }

        let now = now();
        let is_create = dash.is_new();
        let created = if is_create {
            dash.id = generate_dashboard_id();
            dash.created_by = user.id;
            now
        } else {
            let existing = self
                .dashboards
                .find(&dash.id)
                .await
                .map_err(ServiceError::internal("query dashboard"))?
                .ok_or_else(|| ServiceError::dashboard_not_found(&dash.id))?;

            // Moving a dashboard between teams goes through update_owned_by
            if existing.owned_by != dash.owned_by {
                self.permissions.require(user, existing.owned_by).await?;
            }
            dash.owned_by = existing.owned_by;
            dash.created_by = existing.created_by;
            existing.created.unwrap_or(now)
        };
        dash.created = Some(created);
        dash.updated = Some(now);

        let row = dash.to_row(created, now).map_err(|e| {
            warn!(error = %e, "encode dashboard error");
            ServiceError::from(e)
        })?;

        if is_create {
            match self.dashboards.insert(&row).await {
                Ok(()) => {}
                Err(DatabaseError::Conflict(_)) => {
                    return Err(ServiceError::Conflict("dashboard id already exists".to_string()))
                }
                Err(e) => return Err(ServiceError::internal("add dashboard")(e)),
            }
        } else {
            let updated = self
                .dashboards
                .update(&row)
                .await
                .map_err(ServiceError::internal("update dashboard"))?;
            if updated == 0 {
                return Err(ServiceError::dashboard_not_found(&row.id));
            }
        }

        info!(dashboard_id = %row.id, user_id = user.id, created = is_create, "dashboard saved");
        self.history.publish(req);

        Ok(row.id)
    }

    pub async fn get(&self, id: &str) -> Result<Dashboard, ServiceError> {
        let mut dash = self
            .dashboards
            .find(id)
            .await
            .map_err(ServiceError::internal("query dashboard"))?
            .ok_or_else(|| ServiceError::dashboard_not_found(id))?;

        dash.editable = true;
        Ok(dash)
    }

    /// Delete a dashboard and every star pointing at it
    pub async fn delete(&self, user: &CurrentUser, id: &str) -> Result<(), ServiceError> {
        if !self.config.enable_delete {
            return Err(ServiceError::Forbidden(
                "Deleting dashboard is disabled in config".to_string(),
            ));
        }
        if id.is_empty() {
            return Err(ServiceError::param_invalid("dashboard id is required"));
        }
        if self.config.is_reserved(id) {
            return Err(ServiceError::param_invalid("reserved dashboard can not be deleted"));
        }

        let owned_by = self.current_owner(id).await?;
        self.permissions.require(user, owned_by).await?;

        let deleted = self
            .dashboards
            .delete_with_stars(id)
            .await
            .map_err(ServiceError::internal("delete dashboard"))?;
        if deleted == 0 {
            return Err(ServiceError::dashboard_not_found(id));
        }

        info!(dashboard_id = %id, user_id = user.id, "dashboard deleted");
        Ok(())
    }

    /// Move a dashboard to another team. The caller must administer the
    /// team the dashboard currently belongs to.
    pub async fn update_owned_by(
        &self,
        user: &CurrentUser,
        req: UpdateOwnedBy,
    ) -> Result<(), ServiceError> {
        if req.id.is_empty() || req.owned_by == 0 {
            return Err(ServiceError::param_invalid("dashboard id and ownedBy are required"));
        }

        let exists = self
            .teams
            .team_exists(req.owned_by)
            .await
            .map_err(ServiceError::internal("query team"))?;
        if !exists {
            return Err(ServiceError::param_invalid("target team does not exist"));
        }

        let owned_by = self.current_owner(&req.id).await?;
        self.permissions.require(user, owned_by).await?;

        let updated = self
            .dashboards
            .update_owned_by(&req.id, req.owned_by)
            .await
            .map_err(ServiceError::internal("update dashboard ownedBy"))?;
        if updated == 0 {
            return Err(ServiceError::dashboard_not_found(&req.id));
        }

        info!(dashboard_id = %req.id, from = owned_by, to = req.owned_by, "dashboard ownership transferred");
        Ok(())
    }

    pub async fn list_by_team(&self, team_id: TeamId) -> Result<Vec<DashboardSummary>, ServiceError> {
        self.dashboards
            .list_by_team(team_id)
            .await
            .map_err(ServiceError::internal("query team dashboards"))
    }

    pub async fn list_simple(&self) -> Result<Vec<DashboardSimple>, ServiceError> {
        self.dashboards
            .list_simple()
            .await
            .map_err(ServiceError::internal("query simple dashboards"))
    }

    pub async fn history(&self, id: &str) -> Result<Vec<DashboardRevision>, ServiceError> {
        self.revisions
            .list(id)
            .await
            .map_err(ServiceError::internal("query dashboard history"))
    }

    async fn current_owner(&self, id: &str) -> Result<TeamId, ServiceError> {
        self.dashboards
            .owned_by(id)
            .await
            .map_err(ServiceError::internal("query dashboard belongs to"))?
            .ok_or_else(|| ServiceError::dashboard_not_found(id))
    }
}

/// Store timestamps carry microsecond precision
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}
