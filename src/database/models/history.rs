use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::dashboard::{null_as_default, Dashboard};

/// Body of `POST /dashboard`. The whole request is forwarded to the
/// history recorder once the save succeeds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SaveDashboardRequest {
    #[serde(deserialize_with = "null_as_default")]
    pub dashboard: Dashboard,
    /// Free-text note describing the change
    #[serde(deserialize_with = "null_as_default")]
    pub changes: String,
}

/// One recorded version of a dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardRevision {
    pub dashboard_id: String,
    pub version: DateTime<Utc>,
    pub changes: String,
    pub dashboard: Dashboard,
}

impl DashboardRevision {
    /// Returns `None` for requests whose dashboard was never stamped
    pub fn from_request(req: SaveDashboardRequest) -> Option<Self> {
        let version = req.dashboard.updated?;
        if req.dashboard.id.is_empty() {
            return None;
        }
        Some(Self {
            dashboard_id: req.dashboard.id.clone(),
            version,
            changes: req.changes,
            dashboard: req.dashboard,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DashboardHistoryRow {
    pub dashboard_id: String,
    pub version: DateTime<Utc>,
    pub changes: String,
    pub history: String,
}

impl TryFrom<DashboardHistoryRow> for DashboardRevision {
    type Error = serde_json::Error;

    fn try_from(row: DashboardHistoryRow) -> Result<Self, Self::Error> {
        Ok(DashboardRevision {
            dashboard: serde_json::from_str(&row.history)?,
            dashboard_id: row.dashboard_id,
            version: row.version,
            changes: row.changes,
        })
    }
}
