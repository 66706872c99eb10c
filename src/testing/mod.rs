//! In-memory stores and helpers for tests and local runs without Postgres.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use axum::Router;
use chrono::{DateTime, Utc};

use crate::auth::{generate_jwt, Claims, JwtError};
use crate::config::AppConfig;
use crate::database::models::{
    Dashboard, DashboardRevision, DashboardRow, DashboardSimple, DashboardSimpleRow,
    DashboardSummary,
};
use crate::database::{
    DashboardRepository, DatabaseError, HistoryRepository, StarRepository, TeamDirectory,
};
use crate::state::{AppState, Stores};
use crate::types::{CurrentUser, Role, TeamId, UserId};

/// Implements every repository seam over shared in-process state
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    dashboards: Vec<DashboardRow>,
    stars: Vec<(UserId, String, DateTime<Utc>)>,
    teams: HashSet<TeamId>,
    team_admins: HashSet<(TeamId, UserId)>,
    revisions: Vec<DashboardRevision>,
    fail_team_lookups: bool,
    fail_dashboard_queries: bool,
    conflict_next_insert: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_team(&self, team_id: TeamId) {
        self.inner().teams.insert(team_id);
    }

    pub fn add_team_admin(&self, team_id: TeamId, user_id: UserId) {
        self.inner().team_admins.insert((team_id, user_id));
    }

    /// Make team lookups fail as if the store were unreachable
    pub fn fail_team_lookups(&self, fail: bool) {
        self.inner().fail_team_lookups = fail;
    }

    pub fn fail_dashboard_queries(&self, fail: bool) {
        self.inner().fail_dashboard_queries = fail;
    }

    /// The next insert reports a unique violation
    pub fn fail_next_insert_with_conflict(&self) {
        self.inner().conflict_next_insert = true;
    }

    pub fn star_count(&self, dashboard_id: &str) -> usize {
        self.inner()
            .stars
            .iter()
            .filter(|(_, id, _)| id == dashboard_id)
            .count()
    }

    fn dashboards(&self) -> Result<MutexGuard<'_, Inner>, DatabaseError> {
        let inner = self.inner();
        if inner.fail_dashboard_queries {
            return Err(unavailable());
        }
        Ok(inner)
    }
}

fn unavailable() -> DatabaseError {
    DatabaseError::Sqlx(sqlx::Error::PoolTimedOut)
}

#[async_trait]
impl DashboardRepository for MemoryStore {
    async fn insert(&self, row: &DashboardRow) -> Result<(), DatabaseError> {
        let mut inner = self.dashboards()?;
        if std::mem::take(&mut inner.conflict_next_insert)
            || inner.dashboards.iter().any(|d| d.id == row.id)
        {
            return Err(DatabaseError::Conflict("dashboard_pkey".to_string()));
        }
        inner.dashboards.push(row.clone());
        Ok(())
    }

    async fn update(&self, row: &DashboardRow) -> Result<u64, DatabaseError> {
        let mut inner = self.dashboards()?;
        let Some(existing) = inner.dashboards.iter_mut().find(|d| d.id == row.id) else {
            return Ok(0);
        };
        existing.title = row.title.clone();
        existing.tags = row.tags.clone();
        existing.data = row.data.clone();
        existing.updated = row.updated;
        Ok(1)
    }

    async fn find(&self, id: &str) -> Result<Option<Dashboard>, DatabaseError> {
        let inner = self.dashboards()?;
        match inner.dashboards.iter().find(|d| d.id == id) {
            Some(row) => Ok(Some(row.clone().decode()?)),
            None => Ok(None),
        }
    }

    async fn owned_by(&self, id: &str) -> Result<Option<TeamId>, DatabaseError> {
        let inner = self.dashboards()?;
        Ok(inner.dashboards.iter().find(|d| d.id == id).map(|d| d.owned_by))
    }

    async fn update_owned_by(&self, id: &str, team_id: TeamId) -> Result<u64, DatabaseError> {
        let mut inner = self.dashboards()?;
        let Some(existing) = inner.dashboards.iter_mut().find(|d| d.id == id) else {
            return Ok(0);
        };
        existing.owned_by = team_id;
        Ok(1)
    }

    async fn delete_with_stars(&self, id: &str) -> Result<u64, DatabaseError> {
        let mut inner = self.dashboards()?;
        let before = inner.dashboards.len();
        inner.dashboards.retain(|d| d.id != id);
        let deleted = (before - inner.dashboards.len()) as u64;
        inner.stars.retain(|(_, dashboard_id, _)| dashboard_id != id);
        Ok(deleted)
    }

    async fn list_by_team(&self, team_id: TeamId) -> Result<Vec<DashboardSummary>, DatabaseError> {
        let inner = self.dashboards()?;
        let mut rows: Vec<_> = inner
            .dashboards
            .iter()
            .filter(|d| d.owned_by == team_id)
            .map(|d| DashboardSummary {
                id: d.id.clone(),
                title: d.title.clone(),
                created: d.created,
                updated: d.updated,
            })
            .collect();
        rows.sort_by(|a, b| (a.created, &a.id).cmp(&(b.created, &b.id)));
        Ok(rows)
    }

    async fn list_simple(&self) -> Result<Vec<DashboardSimple>, DatabaseError> {
        let inner = self.dashboards()?;
        let mut rows: Vec<_> = inner.dashboards.iter().collect();
        rows.sort_by(|a, b| (a.created, &a.id).cmp(&(b.created, &b.id)));
        rows.into_iter()
            .map(|d| {
                DashboardSimple::try_from(DashboardSimpleRow {
                    id: d.id.clone(),
                    title: d.title.clone(),
                    owned_by: d.owned_by,
                    tags: d.tags.clone(),
                })
                .map_err(DatabaseError::from)
            })
            .collect()
    }
}

#[async_trait]
impl StarRepository for MemoryStore {
    async fn star(
        &self,
        user_id: UserId,
        dashboard_id: &str,
        at: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        self.inner().stars.push((user_id, dashboard_id.to_string(), at));
        Ok(())
    }

    async fn unstar(&self, user_id: UserId, dashboard_id: &str) -> Result<u64, DatabaseError> {
        let mut inner = self.inner();
        let before = inner.stars.len();
        inner
            .stars
            .retain(|(uid, id, _)| !(*uid == user_id && id == dashboard_id));
        Ok((before - inner.stars.len()) as u64)
    }

    async fn is_starred(&self, user_id: UserId, dashboard_id: &str) -> Result<bool, DatabaseError> {
        Ok(self
            .inner()
            .stars
            .iter()
            .any(|(uid, id, _)| *uid == user_id && id == dashboard_id))
    }

    async fn starred_by(&self, user_id: UserId) -> Result<Vec<String>, DatabaseError> {
        Ok(self
            .inner()
            .stars
            .iter()
            .filter(|(uid, _, _)| *uid == user_id)
            .map(|(_, id, _)| id.clone())
            .collect())
    }
}

#[async_trait]
impl TeamDirectory for MemoryStore {
    async fn team_exists(&self, team_id: TeamId) -> Result<bool, DatabaseError> {
        let inner = self.inner();
        if inner.fail_team_lookups {
            return Err(unavailable());
        }
        Ok(inner.teams.contains(&team_id))
    }

    async fn is_team_admin(&self, team_id: TeamId, user_id: UserId) -> Result<bool, DatabaseError> {
        let inner = self.inner();
        if inner.fail_team_lookups {
            return Err(unavailable());
        }
        Ok(inner.team_admins.contains(&(team_id, user_id)))
    }
}

#[async_trait]
impl HistoryRepository for MemoryStore {
    async fn record(&self, revision: &DashboardRevision) -> Result<(), DatabaseError> {
        self.inner().revisions.push(revision.clone());
        Ok(())
    }

    async fn list(&self, dashboard_id: &str) -> Result<Vec<DashboardRevision>, DatabaseError> {
        let mut revisions: Vec<_> = self
            .inner()
            .revisions
            .iter()
            .filter(|r| r.dashboard_id == dashboard_id)
            .cloned()
            .collect();
        revisions.reverse();
        Ok(revisions)
    }
}

impl Stores {
    pub fn memory(store: &MemoryStore) -> Self {
        let store = Arc::new(store.clone());
        Self {
            dashboards: store.clone(),
            stars: store.clone(),
            teams: store.clone(),
            revisions: store,
        }
    }
}

pub fn user(id: UserId, role: Role) -> CurrentUser {
    CurrentUser {
        id,
        username: format!("user{}", id),
        role,
    }
}

/// Application wired to a [`MemoryStore`], with the history recorder running.
/// Must be created inside a tokio runtime.
pub struct TestContext {
    pub store: MemoryStore,
    pub state: AppState,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_config(AppConfig::development())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let store = MemoryStore::new();
        let (state, recorder) = AppState::new(config, Stores::memory(&store), None);
        recorder.spawn();
        Self { store, state }
    }

    pub fn router(&self) -> Router {
        crate::routes::app(self.state.clone())
    }

    /// Bearer token for the given user signed with the configured secret
    pub fn token(&self, user: &CurrentUser) -> Result<String, JwtError> {
        let security = &self.state.config.security;
        let claims = Claims::new(user, security.jwt_expiry_hours)?;
        generate_jwt(&claims, &security.jwt_secret)
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::SubsecRound;

    fn row(id: &str, owned_by: TeamId, created: DateTime<Utc>) -> DashboardRow {
        DashboardRow {
            id: id.to_string(),
            title: id.to_uppercase(),
            owned_by,
            created_by: 1,
            tags: "[]".into(),
            data: "{}".into(),
            created,
            updated: created,
        }
    }

    #[tokio::test]
    async fn listings_break_creation_ties_by_id() {
        let store = MemoryStore::new();
        let now = Utc::now().trunc_subsecs(6);
        let earlier = now - chrono::Duration::seconds(1);
        store.insert(&row("d-b", 1, now)).await.unwrap();
        store.insert(&row("d-c", 1, earlier)).await.unwrap();
        store.insert(&row("d-a", 1, now)).await.unwrap();

        let team: Vec<_> = store.list_by_team(1).await.unwrap().into_iter().map(|d| d.id).collect();
        assert_eq!(team, vec!["d-c", "d-a", "d-b"]);

        let all: Vec<_> = store.list_simple().await.unwrap().into_iter().map(|d| d.id).collect();
        assert_eq!(all, vec!["d-c", "d-a", "d-b"]);
    }
}
