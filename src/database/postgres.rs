use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Dashboard, DashboardHistoryRow, DashboardRevision, DashboardRow, DashboardSimple,
    DashboardSimpleRow, DashboardSummary,
};
use crate::database::repository::{
    DashboardRepository, HistoryRepository, StarRepository, TeamDirectory,
};
use crate::types::{Role, TeamId, UserId};

/// Postgres-backed implementation of every repository seam
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DashboardRepository for PgStore {
    async fn insert(&self, row: &DashboardRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO dashboard (id, title, owned_by, created_by, tags, data, created, updated)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&row.id)
        .bind(&row.title)
        .bind(row.owned_by)
        .bind(row.created_by)
        .bind(&row.tags)
        .bind(&row.data)
        .bind(row.created)
        .bind(row.updated)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(&self, row: &DashboardRow) -> Result<u64, DatabaseError> {
        let result = sqlx::query(
            "UPDATE dashboard SET title = $1, tags = $2, data = $3, updated = $4 WHERE id = $5",
        )
        .bind(&row.title)
        .bind(&row.tags)
        .bind(&row.data)
        .bind(row.updated)
        .bind(&row.id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn find(&self, id: &str) -> Result<Option<Dashboard>, DatabaseError> {
        let row = sqlx::query_as::<_, DashboardRow>(
            r#"
            SELECT id, title, owned_by, created_by, tags, data, created, updated
            FROM dashboard
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(row.decode()?)),
            None => Ok(None),
        }
    }

    async fn owned_by(&self, id: &str) -> Result<Option<TeamId>, DatabaseError> {
        let owner: Option<(TeamId,)> = sqlx::query_as("SELECT owned_by FROM dashboard WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(owner.map(|(team_id,)| team_id))
    }

    async fn update_owned_by(&self, id: &str, team_id: TeamId) -> Result<u64, DatabaseError> {
        let result = sqlx::query("UPDATE dashboard SET owned_by = $1 WHERE id = $2")
            .bind(team_id)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_with_stars(&self, id: &str) -> Result<u64, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM dashboard WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query("DELETE FROM star_dashboard WHERE dashboard_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(deleted)
    }

    async fn list_by_team(&self, team_id: TeamId) -> Result<Vec<DashboardSummary>, DatabaseError> {
        let rows = sqlx::query_as::<_, DashboardSummary>(
            "SELECT id, title, created, updated FROM dashboard WHERE owned_by = $1 ORDER BY created, id",
        )
        .bind(team_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_simple(&self) -> Result<Vec<DashboardSimple>, DatabaseError> {
        let rows = sqlx::query_as::<_, DashboardSimpleRow>(
            "SELECT id, title, owned_by, tags FROM dashboard ORDER BY created, id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| DashboardSimple::try_from(row).map_err(DatabaseError::from))
            .collect()
    }
}

#[async_trait]
impl StarRepository for PgStore {
    async fn star(
        &self,
        user_id: UserId,
        dashboard_id: &str,
        at: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        sqlx::query("INSERT INTO star_dashboard (user_id, dashboard_id, created) VALUES ($1, $2, $3)")
            .bind(user_id)
            .bind(dashboard_id)
            .bind(at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn unstar(&self, user_id: UserId, dashboard_id: &str) -> Result<u64, DatabaseError> {
        let result = sqlx::query("DELETE FROM star_dashboard WHERE user_id = $1 AND dashboard_id = $2")
            .bind(user_id)
            .bind(dashboard_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn is_starred(&self, user_id: UserId, dashboard_id: &str) -> Result<bool, DatabaseError> {
        let (starred,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM star_dashboard WHERE user_id = $1 AND dashboard_id = $2)",
        )
        .bind(user_id)
        .bind(dashboard_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(starred)
    }

    async fn starred_by(&self, user_id: UserId) -> Result<Vec<String>, DatabaseError> {
        let ids: Vec<(String,)> = sqlx::query_as(
            "SELECT dashboard_id FROM star_dashboard WHERE user_id = $1 ORDER BY created",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids.into_iter().map(|(id,)| id).collect())
    }
}

#[async_trait]
impl TeamDirectory for PgStore {
    async fn team_exists(&self, team_id: TeamId) -> Result<bool, DatabaseError> {
        let (exists,): (bool,) = sqlx::query_as("SELECT EXISTS (SELECT 1 FROM team WHERE id = $1)")
            .bind(team_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn is_team_admin(&self, team_id: TeamId, user_id: UserId) -> Result<bool, DatabaseError> {
        let role: Option<(String,)> =
            sqlx::query_as("SELECT role FROM team_member WHERE team_id = $1 AND user_id = $2")
                .bind(team_id)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        let Some((role,)) = role else {
            return Ok(false);
        };
        // Unknown role names never grant admin rights
        let role: Option<Role> = serde_json::from_value(serde_json::Value::String(role)).ok();
        Ok(role.map(|r| r.is_admin()).unwrap_or(false))
    }
}

#[async_trait]
impl HistoryRepository for PgStore {
    async fn record(&self, revision: &DashboardRevision) -> Result<(), DatabaseError> {
        let history = serde_json::to_string(&revision.dashboard)?;
        sqlx::query(
            "INSERT INTO dashboard_history (dashboard_id, version, changes, history) VALUES ($1, $2, $3, $4)",
        )
        .bind(&revision.dashboard_id)
        .bind(revision.version)
        .bind(&revision.changes)
        .bind(history)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list(&self, dashboard_id: &str) -> Result<Vec<DashboardRevision>, DatabaseError> {
        let rows = sqlx::query_as::<_, DashboardHistoryRow>(
            r#"
            SELECT dashboard_id, version, changes, history
            FROM dashboard_history
            WHERE dashboard_id = $1
            ORDER BY version DESC
            "#,
        )
        .bind(dashboard_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| DashboardRevision::try_from(row).map_err(DatabaseError::from))
            .collect()
    }
}
