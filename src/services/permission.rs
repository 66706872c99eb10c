use std::sync::Arc;

use crate::database::{DatabaseError, TeamDirectory};
use crate::services::ServiceError;
use crate::types::{CurrentUser, TeamId};

/// Decides whether a user may manage dashboards of a team
#[derive(Clone)]
pub struct PermissionChecker {
    teams: Arc<dyn TeamDirectory>,
}

impl PermissionChecker {
    pub fn new(teams: Arc<dyn TeamDirectory>) -> Self {
        Self { teams }
    }

    /// Global admins are always allowed; everyone else must administer the team.
    pub async fn authorize(&self, user: &CurrentUser, team_id: TeamId) -> Result<bool, DatabaseError> {
        if user.role.is_admin() {
            return Ok(true);
        }
        self.teams.is_team_admin(team_id, user.id).await
    }

    pub async fn require(&self, user: &CurrentUser, team_id: TeamId) -> Result<(), ServiceError> {
        let allowed = self
            .authorize(user, team_id)
            .await
            .map_err(ServiceError::internal("check team admin"))?;

        if !allowed {
            tracing::debug!(user_id = user.id, team_id, "team admin required");
            return Err(ServiceError::NoPermission);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{user, MemoryStore};
    use crate::types::Role;

    fn checker(store: &MemoryStore) -> PermissionChecker {
        PermissionChecker::new(Arc::new(store.clone()))
    }

    #[tokio::test]
    async fn global_admin_bypasses_team_lookup() {
        let store = MemoryStore::new();
        store.fail_team_lookups(true);

        let admin = user(1, Role::Admin);
        assert!(checker(&store).authorize(&admin, 42).await.unwrap());
    }

    #[tokio::test]
    async fn team_admin_is_allowed_only_for_their_team() {
        let store = MemoryStore::new();
        store.add_team(1);
        store.add_team(2);
        store.add_team_admin(1, 10);

        let editor = user(10, Role::Editor);
        let checker = checker(&store);
        assert!(checker.authorize(&editor, 1).await.unwrap());
        assert!(!checker.authorize(&editor, 2).await.unwrap());
        assert!(matches!(
            checker.require(&editor, 2).await,
            Err(ServiceError::NoPermission)
        ));
    }

    #[tokio::test]
    async fn lookup_failure_is_internal_not_denial() {
        let store = MemoryStore::new();
        store.fail_team_lookups(true);

        let viewer = user(5, Role::Viewer);
        let err = checker(&store).require(&viewer, 1).await.unwrap_err();
        assert!(matches!(err, ServiceError::Internal { .. }));
    }
}
