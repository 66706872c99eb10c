use std::sync::Arc;

use chrono::Utc;

use crate::database::StarRepository;
use crate::services::ServiceError;
use crate::types::CurrentUser;

#[derive(Clone)]
pub struct StarService {
    stars: Arc<dyn StarRepository>,
}

impl StarService {
    pub fn new(stars: Arc<dyn StarRepository>) -> Self {
        Self { stars }
    }

    pub async fn star(&self, user: &CurrentUser, dashboard_id: &str) -> Result<(), ServiceError> {
        require_id(dashboard_id)?;
        self.stars
            .star(user.id, dashboard_id, Utc::now())
            .await
            .map_err(ServiceError::internal("star dashboard"))
    }

    pub async fn unstar(&self, user: &CurrentUser, dashboard_id: &str) -> Result<(), ServiceError> {
        require_id(dashboard_id)?;
        self.stars
            .unstar(user.id, dashboard_id)
            .await
            .map(|_| ())
            .map_err(ServiceError::internal("unstar dashboard"))
    }

    pub async fn is_starred(&self, user: &CurrentUser, dashboard_id: &str) -> Result<bool, ServiceError> {
        self.stars
            .is_starred(user.id, dashboard_id)
            .await
            .map_err(ServiceError::internal("query dashboard starred"))
    }

    /// Ids of every dashboard the user starred
    pub async fn starred(&self, user: &CurrentUser) -> Result<Vec<String>, ServiceError> {
        self.stars
            .starred_by(user.id)
            .await
            .map_err(ServiceError::internal("get all starred dashboard"))
    }
}

fn require_id(dashboard_id: &str) -> Result<(), ServiceError> {
    if dashboard_id.is_empty() {
        return Err(ServiceError::param_invalid("dashboard id is required"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{user, MemoryStore};
    use crate::types::Role;

    #[tokio::test]
    async fn star_and_unstar_are_per_user() {
        let service = StarService::new(Arc::new(MemoryStore::new()));
        let alice = user(1, Role::Viewer);
        let bob = user(2, Role::Viewer);

        service.star(&alice, "d-a").await.unwrap();
        service.star(&alice, "d-b").await.unwrap();
        service.star(&bob, "d-a").await.unwrap();

        assert!(service.is_starred(&alice, "d-b").await.unwrap());
        assert!(!service.is_starred(&bob, "d-b").await.unwrap());

        service.unstar(&alice, "d-a").await.unwrap();
        assert_eq!(service.starred(&alice).await.unwrap(), vec!["d-b".to_string()]);
        assert_eq!(service.starred(&bob).await.unwrap(), vec!["d-a".to_string()]);
    }

    #[tokio::test]
    async fn starring_twice_is_allowed() {
        let service = StarService::new(Arc::new(MemoryStore::new()));
        let alice = user(1, Role::Viewer);

        service.star(&alice, "d-a").await.unwrap();
        service.star(&alice, "d-a").await.unwrap();
        assert_eq!(service.starred(&alice).await.unwrap().len(), 2);

        service.unstar(&alice, "d-a").await.unwrap();
        assert!(!service.is_starred(&alice, "d-a").await.unwrap());
    }
}
