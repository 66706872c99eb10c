#![allow(dead_code)]

use anyhow::Result;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use dashboard_api::config::AppConfig;
use dashboard_api::testing::{user, TestContext};
use dashboard_api::types::{CurrentUser, Role};

pub fn admin() -> CurrentUser {
    user(1, Role::Admin)
}

/// Administers team 1
pub fn team_one_admin() -> CurrentUser {
    user(10, Role::Editor)
}

/// Administers team 2
pub fn team_two_admin() -> CurrentUser {
    user(20, Role::Editor)
}

/// Administers no team
pub fn outsider() -> CurrentUser {
    user(30, Role::Viewer)
}

/// Drives the router in-process over an in-memory store seeded with teams 1 and 2
pub struct TestClient {
    pub ctx: TestContext,
}

impl TestClient {
    pub fn new() -> Self {
        Self::with_config(AppConfig::development())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let ctx = TestContext::with_config(config);
        ctx.store.add_team(1);
        ctx.store.add_team(2);
        ctx.store.add_team_admin(1, team_one_admin().id);
        ctx.store.add_team_admin(2, team_two_admin().id);
        Self { ctx }
    }

    pub async fn send(
        &self,
        method: Method,
        path: &str,
        as_user: Option<&CurrentUser>,
        body: Option<Value>,
    ) -> Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(u) = as_user {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", self.ctx.token(u)?));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.ctx.router().oneshot(request).await?;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };
        Ok((status, value))
    }

    pub async fn get(&self, path: &str, as_user: &CurrentUser) -> Result<(StatusCode, Value)> {
        self.send(Method::GET, path, Some(as_user), None).await
    }

    pub async fn post(&self, path: &str, as_user: &CurrentUser, body: Value) -> Result<(StatusCode, Value)> {
        self.send(Method::POST, path, Some(as_user), Some(body)).await
    }

    pub async fn delete(&self, path: &str, as_user: &CurrentUser) -> Result<(StatusCode, Value)> {
        self.send(Method::DELETE, path, Some(as_user), None).await
    }

    /// Save a dashboard and return its id
    pub async fn create_dashboard(&self, as_user: &CurrentUser, title: &str, owned_by: i64) -> Result<String> {
        let (status, body) = self
            .post(
                "/dashboard",
                as_user,
                serde_json::json!({
                    "dashboard": {
                        "title": title,
                        "ownedBy": owned_by,
                        "tags": ["prod", "api"],
                        "data": { "panels": [] }
                    },
                    "changes": "create"
                }),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::OK, "create failed: {} {}", status, body);
        body["data"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("missing id in {}", body))
    }
}
