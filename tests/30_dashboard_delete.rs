mod common;

use anyhow::Result;
use axum::http::StatusCode;
use common::{admin, outsider, team_one_admin, team_two_admin, TestClient};
use dashboard_api::config::AppConfig;
use serde_json::json;

#[tokio::test]
async fn delete_removes_dashboard_and_stars() -> Result<()> {
    let client = TestClient::new();
    let id = client.create_dashboard(&team_one_admin(), "Doomed", 1).await?;
    client.post(&format!("/dashboard/{}/star", id), &outsider(), json!({})).await?;
    client.post(&format!("/dashboard/{}/star", id), &team_one_admin(), json!({})).await?;
    assert_eq!(client.ctx.store.star_count(&id), 2);

    let (status, body) = client.delete(&format!("/dashboard/{}", id), &team_one_admin()).await?;
    assert_eq!(status, StatusCode::OK, "delete failed: {}", body);
    assert_eq!(body, json!({ "success": true, "data": null }));

    let (status, _) = client.get(&format!("/dashboard/{}", id), &admin()).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(client.ctx.store.star_count(&id), 0);

    let (_, body) = client.get("/dashboards/starred", &outsider()).await?;
    assert_eq!(body["data"], json!([]));
    Ok(())
}

#[tokio::test]
async fn reserved_dashboards_cannot_be_deleted_by_anyone() -> Result<()> {
    let client = TestClient::new();

    for caller in [admin(), team_one_admin(), outsider()] {
        let (status, body) = client.delete("/dashboard/d-home", &caller).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "reserved dashboard can not be deleted");
    }
    Ok(())
}

#[tokio::test]
async fn delete_requires_admin_of_owning_team() -> Result<()> {
    let client = TestClient::new();
    let id = client.create_dashboard(&team_one_admin(), "Kept", 1).await?;

    for caller in [outsider(), team_two_admin()] {
        let (status, _) = client.delete(&format!("/dashboard/{}", id), &caller).await?;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    let (status, _) = client.get(&format!("/dashboard/{}", id), &admin()).await?;
    assert_eq!(status, StatusCode::OK);

    // Global admins bypass team membership
    let (status, _) = client.delete(&format!("/dashboard/{}", id), &admin()).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn deleting_unknown_dashboard_is_not_found() -> Result<()> {
    let client = TestClient::new();

    let (status, _) = client.delete("/dashboard/d-missing", &admin()).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn delete_is_forbidden_when_disabled() -> Result<()> {
    let mut config = AppConfig::development();
    config.dashboard.enable_delete = false;
    let client = TestClient::with_config(config);
    let id = client.create_dashboard(&admin(), "Permanent", 1).await?;

    let (status, body) = client.delete(&format!("/dashboard/{}", id), &admin()).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], false);

    let (status, _) = client.get(&format!("/dashboard/{}", id), &admin()).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}
