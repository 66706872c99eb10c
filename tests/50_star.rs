mod common;

use anyhow::Result;
use axum::http::StatusCode;
use common::{outsider, team_one_admin, TestClient};
use serde_json::json;

#[tokio::test]
async fn star_unstar_and_query() -> Result<()> {
    let client = TestClient::new();
    let first = client.create_dashboard(&team_one_admin(), "First", 1).await?;
    let second = client.create_dashboard(&team_one_admin(), "Second", 1).await?;
    let viewer = outsider();

    let (status, _) = client.post(&format!("/dashboard/{}/star", first), &viewer, json!({})).await?;
    assert_eq!(status, StatusCode::OK);
    client.post(&format!("/dashboard/{}/star", second), &viewer, json!({})).await?;

    let (_, body) = client.get(&format!("/dashboard/{}/starred", first), &viewer).await?;
    assert_eq!(body["data"], json!(true));
    let (_, body) = client.get(&format!("/dashboard/{}/starred", first), &team_one_admin()).await?;
    assert_eq!(body["data"], json!(false));

    let (status, _) = client.delete(&format!("/dashboard/{}/star", first), &viewer).await?;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = client.get(&format!("/dashboard/{}/starred", first), &viewer).await?;
    assert_eq!(body["data"], json!(false));
    let (_, body) = client.get("/dashboards/starred", &viewer).await?;
    assert_eq!(body["data"], json!([second]));
    Ok(())
}
