//! Integration tests for team folders.

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use crate::helpers::{TestApp, TestUser};

/// An owner with an active organization and one team.
async fn workspace(app: &TestApp) -> (TestUser, Uuid, Uuid) {
    let mut owner = app.create_user("owner").await;
    let org_id = app.create_organization(&mut owner).await;
    let team_id = app.create_team(&owner, org_id, "Compliance").await;
    (owner, org_id, team_id)
}

async fn create_folder(app: &TestApp, user: &TestUser, team_id: Uuid, name: &str) -> Uuid {
    let response = app
        .request(
            "POST",
            "/api/v1/folders",
            Some(json!({ "name": name, "teamId": team_id })),
            Some(&user.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    response.id()
}

#[tokio::test]
async fn test_create_requires_team() {
    let Some(app) = TestApp::try_new().await else {
        return;
    };
    let (owner, _, _) = workspace(&app).await;

    let response = app
        .request(
            "POST",
            "/api/v1/folders",
            Some(json!({ "name": "Policies" })),
            Some(&owner.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message(), "Folder name and teamId are required");
}

#[tokio::test]
async fn test_folder_lifecycle() {
    let Some(app) = TestApp::try_new().await else {
        return;
    };
    let (owner, org_id, team_id) = workspace(&app).await;
    let folder_id = create_folder(&app, &owner, team_id, "Policies").await;

    let response = app
        .request(
            "GET",
            &format!("/api/v1/folders?teamId={team_id}"),
            None,
            Some(&owner.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(
        response
            .data()
            .as_array()
            .is_some_and(|f| f.iter().any(|f| f["id"] == folder_id.to_string()))
    );

    let response = app
        .request(
            "PATCH",
            &format!("/api/v1/folders/{folder_id}"),
            Some(json!({ "name": "Security policies" })),
            Some(&owner.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.str_field("name"), "Security policies");
    assert_eq!(response.str_field("organizationId"), org_id.to_string());

    let response = app
        .request(
            "PATCH",
            &format!("/api/v1/folders/{folder_id}"),
            Some(json!({ "name": "  " })),
            Some(&owner.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .request(
            "DELETE",
            &format!("/api/v1/folders/{folder_id}"),
            None,
            Some(&owner.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .request(
            "GET",
            &format!("/api/v1/folders/{folder_id}"),
            None,
            Some(&owner.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_outsider_cannot_open_folder() {
    let Some(app) = TestApp::try_new().await else {
        return;
    };
    let (owner, _, team_id) = workspace(&app).await;
    let outsider = app.create_user("outsider").await;
    let folder_id = create_folder(&app, &owner, team_id, "Evidence").await;

    let response = app
        .request(
            "GET",
            &format!("/api/v1/folders/{folder_id}"),
            None,
            Some(&outsider.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_invalid_folder_id_is_bad_request() {
    let Some(app) = TestApp::try_new().await else {
        return;
    };
    let (owner, _, _) = workspace(&app).await;

    let response = app
        .request("GET", "/api/v1/folders/not-a-uuid", None, Some(&owner.token))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.message().starts_with("Invalid path parameter"));
}
