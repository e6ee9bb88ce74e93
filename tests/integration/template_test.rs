//! Integration tests for document templates.

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use crate::helpers::{TestApp, TestResponse, TestUser};
use crate::program_test::create_program;

async fn create_template(app: &TestApp, admin: &TestUser, program_id: Uuid) -> Uuid {
    let response = app
        .request(
            "POST",
            "/api/v1/templates",
            Some(json!({
                "name": "Access control policy",
                "content": "Who may access what",
                "associatedPrograms": [program_id],
            })),
            Some(&admin.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    response.id()
}

async fn enable_programs(app: &TestApp, owner: &TestUser, org_id: Uuid, programs: &[Uuid]) {
    let response = app
        .request(
            "PATCH",
            &format!("/api/v1/organizations/{org_id}"),
            Some(json!({ "complianceProgramsEnabled": programs })),
            Some(&owner.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
}

fn lists(response: &TestResponse, template_id: Uuid) -> bool {
    response
        .data()
        .as_array()
        .is_some_and(|t| t.iter().any(|t| t["id"] == template_id.to_string()))
}

#[tokio::test]
async fn test_templates_follow_enabled_programs() {
    let Some(app) = TestApp::try_new().await else {
        return;
    };
    let admin = app.create_site_admin("admin").await;
    let mut enabled_owner = app.create_user("enabled").await;
    let mut other_owner = app.create_user("other").await;
    let program_id = create_program(&app, &admin).await;
    let template_id = create_template(&app, &admin, program_id).await;

    let enabled_org = app.create_organization(&mut enabled_owner).await;
    enable_programs(&app, &enabled_owner, enabled_org, &[program_id]).await;
    app.create_organization(&mut other_owner).await;

    let response = app
        .request("GET", "/api/v1/templates", None, Some(&enabled_owner.token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(lists(&response, template_id));

    let response = app
        .request(
            "GET",
            &format!("/api/v1/templates/{template_id}"),
            None,
            Some(&enabled_owner.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .request("GET", "/api/v1/templates", None, Some(&other_owner.token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(!lists(&response, template_id));

    let response = app
        .request(
            "GET",
            &format!("/api/v1/templates/{template_id}"),
            None,
            Some(&other_owner.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.message(), "You do not have access to this template");

    // staff see everything
    let response = app
        .request("GET", "/api/v1/templates", None, Some(&admin.token))
        .await;
    assert!(lists(&response, template_id));
}

#[tokio::test]
async fn test_template_writes_require_staff_and_known_programs() {
    let Some(app) = TestApp::try_new().await else {
        return;
    };
    let admin = app.create_site_admin("admin").await;
    let user = app.create_user("plain").await;
    let program_id = create_program(&app, &admin).await;

    let response = app
        .request(
            "POST",
            "/api/v1/templates",
            Some(json!({
                "name": "Sneaky",
                "content": "...",
                "associatedPrograms": [program_id],
            })),
            Some(&user.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let unknown = Uuid::new_v4();
    let response = app
        .request(
            "POST",
            "/api/v1/templates",
            Some(json!({
                "name": "Orphan",
                "content": "...",
                "associatedPrograms": [program_id, unknown],
            })),
            Some(&admin.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(
        response.message(),
        format!("Compliance program not found: {unknown}")
    );
}
