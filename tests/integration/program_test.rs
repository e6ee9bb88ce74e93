//! Integration tests for the compliance catalogue.

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use crate::helpers::{TestApp, TestUser};

pub(crate) async fn create_program(app: &TestApp, admin: &TestUser) -> Uuid {
    let suffix = Uuid::new_v4().simple().to_string();
    let response = app
        .request(
            "POST",
            "/api/v1/compliance-programs",
            Some(json!({
                "name": format!("HIPAA {}", &suffix[..8]),
                "description": "Health data",
                "industry": "Healthcare",
            })),
            Some(&admin.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    response.id()
}

#[tokio::test]
async fn test_catalogue_requires_site_staff() {
    let Some(app) = TestApp::try_new().await else {
        return;
    };
    let user = app.create_user("plain").await;

    let response = app
        .request("GET", "/api/v1/compliance-programs", None, Some(&user.token))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .request(
            "POST",
            "/api/v1/compliance-programs",
            Some(json!({ "name": "Nope", "industry": "None" })),
            Some(&user.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_program_requires_name_and_industry() {
    let Some(app) = TestApp::try_new().await else {
        return;
    };
    let admin = app.create_site_admin("admin").await;

    let response = app
        .request(
            "POST",
            "/api/v1/compliance-programs",
            Some(json!({ "name": "Only a name" })),
            Some(&admin.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message(), "Name and industry are required");
}

#[tokio::test]
async fn test_program_overview_and_cascade() {
    let Some(app) = TestApp::try_new().await else {
        return;
    };
    let admin = app.create_site_admin("admin").await;
    let program_id = create_program(&app, &admin).await;
    let base = format!("/api/v1/compliance-programs/{program_id}");

    let response = app
        .request(
            "POST",
            &format!("{base}/rules"),
            Some(json!({ "name": "Privacy Rule", "code": "164.500" })),
            Some(&admin.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    let rule_id = response.id();

    let mut standard_ids = Vec::new();
    for (label, rule) in [("A-1", Some(rule_id)), ("A-2", Some(rule_id)), ("G-1", None)] {
        let response = app
            .request(
                "POST",
                &format!("{base}/standards"),
                Some(json!({
                    "programRuleId": rule,
                    "label": label,
                    "title": format!("Standard {label}"),
                    "priority": "high",
                    "type": "technical",
                })),
                Some(&admin.token),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        standard_ids.push(response.id());
    }

    let response = app
        .request("GET", &format!("{base}/full"), None, Some(&admin.token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let rules = response.data()["rules"].as_array().expect("rules");
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0]["standards"].as_array().map(Vec::len), Some(2));
    assert_eq!(
        response.data()["standaloneStandards"]
            .as_array()
            .map(Vec::len),
        Some(1)
    );

    let response = app
        .request(
            "GET",
            &format!("{base}/rules/{rule_id}/standards"),
            None,
            Some(&admin.token),
        )
        .await;
    assert_eq!(response.data().as_array().map(Vec::len), Some(2));

    let response = app
        .request("DELETE", &base, None, Some(&admin.token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["rulesDeleted"], 1);
    assert_eq!(response.data()["standardsDeleted"], 3);

    let response = app.request("GET", &base, None, Some(&admin.token)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app
        .request(
            "GET",
            &format!("{base}/rules/{rule_id}"),
            None,
            Some(&admin.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    for standard_id in standard_ids {
        let response = app
            .request(
                "GET",
                &format!("{base}/standards/{standard_id}"),
                None,
                Some(&admin.token),
            )
            .await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
    }
    for table in ["program_rules", "program_standards"] {
        let remaining: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table} WHERE program_id = $1"))
                .bind(program_id)
                .fetch_one(&app.db_pool)
                .await
                .expect("count rows");
        assert_eq!(remaining, 0, "{table} left behind");
    }
}

#[tokio::test]
async fn test_delete_rule_removes_its_standards() {
    let Some(app) = TestApp::try_new().await else {
        return;
    };
    let admin = app.create_site_admin("admin").await;
    let program_id = create_program(&app, &admin).await;
    let base = format!("/api/v1/compliance-programs/{program_id}");

    let response = app
        .request(
            "POST",
            &format!("{base}/rules"),
            Some(json!({ "name": "Security Rule", "code": "164.300" })),
            Some(&admin.token),
        )
        .await;
    let rule_id = response.id();

    let response = app
        .request(
            "POST",
            &format!("{base}/standards"),
            Some(json!({
                "programRuleId": rule_id,
                "label": "S-1",
                "title": "Access control",
                "priority": "medium",
                "type": "administrative",
            })),
            Some(&admin.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);

    let response = app
        .request(
            "DELETE",
            &format!("{base}/rules/{rule_id}"),
            None,
            Some(&admin.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["deleted"], 1);

    let response = app
        .request("GET", &format!("{base}/standards"), None, Some(&admin.token))
        .await;
    assert_eq!(response.data().as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn test_deactivate_filters_listing() {
    let Some(app) = TestApp::try_new().await else {
        return;
    };
    let admin = app.create_site_admin("admin").await;
    let program_id = create_program(&app, &admin).await;

    let response = app
        .request(
            "PATCH",
            &format!("/api/v1/compliance-programs/{program_id}/deactivate"),
            None,
            Some(&admin.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["isActive"], false);

    let response = app
        .request(
            "GET",
            "/api/v1/compliance-programs?isActive=true",
            None,
            Some(&admin.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(
        response
            .data()
            .as_array()
            .is_some_and(|all| all.iter().all(|p| p["id"] != program_id.to_string()))
    );
}
