//! Integration tests for registration, login and token rotation.

use axum::http::StatusCode;
use serde_json::json;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_register_and_profile() {
    let Some(app) = TestApp::try_new().await else {
        return;
    };
    let user = app.create_user("alice").await;

    let response = app
        .request("GET", "/api/v1/users/me", None, Some(&user.token))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.str_field("username"), user.username);
    assert!(response.data().get("passwordHash").is_none());
    assert!(response.data().get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_rejects_duplicates_and_blanks() {
    let Some(app) = TestApp::try_new().await else {
        return;
    };
    let user = app.create_user("dup").await;

    let response = app
        .request(
            "POST",
            "/api/v1/auth/register",
            Some(json!({
                "username": user.username,
                "email": format!("other-{}@example.test", user.username),
                "password": "Str0ngPassw0rd!",
                "firstName": "Other",
                "lastName": "User",
                "phoneNumber": "5550101",
            })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message(), "Username already exists");

    let response = app
        .request(
            "POST",
            "/api/v1/auth/register",
            Some(json!({ "username": "someone", "password": "x" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message(), "All fields are required");
}

#[tokio::test]
async fn test_login_invalid_password() {
    let Some(app) = TestApp::try_new().await else {
        return;
    };
    let user = app.create_user("bob").await;

    let response = app
        .request(
            "POST",
            "/api/v1/auth/login",
            Some(json!({ "username": user.username, "password": "wrong-password" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.message(), "Invalid User Credentials");
}

#[tokio::test]
async fn test_login_sets_session_cookies() {
    let Some(app) = TestApp::try_new().await else {
        return;
    };
    let user = app.create_user("carol").await;

    let response = app
        .request(
            "POST",
            "/api/v1/auth/login",
            Some(json!({ "email": format!("{}@example.test", user.username), "password": user.password })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let cookies: Vec<_> = response
        .headers
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();
    assert!(cookies.iter().any(|c| c.starts_with("accessToken=") && c.contains("HttpOnly")));
    assert!(cookies.iter().any(|c| c.starts_with("refreshToken=")));
}

#[tokio::test]
async fn test_refresh_rotation_rejects_reuse() {
    let Some(app) = TestApp::try_new().await else {
        return;
    };
    let user = app.create_user("dave").await;
    let first = user.refresh_token.clone();

    let response = app
        .request(
            "POST",
            "/api/v1/auth/refresh-token",
            Some(json!({ "refreshToken": first })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let second = response.str_field("refreshToken");
    assert_ne!(second, first);

    let response = app
        .request(
            "POST",
            "/api/v1/auth/refresh-token",
            Some(json!({ "refreshToken": first })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.message(), "Refresh token is expired or used");

    let response = app
        .request(
            "POST",
            "/api/v1/auth/refresh-token",
            Some(json!({ "refreshToken": second })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_logout_invalidates_refresh_token() {
    let Some(app) = TestApp::try_new().await else {
        return;
    };
    let user = app.create_user("erin").await;

    let response = app
        .request("POST", "/api/v1/auth/logout", None, Some(&user.token))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .request(
            "POST",
            "/api/v1/auth/refresh-token",
            Some(json!({ "refreshToken": user.refresh_token })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_user_admin_requires_site_admin() {
    let Some(app) = TestApp::try_new().await else {
        return;
    };
    let user = app.create_user("frank").await;
    let admin = app.create_site_admin("root").await;

    let response = app
        .request("GET", "/api/v1/users", None, Some(&user.token))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .request(
            "GET",
            &format!("/api/v1/users/{}", user.id),
            None,
            Some(&admin.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.str_field("username"), user.username);
}
