//! Shared test helpers for integration tests.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use sqlx::PgPool;
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

use complyhub_core::config::AppConfig;
use complyhub_core::config::storage::StorageBackend;
use complyhub_database::DatabasePool;
use complyhub_storage::StorageManager;

/// Environment variable naming the test database.
pub const TEST_DATABASE_ENV: &str = "COMPLYHUB_TEST_DATABASE_URL";

const MULTIPART_BOUNDARY: &str = "complyhub-test-boundary";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Database pool for direct queries
    pub db_pool: PgPool,
    /// Application config
    pub config: AppConfig,
    _storage_root: TempDir,
}

/// A registered user with a live access token.
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: Uuid,
    pub username: String,
    pub password: String,
    pub token: String,
    pub refresh_token: String,
}

impl TestApp {
    /// Config shared by all test apps, with local storage under `root`.
    pub fn test_config(database_url: &str, root: &TempDir) -> AppConfig {
        let mut config = AppConfig::default();
        config.database.url = database_url.to_string();
        config.database.max_connections = 5;
        config.database.min_connections = 0;
        config.auth.cookie_secure = false;
        config.storage.provider = StorageBackend::Local;
        config.storage.local.root_path = root.path().to_string_lossy().into_owned();
        config.storage.max_upload_size_bytes = 64 * 1024;
        config
    }

    /// Create a new test application, or `None` when no test database is
    /// configured.
    pub async fn try_new() -> Option<Self> {
        let url = std::env::var(TEST_DATABASE_ENV).ok()?;
        let root = TempDir::new().expect("Failed to create storage dir");
        let config = Self::test_config(&url, &root);

        let db = DatabasePool::connect(&config.database)
            .await
            .expect("Failed to connect to test database");
        complyhub_database::migration::run_migrations(db.pool())
            .await
            .expect("Failed to run migrations");
        let db_pool = db.into_pool();

        let storage = Arc::new(
            StorageManager::from_config(&config.storage)
                .await
                .expect("Failed to init storage"),
        );

        let state = complyhub_api::build_state(config.clone(), db_pool.clone(), storage);
        let router = complyhub_api::build_router(state);

        Some(Self {
            router,
            db_pool,
            config,
            _storage_root: root,
        })
    }

    /// Register a user with a unique name derived from `prefix`, then log in.
    pub async fn create_user(&self, prefix: &str) -> TestUser {
        let suffix = Uuid::new_v4().simple().to_string();
        let username = format!("{prefix}_{}", &suffix[..12]);
        let password = "Str0ngPassw0rd!".to_string();

        let response = self
            .request(
                "POST",
                "/api/v1/auth/register",
                Some(json!({
                    "username": username,
                    "email": format!("{username}@example.test"),
                    "password": password,
                    "firstName": "Test",
                    "lastName": prefix,
                    "phoneNumber": "5550100",
                })),
                None,
            )
            .await;
        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "Register failed: {:?}",
            response.body
        );
        let id = response.data()["id"]
            .as_str()
            .and_then(|s| Uuid::parse_str(s).ok())
            .expect("No user id in register response");

        let mut user = TestUser {
            id,
            username,
            password,
            token: String::new(),
            refresh_token: String::new(),
        };
        self.login(&mut user).await;
        user
    }

    /// Register a user and grant them the site admin role.
    pub async fn create_site_admin(&self, prefix: &str) -> TestUser {
        let mut user = self.create_user(prefix).await;
        sqlx::query("UPDATE users SET site_roles = ARRAY['siteAdmin']::site_role[] WHERE id = $1")
            .bind(user.id)
            .execute(&self.db_pool)
            .await
            .expect("Failed to promote user");
        self.login(&mut user).await;
        user
    }

    /// Log in again, replacing the user's tokens.
    pub async fn login(&self, user: &mut TestUser) {
        let response = self
            .request(
                "POST",
                "/api/v1/auth/login",
                Some(json!({ "username": user.username, "password": user.password })),
                None,
            )
            .await;
        assert_eq!(
            response.status,
            StatusCode::OK,
            "Login failed: {:?}",
            response.body
        );
        user.token = response.str_field("accessToken");
        user.refresh_token = response.str_field("refreshToken");
    }

    /// Create an organization owned by `owner` and make it their active one.
    pub async fn create_organization(&self, owner: &mut TestUser) -> Uuid {
        let suffix = Uuid::new_v4().simple().to_string();
        let response = self
            .request(
                "POST",
                "/api/v1/organizations",
                Some(json!({ "name": format!("Org {}", &suffix[..12]) })),
                Some(&owner.token),
            )
            .await;
        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "Create organization failed: {:?}",
            response.body
        );
        let org_id = response.id();
        self.switch_organization(owner, org_id, None).await;
        org_id
    }

    /// Activate `org_id` (and optionally `team_id`) for `user`.
    pub async fn switch_organization(&self, user: &mut TestUser, org_id: Uuid, team_id: Option<Uuid>) {
        let response = self
            .request(
                "POST",
                "/api/v1/auth/switch-organization",
                Some(json!({ "organizationId": org_id, "teamId": team_id })),
                Some(&user.token),
            )
            .await;
        assert_eq!(
            response.status,
            StatusCode::OK,
            "Switch organization failed: {:?}",
            response.body
        );
        user.token = response.str_field("accessToken");
        user.refresh_token = response.str_field("refreshToken");
    }

    /// Create a team in `org_id`; the caller becomes its leader.
    pub async fn create_team(&self, user: &TestUser, org_id: Uuid, name: &str) -> Uuid {
        let response = self
            .request(
                "POST",
                &format!("/api/v1/organizations/{org_id}/teams"),
                Some(json!({ "name": name })),
                Some(&user.token),
            )
            .await;
        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "Create team failed: {:?}",
            response.body
        );
        response.id()
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");
        self.send(req).await
    }

    /// Send a multipart form. Each part is `(name, file_name, bytes)`;
    /// parts without a file name are plain text fields.
    pub async fn multipart(
        &self,
        path: &str,
        parts: &[(&str, Option<&str>, &[u8])],
        token: &str,
    ) -> TestResponse {
        let mut body = Vec::new();
        for (name, file_name, data) in parts {
            body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}\r\n").as_bytes());
            match file_name {
                Some(file_name) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                             Content-Type: application/octet-stream\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                }
                None => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                    );
                }
            }
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}--\r\n").as_bytes());

        let req = Request::builder()
            .method("POST")
            .uri(path)
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
            )
            .header("Authorization", format!("Bearer {token}"))
            .body(Body::from(body))
            .expect("Failed to build request");
        self.send(req).await
    }

    /// Send a raw request and capture the response.
    pub async fn send(&self, req: Request<Body>) -> TestResponse {
        send(&self.router, req).await
    }
}

/// Send `req` through `router` and parse the body as JSON when possible.
pub async fn send(router: &Router, req: Request<Body>) -> TestResponse {
    let response = router
        .clone()
        .oneshot(req)
        .await
        .expect("Failed to send request");

    let status = response.status();
    let headers = response.headers().clone();
    let body_bytes = axum::body::to_bytes(response.into_body(), 4 * 1024 * 1024)
        .await
        .expect("Failed to read body");

    let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

    TestResponse {
        status,
        headers,
        body,
        raw: body_bytes.to_vec(),
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: axum::http::HeaderMap,
    /// Parsed JSON body, `Null` for non-JSON responses
    pub body: Value,
    /// Raw body bytes
    pub raw: Vec<u8>,
}

impl TestResponse {
    /// The envelope's `data` member.
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    /// The envelope's `message` member.
    pub fn message(&self) -> &str {
        self.body["message"].as_str().unwrap_or_default()
    }

    /// `data.id` as a UUID.
    pub fn id(&self) -> Uuid {
        self.data()["id"]
            .as_str()
            .and_then(|s| Uuid::parse_str(s).ok())
            .unwrap_or_else(|| panic!("No id in response: {:?}", self.body))
    }

    /// A string member of `data`.
    pub fn str_field(&self, field: &str) -> String {
        self.data()[field]
            .as_str()
            .unwrap_or_else(|| panic!("No {field} in response: {:?}", self.body))
            .to_string()
    }
}
