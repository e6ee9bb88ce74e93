//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use sqlx::PgPool;

use complyhub_auth::jwt::decoder::JwtDecoder;
use complyhub_core::config::AppConfig;
use complyhub_service::auth::AuthService;
use complyhub_service::document::DocumentService;
use complyhub_service::folder::FolderService;
use complyhub_service::organization::OrganizationService;
use complyhub_service::program::ProgramService;
use complyhub_service::team::TeamService;
use complyhub_service::template::TemplateService;
use complyhub_service::user::UserService;
use complyhub_storage::StorageManager;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// PostgreSQL connection pool
    pub db_pool: PgPool,
    /// Document object storage
    pub storage_manager: Arc<StorageManager>,

    // ── Auth ─────────────────────────────────────────────────
    /// Access token validation for the `AuthUser` extractor
    pub jwt_decoder: Arc<JwtDecoder>,

    // ── Services ─────────────────────────────────────────────
    pub auth_service: Arc<AuthService>,
    pub user_service: Arc<UserService>,
    pub organization_service: Arc<OrganizationService>,
    pub team_service: Arc<TeamService>,
    pub program_service: Arc<ProgramService>,
    pub folder_service: Arc<FolderService>,
    pub document_service: Arc<DocumentService>,
    pub template_service: Arc<TemplateService>,
}
