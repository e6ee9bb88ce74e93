//! Application builder: wires repositories, services and state, then
//! serves the router.

use std::sync::Arc;

use sqlx::PgPool;

use complyhub_auth::jwt::{JwtDecoder, JwtEncoder};
use complyhub_auth::password::{PasswordHasher, PasswordValidator};
use complyhub_core::config::AppConfig;
use complyhub_core::error::AppError;
use complyhub_database::repositories::{
    document, folder, organization, program, rule, standard, team, template, user,
};
use complyhub_service::access::AccessResolver;
use complyhub_service::auth::AuthService;
use complyhub_service::document::DocumentService;
use complyhub_service::folder::FolderService;
use complyhub_service::organization::OrganizationService;
use complyhub_service::program::ProgramService;
use complyhub_service::team::TeamService;
use complyhub_service::template::TemplateService;
use complyhub_service::user::UserService;
use complyhub_storage::StorageManager;

use crate::router::build_router;
use crate::state::AppState;

/// Construct every repository and service over `db_pool` and `storage`.
pub fn build_state(config: AppConfig, db_pool: PgPool, storage: Arc<StorageManager>) -> AppState {
    // ── Repositories ─────────────────────────────────────────────
    let user_repo = Arc::new(user::UserRepository::new(db_pool.clone()));
    let org_repo = Arc::new(organization::OrganizationRepository::new(db_pool.clone()));
    let team_repo = Arc::new(team::TeamRepository::new(db_pool.clone()));
    let program_repo = Arc::new(program::ProgramRepository::new(db_pool.clone()));
    let rule_repo = Arc::new(rule::RuleRepository::new(db_pool.clone()));
    let standard_repo = Arc::new(standard::StandardRepository::new(db_pool.clone()));
    let folder_repo = Arc::new(folder::FolderRepository::new(db_pool.clone()));
    let document_repo = Arc::new(document::DocumentRepository::new(db_pool.clone()));
    let template_repo = Arc::new(template::TemplateRepository::new(db_pool.clone()));

    // ── Auth ─────────────────────────────────────────────────────
    let jwt_encoder = Arc::new(JwtEncoder::new(&config.auth));
    let jwt_decoder = Arc::new(JwtDecoder::new(&config.auth));
    let password_hasher = Arc::new(PasswordHasher::new());
    let password_validator = Arc::new(PasswordValidator::new(&config.auth));
    let access = Arc::new(AccessResolver::new(
        Arc::clone(&org_repo),
        Arc::clone(&team_repo),
    ));

    // ── Services ─────────────────────────────────────────────────
    let auth_service = Arc::new(AuthService::new(
        Arc::clone(&user_repo),
        Arc::clone(&org_repo),
        Arc::clone(&team_repo),
        jwt_encoder,
        Arc::clone(&jwt_decoder),
        password_hasher,
        password_validator,
    ));
    let user_service = Arc::new(UserService::new(Arc::clone(&user_repo), Arc::clone(&access)));
    let organization_service = Arc::new(OrganizationService::new(
        Arc::clone(&org_repo),
        Arc::clone(&user_repo),
        Arc::clone(&program_repo),
        Arc::clone(&auth_service),
        Arc::clone(&access),
        Arc::clone(&storage),
    ));
    let team_service = Arc::new(TeamService::new(
        Arc::clone(&team_repo),
        Arc::clone(&org_repo),
        Arc::clone(&access),
        Arc::clone(&storage),
    ));
    let program_service = Arc::new(ProgramService::new(
        Arc::clone(&program_repo),
        rule_repo,
        Arc::clone(&standard_repo),
        Arc::clone(&access),
    ));
    let folder_service = Arc::new(FolderService::new(
        Arc::clone(&folder_repo),
        Arc::clone(&team_repo),
        Arc::clone(&access),
    ));
    let document_service = Arc::new(DocumentService::new(
        document_repo,
        folder_repo,
        team_repo,
        Arc::clone(&program_repo),
        Arc::clone(&standard_repo),
        Arc::clone(&access),
        Arc::clone(&storage),
    ));
    let template_service = Arc::new(TemplateService::new(
        template_repo,
        program_repo,
        standard_repo,
        org_repo,
        access,
    ));

    AppState {
        config: Arc::new(config),
        db_pool,
        storage_manager: storage,
        jwt_decoder,
        auth_service,
        user_service,
        organization_service,
        team_service,
        program_service,
        folder_service,
        document_service,
        template_service,
    }
}

/// Runs the ComplyHub server until a shutdown signal arrives.
pub async fn run_server(config: AppConfig, db_pool: PgPool) -> Result<(), AppError> {
    tracing::info!(provider = ?config.storage.provider, "Initializing document storage");
    let storage = Arc::new(StorageManager::from_config(&config.storage).await?);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let app = build_router(build_state(config, db_pool, storage));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("ComplyHub server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
