//! Route definitions for the ComplyHub HTTP API.
//!
//! Domain routes are mounted under `/api/v1`; the health check lives at
//! `/api/health`. The router receives `AppState` and passes it to all
//! handlers via Axum's `State` extractor.

use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware as axum_middleware,
    routing::{get, patch, post},
};
use tower_http::compression::CompressionLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state
        .config
        .storage
        .max_upload_size_bytes
        .max(state.config.server.max_json_body_bytes);

    let api_routes = Router::new()
        .nest("/auth", auth_routes())
        .nest("/users", user_routes())
        .nest("/organizations", organization_routes())
        .nest("/compliance-programs", program_routes())
        .nest("/folders", folder_routes())
        .nest("/documents", document_routes())
        .nest("/templates", template_routes());

    let cors = middleware::cors::build_cors_layer(&state.config.server.cors);
    let timeout = Duration::from_secs(state.config.server.request_timeout_seconds);

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/api/health", get(handlers::health::health_check))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout,
        ))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Registration, login and session handling
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/logout", post(handlers::auth::logout))
        .route("/refresh-token", post(handlers::auth::refresh))
        .route("/switch-organization", post(handlers::auth::switch_organization))
}

/// Profile and user administration
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::user::list_users))
        .route(
            "/me",
            get(handlers::user::get_profile).patch(handlers::user::update_profile),
        )
        .route(
            "/{id}",
            get(handlers::user::get_user).delete(handlers::user::delete_user),
        )
}

/// Organizations, their members and their teams
fn organization_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(handlers::organization::create_organization)
                .get(handlers::organization::list_organizations),
        )
        .route("/mine", get(handlers::organization::my_organizations))
        .route(
            "/{org_id}",
            get(handlers::organization::get_organization)
                .patch(handlers::organization::update_organization)
                .delete(handlers::organization::delete_organization),
        )
        .route(
            "/{org_id}/users",
            get(handlers::organization::list_members).post(handlers::organization::add_member),
        )
        .route(
            "/{org_id}/users/add-existing",
            post(handlers::organization::add_existing_member),
        )
        .route(
            "/{org_id}/users/add-new",
            post(handlers::organization::add_new_member),
        )
        .route(
            "/{org_id}/users/{user_id}",
            axum::routing::delete(handlers::organization::remove_member),
        )
        .route(
            "/{org_id}/users/{user_id}/teams",
            get(handlers::team::user_teams),
        )
        .nest("/{org_id}/teams", team_routes())
}

/// Teams of one organization
fn team_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(handlers::team::create_team).get(handlers::team::list_teams),
        )
        .route(
            "/{team_id}",
            get(handlers::team::get_team)
                .patch(handlers::team::update_team)
                .delete(handlers::team::delete_team),
        )
        .route("/{team_id}/users", post(handlers::team::add_user))
        .route(
            "/{team_id}/users/{user_id}",
            axum::routing::delete(handlers::team::remove_user),
        )
        .route(
            "/{team_id}/users/{user_id}/make-leader",
            patch(handlers::team::make_leader),
        )
        .route(
            "/{team_id}/transfer-leadership",
            patch(handlers::team::transfer_leadership),
        )
        .route(
            "/{team_id}/members",
            get(handlers::team::list_members)
                .post(handlers::team::assign_members)
                .delete(handlers::team::remove_members),
        )
}

/// Compliance programs with their rules and standards
fn program_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(handlers::program::create_program).get(handlers::program::list_programs),
        )
        .route(
            "/{id}",
            get(handlers::program::get_program)
                .patch(handlers::program::update_program)
                .delete(handlers::program::delete_program),
        )
        .route("/{id}/activate", patch(handlers::program::activate_program))
        .route("/{id}/deactivate", patch(handlers::program::deactivate_program))
        .route("/{id}/full", get(handlers::program::program_overview))
        .route(
            "/{id}/rules",
            post(handlers::program::create_rule).get(handlers::program::list_rules),
        )
        .route(
            "/{id}/rules/{rule_id}",
            get(handlers::program::get_rule)
                .patch(handlers::program::update_rule)
                .delete(handlers::program::delete_rule),
        )
        .route(
            "/{id}/rules/{rule_id}/standards",
            get(handlers::program::rule_standards),
        )
        .route(
            "/{id}/standards",
            post(handlers::program::create_standard).get(handlers::program::list_standards),
        )
        .route(
            "/{id}/standards/{standard_id}",
            get(handlers::program::get_standard)
                .patch(handlers::program::update_standard)
                .delete(handlers::program::delete_standard),
        )
}

/// Folders and uploads into them
fn folder_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(handlers::folder::create_folder).get(handlers::folder::list_folders),
        )
        .route(
            "/{id}",
            get(handlers::folder::get_folder)
                .patch(handlers::folder::update_folder)
                .delete(handlers::folder::delete_folder),
        )
        .route(
            "/{id}/documents",
            get(handlers::document::list_folder_documents)
                .post(handlers::document::upload_document),
        )
}

/// Documents, versions and downloads
fn document_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::document::list_documents))
        .route(
            "/{id}",
            get(handlers::document::get_document)
                .patch(handlers::document::update_document)
                .delete(handlers::document::delete_document),
        )
        .route(
            "/{id}/versions",
            get(handlers::document::list_versions).post(handlers::document::add_version),
        )
        .route("/{id}/download", get(handlers::document::download_document))
}

/// Document templates
fn template_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(handlers::template::create_template).get(handlers::template::list_templates),
        )
        .route(
            "/{id}",
            get(handlers::template::get_template)
                .patch(handlers::template::update_template)
                .delete(handlers::template::delete_template),
        )
}
