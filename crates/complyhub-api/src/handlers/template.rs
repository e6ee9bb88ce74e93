//! Template handlers.

use axum::extract::State;
use uuid::Uuid;

use complyhub_entity::template::{Template, UpdateTemplate};
use complyhub_service::template::CreateTemplateRequest;

use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::{ApiJson, ApiPath, AuthUser};
use crate::state::AppState;

/// POST /api/v1/templates
pub async fn create_template(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(req): ApiJson<CreateTemplateRequest>,
) -> ApiResult<ApiResponse<Template>> {
    let template = state.template_service.create(&auth, req).await?;
    Ok(ApiResponse::created("Template created successfully", template))
}

/// GET /api/v1/templates
pub async fn list_templates(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<ApiResponse<Vec<Template>>> {
    let templates = state.template_service.list(&auth).await?;
    Ok(ApiResponse::ok("Templates fetched successfully", templates))
}

/// GET /api/v1/templates/{id}
pub async fn get_template(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<ApiResponse<Template>> {
    let template = state.template_service.get(&auth, id).await?;
    Ok(ApiResponse::ok("Template fetched successfully", template))
}

/// PATCH /api/v1/templates/{id}
pub async fn update_template(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateTemplate>,
) -> ApiResult<ApiResponse<Template>> {
    let template = state.template_service.update(&auth, id, req).await?;
    Ok(ApiResponse::ok("Template updated successfully", template))
}

/// DELETE /api/v1/templates/{id}
pub async fn delete_template(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<ApiResponse<serde_json::Value>> {
    state.template_service.delete(&auth, id).await?;
    Ok(ApiResponse::message("Template deleted successfully"))
}
