//! Compliance program, rule and standard handlers.

use axum::extract::State;
use uuid::Uuid;

use complyhub_entity::program::{
    Program, ProgramCascade, ProgramOverview, Rule, Standard, UpdateProgram, UpdateRule,
    UpdateStandard,
};
use complyhub_service::program::{CreateProgramRequest, CreateRuleRequest, CreateStandardRequest};

use crate::dto::request::ProgramListQuery;
use crate::dto::response::{ApiResponse, DeletedCount};
use crate::error::ApiResult;
use crate::extractors::{ApiJson, ApiPath, ApiQuery, AuthUser};
use crate::state::AppState;

/// POST /api/v1/compliance-programs
pub async fn create_program(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(req): ApiJson<CreateProgramRequest>,
) -> ApiResult<ApiResponse<Program>> {
    let program = state.program_service.create(&auth, req).await?;
    Ok(ApiResponse::created("Compliance program created successfully", program))
}

/// GET /api/v1/compliance-programs?isActive=
pub async fn list_programs(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<ProgramListQuery>,
) -> ApiResult<ApiResponse<Vec<Program>>> {
    let programs = state.program_service.list(&auth, query.is_active).await?;
    Ok(ApiResponse::ok("Compliance programs fetched successfully", programs))
}

/// GET /api/v1/compliance-programs/{id}
pub async fn get_program(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<ApiResponse<Program>> {
    let program = state.program_service.get(&auth, id).await?;
    Ok(ApiResponse::ok("Compliance program fetched successfully", program))
}

/// PATCH /api/v1/compliance-programs/{id}
pub async fn update_program(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateProgram>,
) -> ApiResult<ApiResponse<Program>> {
    let program = state.program_service.update(&auth, id, req).await?;
    Ok(ApiResponse::ok("Compliance program updated successfully", program))
}

/// DELETE /api/v1/compliance-programs/{id}
pub async fn delete_program(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<ApiResponse<ProgramCascade>> {
    let cascade = state.program_service.delete(&auth, id).await?;
    Ok(ApiResponse::ok("Compliance program deleted successfully", cascade))
}

/// PATCH /api/v1/compliance-programs/{id}/activate
pub async fn activate_program(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<ApiResponse<Program>> {
    let program = state.program_service.set_active(&auth, id, true).await?;
    Ok(ApiResponse::ok("Compliance program activated", program))
}

/// PATCH /api/v1/compliance-programs/{id}/deactivate
pub async fn deactivate_program(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<ApiResponse<Program>> {
    let program = state.program_service.set_active(&auth, id, false).await?;
    Ok(ApiResponse::ok("Compliance program deactivated", program))
}

/// GET /api/v1/compliance-programs/{id}/full
pub async fn program_overview(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<ApiResponse<ProgramOverview>> {
    let overview = state.program_service.overview(&auth, id).await?;
    Ok(ApiResponse::ok("Compliance program fetched successfully", overview))
}

// ── Rules ───────────────────────────────────────────────────────

/// POST /api/v1/compliance-programs/{id}/rules
pub async fn create_rule(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<CreateRuleRequest>,
) -> ApiResult<ApiResponse<Rule>> {
    let rule = state.program_service.create_rule(&auth, id, req).await?;
    Ok(ApiResponse::created("Rule created successfully", rule))
}

/// GET /api/v1/compliance-programs/{id}/rules
pub async fn list_rules(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<ApiResponse<Vec<Rule>>> {
    let rules = state.program_service.list_rules(&auth, id).await?;
    Ok(ApiResponse::ok("Rules fetched successfully", rules))
}

/// GET /api/v1/compliance-programs/{id}/rules/{rule_id}
pub async fn get_rule(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath((id, rule_id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<ApiResponse<Rule>> {
    let rule = state.program_service.get_rule(&auth, id, rule_id).await?;
    Ok(ApiResponse::ok("Rule fetched successfully", rule))
}

/// PATCH /api/v1/compliance-programs/{id}/rules/{rule_id}
pub async fn update_rule(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath((id, rule_id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(req): ApiJson<UpdateRule>,
) -> ApiResult<ApiResponse<Rule>> {
    let rule = state.program_service.update_rule(&auth, id, rule_id, req).await?;
    Ok(ApiResponse::ok("Rule updated successfully", rule))
}

/// DELETE /api/v1/compliance-programs/{id}/rules/{rule_id}
///
/// Also deletes the rule's standards; `deleted` counts them.
pub async fn delete_rule(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath((id, rule_id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<ApiResponse<DeletedCount>> {
    let deleted = state.program_service.delete_rule(&auth, id, rule_id).await?;
    Ok(ApiResponse::ok("Rule deleted successfully", DeletedCount { deleted }))
}

/// GET /api/v1/compliance-programs/{id}/rules/{rule_id}/standards
pub async fn rule_standards(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath((id, rule_id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<ApiResponse<Vec<Standard>>> {
    let standards = state.program_service.rule_standards(&auth, id, rule_id).await?;
    Ok(ApiResponse::ok("Standards fetched successfully", standards))
}

// ── Standards ───────────────────────────────────────────────────

/// POST /api/v1/compliance-programs/{id}/standards
pub async fn create_standard(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<CreateStandardRequest>,
) -> ApiResult<ApiResponse<Standard>> {
    let standard = state.program_service.create_standard(&auth, id, req).await?;
    Ok(ApiResponse::created("Standard created successfully", standard))
}

/// GET /api/v1/compliance-programs/{id}/standards
pub async fn list_standards(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<ApiResponse<Vec<Standard>>> {
    let standards = state.program_service.list_standards(&auth, id).await?;
    Ok(ApiResponse::ok("Standards fetched successfully", standards))
}

/// GET /api/v1/compliance-programs/{id}/standards/{standard_id}
pub async fn get_standard(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath((id, standard_id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<ApiResponse<Standard>> {
    let standard = state.program_service.get_standard(&auth, id, standard_id).await?;
    Ok(ApiResponse::ok("Standard fetched successfully", standard))
}

/// PATCH /api/v1/compliance-programs/{id}/standards/{standard_id}
pub async fn update_standard(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath((id, standard_id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(req): ApiJson<UpdateStandard>,
) -> ApiResult<ApiResponse<Standard>> {
    let standard = state
        .program_service
        .update_standard(&auth, id, standard_id, req)
        .await?;
    Ok(ApiResponse::ok("Standard updated successfully", standard))
}

/// DELETE /api/v1/compliance-programs/{id}/standards/{standard_id}
pub async fn delete_standard(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath((id, standard_id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<ApiResponse<serde_json::Value>> {
    state
        .program_service
        .delete_standard(&auth, id, standard_id)
        .await?;
    Ok(ApiResponse::message("Standard deleted successfully"))
}
