//! Organization and membership handlers.

use axum::extract::State;
use uuid::Uuid;

use complyhub_entity::organization::{
    Organization, OrganizationMember, OrganizationMemberView, UpdateOrganization,
};
use complyhub_service::organization::{
    AddExistingMemberRequest, AddMemberRequest, AddNewMemberRequest, CreateOrganizationRequest,
    NewMember,
};

use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::{ApiJson, ApiPath, AuthUser};
use crate::state::AppState;

/// POST /api/v1/organizations
pub async fn create_organization(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(req): ApiJson<CreateOrganizationRequest>,
) -> ApiResult<ApiResponse<Organization>> {
    let org = state.organization_service.create(&auth, req).await?;
    Ok(ApiResponse::created("Organization created successfully", org))
}

/// GET /api/v1/organizations
pub async fn list_organizations(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<ApiResponse<Vec<Organization>>> {
    let orgs = state.organization_service.list_all(&auth).await?;
    Ok(ApiResponse::ok("Organizations fetched successfully", orgs))
}

/// GET /api/v1/organizations/mine
pub async fn my_organizations(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<ApiResponse<Vec<Organization>>> {
    let orgs = state.organization_service.mine(&auth).await?;
    Ok(ApiResponse::ok("Organizations fetched successfully", orgs))
}

/// GET /api/v1/organizations/{org_id}
pub async fn get_organization(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(org_id): ApiPath<Uuid>,
) -> ApiResult<ApiResponse<Organization>> {
    let org = state.organization_service.get(&auth, org_id).await?;
    Ok(ApiResponse::ok("Organization fetched successfully", org))
}

/// PATCH /api/v1/organizations/{org_id}
pub async fn update_organization(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(org_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateOrganization>,
) -> ApiResult<ApiResponse<Organization>> {
    let org = state.organization_service.update(&auth, org_id, req).await?;
    Ok(ApiResponse::ok("Organization updated successfully", org))
}

/// DELETE /api/v1/organizations/{org_id}
pub async fn delete_organization(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(org_id): ApiPath<Uuid>,
) -> ApiResult<ApiResponse<serde_json::Value>> {
    state.organization_service.delete(&auth, org_id).await?;
    Ok(ApiResponse::message("Organization deleted successfully"))
}

// ── Members ─────────────────────────────────────────────────────

/// GET /api/v1/organizations/{org_id}/users
pub async fn list_members(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(org_id): ApiPath<Uuid>,
) -> ApiResult<ApiResponse<Vec<OrganizationMemberView>>> {
    let members = state.organization_service.list_members(&auth, org_id).await?;
    Ok(ApiResponse::ok("Organization members fetched successfully", members))
}

/// POST /api/v1/organizations/{org_id}/users
pub async fn add_member(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(org_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<AddMemberRequest>,
) -> ApiResult<ApiResponse<OrganizationMember>> {
    let member = state.organization_service.add_member(&auth, org_id, req).await?;
    Ok(ApiResponse::created("User added to organization", member))
}

/// POST /api/v1/organizations/{org_id}/users/add-existing
pub async fn add_existing_member(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(org_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<AddExistingMemberRequest>,
) -> ApiResult<ApiResponse<OrganizationMember>> {
    let member = state
        .organization_service
        .add_existing_member(&auth, org_id, req)
        .await?;
    Ok(ApiResponse::created("User added to organization", member))
}

/// POST /api/v1/organizations/{org_id}/users/add-new
pub async fn add_new_member(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(org_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<AddNewMemberRequest>,
) -> ApiResult<ApiResponse<NewMember>> {
    let created = state
        .organization_service
        .add_new_member(&auth, org_id, req)
        .await?;
    Ok(ApiResponse::created("User registered and added to organization", created))
}

/// DELETE /api/v1/organizations/{org_id}/users/{user_id}
pub async fn remove_member(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath((org_id, user_id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<ApiResponse<serde_json::Value>> {
    state
        .organization_service
        .remove_member(&auth, org_id, user_id)
        .await?;
    Ok(ApiResponse::message("User removed from organization"))
}
