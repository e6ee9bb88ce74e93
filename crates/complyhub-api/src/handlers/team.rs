//! Team and team membership handlers.

use axum::extract::State;
use uuid::Uuid;

use complyhub_entity::team::{Team, TeamDetails, TeamMemberView, TeamMembership, UpdateTeam};
use complyhub_service::team::{
    AssignMembersRequest, BulkResult, CreateTeamRequest, MemberAssignment, RemoveMembersRequest,
    TransferLeadershipRequest,
};

use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::{ApiJson, ApiPath, AuthUser};
use crate::state::AppState;

/// POST /api/v1/organizations/{org_id}/teams
pub async fn create_team(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(org_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<CreateTeamRequest>,
) -> ApiResult<ApiResponse<Team>> {
    let team = state.team_service.create(&auth, org_id, req).await?;
    Ok(ApiResponse::created("Team created successfully", team))
}

/// GET /api/v1/organizations/{org_id}/teams
pub async fn list_teams(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(org_id): ApiPath<Uuid>,
) -> ApiResult<ApiResponse<Vec<Team>>> {
    let teams = state.team_service.list(&auth, org_id).await?;
    Ok(ApiResponse::ok("Teams fetched successfully", teams))
}

/// GET /api/v1/organizations/{org_id}/teams/{team_id}
pub async fn get_team(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath((org_id, team_id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<ApiResponse<TeamDetails>> {
    let team = state.team_service.get(&auth, org_id, team_id).await?;
    Ok(ApiResponse::ok("Team fetched successfully", team))
}

/// PATCH /api/v1/organizations/{org_id}/teams/{team_id}
pub async fn update_team(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath((org_id, team_id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(req): ApiJson<UpdateTeam>,
) -> ApiResult<ApiResponse<Team>> {
    let team = state.team_service.update(&auth, org_id, team_id, req).await?;
    Ok(ApiResponse::ok("Team updated successfully", team))
}

/// DELETE /api/v1/organizations/{org_id}/teams/{team_id}
pub async fn delete_team(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath((org_id, team_id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<ApiResponse<serde_json::Value>> {
    state.team_service.delete(&auth, org_id, team_id).await?;
    Ok(ApiResponse::message("Team deleted successfully"))
}

// ── Membership ──────────────────────────────────────────────────

/// POST /api/v1/organizations/{org_id}/teams/{team_id}/users
pub async fn add_user(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath((org_id, team_id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(req): ApiJson<MemberAssignment>,
) -> ApiResult<ApiResponse<serde_json::Value>> {
    state.team_service.add_user(&auth, org_id, team_id, req).await?;
    Ok(ApiResponse::message("User added to team"))
}

/// DELETE /api/v1/organizations/{org_id}/teams/{team_id}/users/{user_id}
pub async fn remove_user(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath((org_id, team_id, user_id)): ApiPath<(Uuid, Uuid, Uuid)>,
) -> ApiResult<ApiResponse<serde_json::Value>> {
    state
        .team_service
        .remove_user(&auth, org_id, team_id, user_id)
        .await?;
    Ok(ApiResponse::message("User removed from team"))
}

/// GET /api/v1/organizations/{org_id}/teams/{team_id}/members
pub async fn list_members(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath((org_id, team_id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<ApiResponse<Vec<TeamMemberView>>> {
    let members = state.team_service.list_members(&auth, org_id, team_id).await?;
    Ok(ApiResponse::ok("Team members fetched successfully", members))
}

/// POST /api/v1/organizations/{org_id}/teams/{team_id}/members
pub async fn assign_members(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath((org_id, team_id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(req): ApiJson<AssignMembersRequest>,
) -> ApiResult<ApiResponse<BulkResult>> {
    let result = state
        .team_service
        .assign_members(&auth, org_id, team_id, req)
        .await?;
    Ok(ApiResponse::ok("Members assigned to team", result))
}

/// DELETE /api/v1/organizations/{org_id}/teams/{team_id}/members
pub async fn remove_members(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath((org_id, team_id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(req): ApiJson<RemoveMembersRequest>,
) -> ApiResult<ApiResponse<BulkResult>> {
    let result = state
        .team_service
        .remove_members(&auth, org_id, team_id, req)
        .await?;
    Ok(ApiResponse::ok("Members removed from team", result))
}

/// PATCH /api/v1/organizations/{org_id}/teams/{team_id}/users/{user_id}/make-leader
pub async fn make_leader(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath((org_id, team_id, user_id)): ApiPath<(Uuid, Uuid, Uuid)>,
) -> ApiResult<ApiResponse<serde_json::Value>> {
    state
        .team_service
        .make_leader(&auth, org_id, team_id, user_id)
        .await?;
    Ok(ApiResponse::message("User promoted to team leader"))
}

/// PATCH /api/v1/organizations/{org_id}/teams/{team_id}/transfer-leadership
pub async fn transfer_leadership(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath((org_id, team_id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(req): ApiJson<TransferLeadershipRequest>,
) -> ApiResult<ApiResponse<serde_json::Value>> {
    state
        .team_service
        .transfer_leadership(&auth, org_id, team_id, req)
        .await?;
    Ok(ApiResponse::message("Team leadership transferred"))
}

/// GET /api/v1/organizations/{org_id}/users/{user_id}/teams
pub async fn user_teams(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath((org_id, user_id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<ApiResponse<Vec<TeamMembership>>> {
    let teams = state.team_service.user_teams(&auth, org_id, user_id).await?;
    Ok(ApiResponse::ok("User teams fetched successfully", teams))
}
