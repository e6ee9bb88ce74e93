//! Profile and user administration handlers.

use axum::extract::State;
use uuid::Uuid;

use complyhub_entity::user::{UpdateProfile, User};

use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::{ApiJson, ApiPath, AuthUser};
use crate::state::AppState;

/// GET /api/v1/users
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<ApiResponse<Vec<User>>> {
    let users = state.user_service.list(&auth).await?;
    Ok(ApiResponse::ok("Users fetched successfully", users))
}

/// GET /api/v1/users/me
pub async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<ApiResponse<User>> {
    let user = state.user_service.me(&auth).await?;
    Ok(ApiResponse::ok("Current user fetched successfully", user))
}

/// PATCH /api/v1/users/me
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(req): ApiJson<UpdateProfile>,
) -> ApiResult<ApiResponse<User>> {
    let user = state.user_service.update_me(&auth, req).await?;
    Ok(ApiResponse::ok("Profile updated successfully", user))
}

/// GET /api/v1/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<ApiResponse<User>> {
    let user = state.user_service.get(&auth, id).await?;
    Ok(ApiResponse::ok("User fetched successfully", user))
}

/// DELETE /api/v1/users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<ApiResponse<serde_json::Value>> {
    state.user_service.delete(&auth, id).await?;
    Ok(ApiResponse::message("User deleted successfully"))
}
