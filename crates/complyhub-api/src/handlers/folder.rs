//! Folder handlers.

use axum::extract::State;
use uuid::Uuid;

use complyhub_entity::folder::{Folder, UpdateFolder};
use complyhub_service::folder::{CreateFolderRequest, FolderQuery};

use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::{ApiJson, ApiPath, ApiQuery, AuthUser};
use crate::state::AppState;

/// POST /api/v1/folders
pub async fn create_folder(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(req): ApiJson<CreateFolderRequest>,
) -> ApiResult<ApiResponse<Folder>> {
    let folder = state.folder_service.create(&auth, req).await?;
    Ok(ApiResponse::created("Folder created successfully", folder))
}

/// GET /api/v1/folders?teamId=&organizationId=
pub async fn list_folders(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<FolderQuery>,
) -> ApiResult<ApiResponse<Vec<Folder>>> {
    let folders = state.folder_service.list(&auth, query).await?;
    Ok(ApiResponse::ok("Folders fetched successfully", folders))
}

/// GET /api/v1/folders/{id}
pub async fn get_folder(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<ApiResponse<Folder>> {
    let folder = state.folder_service.get(&auth, id).await?;
    Ok(ApiResponse::ok("Folder fetched successfully", folder))
}

/// PATCH /api/v1/folders/{id}
pub async fn update_folder(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateFolder>,
) -> ApiResult<ApiResponse<Folder>> {
    let folder = state.folder_service.update(&auth, id, req).await?;
    Ok(ApiResponse::ok("Folder updated successfully", folder))
}

/// DELETE /api/v1/folders/{id}
pub async fn delete_folder(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<ApiResponse<serde_json::Value>> {
    state.folder_service.delete(&auth, id).await?;
    Ok(ApiResponse::message("Folder deleted successfully"))
}
