//! Document handlers: multipart uploads, versions and downloads.

use axum::body::Body;
use axum::extract::{Multipart, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use uuid::Uuid;

use complyhub_core::error::AppError;
use complyhub_entity::document::{
    Document, DocumentType, DocumentVersion, DocumentWithVersions, UpdateDocument,
};
use complyhub_service::document::{DocumentQuery, UploadDocument, UploadedDocument, UploadedFile};
use complyhub_storage::manager::Download;

use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::{ApiJson, ApiPath, ApiQuery, AuthUser};
use crate::state::AppState;

/// Fields of an upload form.
#[derive(Debug, Default)]
struct UploadForm {
    file: Option<UploadedFile>,
    meta: UploadDocument,
}

fn multipart_error(e: impl std::fmt::Display) -> AppError {
    AppError::bad_request(format!("Multipart error: {e}"))
}

/// Program and standard ids arrive either as a JSON array or as a
/// comma-separated list.
fn parse_id_list(field: &str, raw: &str) -> Result<Vec<Uuid>, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    if raw.starts_with('[') {
        return serde_json::from_str(raw)
            .map_err(|_| AppError::bad_request(format!("Invalid {field}")));
    }
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| Uuid::parse_str(s).map_err(|_| AppError::bad_request(format!("Invalid {field}"))))
        .collect()
}

fn parse_bool(field: &str, raw: &str) -> Result<bool, AppError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(AppError::bad_request(format!("Invalid {field}"))),
    }
}

async fn read_form(mut multipart: Multipart, max_bytes: usize) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or("").to_string();
        if name == "file" {
            let file_name = field.file_name().unwrap_or("upload").to_string();
            let content_type = field.content_type().map(String::from);
            let data = field.bytes().await.map_err(multipart_error)?;
            if data.len() > max_bytes {
                return Err(AppError::payload_too_large(format!(
                    "File exceeds the maximum upload size of {max_bytes} bytes"
                )));
            }
            form.file = Some(UploadedFile {
                file_name,
                content_type,
                data,
            });
            continue;
        }

        let text = field.text().await.map_err(multipart_error)?;
        match name.as_str() {
            "name" => form.meta.name = Some(text),
            "type" if !text.trim().is_empty() => {
                let kind = text
                    .trim()
                    .to_ascii_lowercase()
                    .parse::<DocumentType>()
                    .map_err(|_| {
                        AppError::bad_request("Only docx, pdf and xlsx files are accepted")
                    })?;
                form.meta.document_type = Some(kind);
            }
            "isPrivate" => form.meta.is_private = Some(parse_bool("isPrivate", &text)?),
            "associatedPrograms" => {
                form.meta.associated_programs = parse_id_list("associatedPrograms", &text)?;
            }
            "associatedStandards" => {
                form.meta.associated_standards = parse_id_list("associatedStandards", &text)?;
            }
            _ => {}
        }
    }

    Ok(form)
}

/// POST /api/v1/folders/{id}/documents
pub async fn upload_document(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(folder_id): ApiPath<Uuid>,
    multipart: Multipart,
) -> ApiResult<ApiResponse<UploadedDocument>> {
    let form = read_form(multipart, state.storage_manager.max_upload_size_bytes()).await?;
    let file = form
        .file
        .ok_or_else(|| AppError::bad_request("File is required"))?;

    let uploaded = state
        .document_service
        .upload(&auth, folder_id, form.meta, file)
        .await?;
    Ok(ApiResponse::created("Document uploaded successfully", uploaded))
}

/// GET /api/v1/folders/{id}/documents
pub async fn list_folder_documents(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(folder_id): ApiPath<Uuid>,
) -> ApiResult<ApiResponse<Vec<Document>>> {
    let documents = state.document_service.list_in_folder(&auth, folder_id).await?;
    Ok(ApiResponse::ok("Documents fetched successfully", documents))
}

/// GET /api/v1/documents?folderId=&teamId=
pub async fn list_documents(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<DocumentQuery>,
) -> ApiResult<ApiResponse<Vec<Document>>> {
    let documents = state.document_service.list(&auth, query).await?;
    Ok(ApiResponse::ok("Documents fetched successfully", documents))
}

/// GET /api/v1/documents/{id}
pub async fn get_document(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<ApiResponse<DocumentWithVersions>> {
    let document = state.document_service.get(&auth, id).await?;
    Ok(ApiResponse::ok("Document fetched successfully", document))
}

/// PATCH /api/v1/documents/{id}
pub async fn update_document(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateDocument>,
) -> ApiResult<ApiResponse<Document>> {
    let document = state.document_service.update(&auth, id, req).await?;
    Ok(ApiResponse::ok("Document updated successfully", document))
}

/// DELETE /api/v1/documents/{id}
pub async fn delete_document(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<ApiResponse<serde_json::Value>> {
    state.document_service.delete(&auth, id).await?;
    Ok(ApiResponse::message("Document deleted successfully"))
}

/// GET /api/v1/documents/{id}/versions
pub async fn list_versions(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<ApiResponse<Vec<DocumentVersion>>> {
    let versions = state.document_service.versions(&auth, id).await?;
    Ok(ApiResponse::ok("Document versions fetched successfully", versions))
}

/// POST /api/v1/documents/{id}/versions
pub async fn add_version(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    multipart: Multipart,
) -> ApiResult<ApiResponse<UploadedDocument>> {
    let form = read_form(multipart, state.storage_manager.max_upload_size_bytes()).await?;
    let file = form
        .file
        .ok_or_else(|| AppError::bad_request("File is required"))?;

    let uploaded = state.document_service.add_version(&auth, id, file).await?;
    Ok(ApiResponse::created("New version uploaded successfully", uploaded))
}

/// GET /api/v1/documents/{id}/download
///
/// Redirects to a signed URL when the backend offers one, otherwise
/// streams the current version.
pub async fn download_document(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Response> {
    let download = state.document_service.download(&auth, id).await?;

    let response = match download.download {
        Download::Redirect(url) => Response::builder()
            .status(StatusCode::TEMPORARY_REDIRECT)
            .header(header::LOCATION, url)
            .body(Body::empty()),
        Download::Stream(stream) => {
            let filename = format!(
                "{}.{}",
                download.document.name.replace('"', ""),
                download.document.document_type.as_str()
            );
            Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, download.version.content_type)
                .header(
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{filename}\""),
                )
                .header(header::CONTENT_LENGTH, download.version.size_bytes)
                .body(Body::from_stream(stream))
        }
    }
    .map_err(|e| AppError::internal(format!("Response build failed: {e}")))?;

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_lists_accept_json_and_csv() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let json = format!("[\"{a}\",\"{b}\"]");
        assert_eq!(parse_id_list("ids", &json).unwrap(), vec![a, b]);

        let csv = format!("{a}, {b}");
        assert_eq!(parse_id_list("ids", &csv).unwrap(), vec![a, b]);

        assert!(parse_id_list("ids", "  ").unwrap().is_empty());
        assert!(parse_id_list("ids", "nope").is_err());
    }

    #[test]
    fn booleans_from_form_text() {
        assert!(parse_bool("isPrivate", "TRUE").unwrap());
        assert!(!parse_bool("isPrivate", "0").unwrap());
        assert!(parse_bool("isPrivate", "maybe").is_err());
    }
}
