//! Document upload, versioning, download and privacy enforcement.

use std::collections::HashSet;
use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use complyhub_auth::rbac::{CallerRoles, policies};
use complyhub_core::error::AppError;
use complyhub_database::repositories::document::DocumentRepository;
use complyhub_database::repositories::folder::FolderRepository;
use complyhub_database::repositories::program::ProgramRepository;
use complyhub_database::repositories::standard::StandardRepository;
use complyhub_database::repositories::team::TeamRepository;
use complyhub_entity::document::{
    CreateDocument, Document, DocumentFilter, DocumentType, DocumentVersion, DocumentWithVersions,
    NewVersion, UpdateDocument,
};
use complyhub_entity::folder::Folder;
use complyhub_storage::StorageManager;
use complyhub_storage::keys::document_key;
use complyhub_storage::manager::Download;

use super::visibility::can_view;
use crate::access::{AccessResolver, Scope};
use crate::catalogue;
use crate::context::RequestContext;

/// A file received from a multipart upload.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl UploadedFile {
    /// Lowercased extension of the original file name.
    pub fn extension(&self) -> Option<String> {
        std::path::Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
    }
}

/// Metadata accompanying a new document upload.
#[derive(Debug, Clone, Default)]
pub struct UploadDocument {
    pub name: Option<String>,
    pub document_type: Option<DocumentType>,
    /// Defaults to private.
    pub is_private: Option<bool>,
    pub associated_programs: Vec<Uuid>,
    pub associated_standards: Vec<Uuid>,
}

/// Document listing filters inside the active organization.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentQuery {
    pub folder_id: Option<Uuid>,
    pub team_id: Option<Uuid>,
}

/// Result of uploading a document or a version.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedDocument {
    #[serde(flatten)]
    pub document: Document,
    pub current_version: DocumentVersion,
}

/// How to deliver the current version's bytes.
pub struct DocumentDownload {
    pub document: Document,
    pub version: DocumentVersion,
    pub download: Download,
}

/// Decide a document's type from an explicit value or the file extension.
pub fn resolve_type(
    explicit: Option<DocumentType>,
    file: &UploadedFile,
) -> Result<DocumentType, AppError> {
    if let Some(t) = explicit {
        return Ok(t);
    }
    file.extension()
        .and_then(|ext| ext.parse::<DocumentType>().ok())
        .ok_or_else(|| AppError::bad_request("Only docx, pdf and xlsx files are accepted"))
}

/// Manages documents and their versions.
#[derive(Debug, Clone)]
pub struct DocumentService {
    document_repo: Arc<DocumentRepository>,
    folder_repo: Arc<FolderRepository>,
    team_repo: Arc<TeamRepository>,
    program_repo: Arc<ProgramRepository>,
    standard_repo: Arc<StandardRepository>,
    access: Arc<AccessResolver>,
    storage: Arc<StorageManager>,
}

impl DocumentService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        document_repo: Arc<DocumentRepository>,
        folder_repo: Arc<FolderRepository>,
        team_repo: Arc<TeamRepository>,
        program_repo: Arc<ProgramRepository>,
        standard_repo: Arc<StandardRepository>,
        access: Arc<AccessResolver>,
        storage: Arc<StorageManager>,
    ) -> Self {
        Self {
            document_repo,
            folder_repo,
            team_repo,
            program_repo,
            standard_repo,
            access,
            storage,
        }
    }

    /// Upload a file as a new document in `folder_id`. The object is stored
    /// first; if the database write fails it is removed again.
    pub async fn upload(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
        meta: UploadDocument,
        file: UploadedFile,
    ) -> Result<UploadedDocument, AppError> {
        let folder = self.find_folder(folder_id).await?;
        self.access
            .require_team_member(ctx, folder.organization_id, folder.team_id)
            .await?;

        let document_type = resolve_type(meta.document_type, &file)?;
        let name = meta
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| file.file_name.clone());
        catalogue::ensure_programs_exist(&self.program_repo, &meta.associated_programs).await?;
        catalogue::ensure_standards_exist(&self.standard_repo, &meta.associated_standards).await?;

        let key = document_key(
            folder.organization_id,
            folder.team_id,
            folder.id,
            document_type.as_str(),
        );
        let size_bytes = file.data.len() as i64;
        self.storage
            .put(&key, file.data, document_type.content_type())
            .await?;

        let created = self
            .document_repo
            .create_with_version(&CreateDocument {
                name,
                document_type,
                is_private: meta.is_private.unwrap_or(true),
                organization_id: folder.organization_id,
                team_id: folder.team_id,
                folder_id: folder.id,
                associated_programs: meta.associated_programs,
                associated_standards: meta.associated_standards,
                created_by: ctx.user_id,
                first_version: NewVersion {
                    storage_key: key.clone(),
                    size_bytes,
                    content_type: document_type.content_type().to_string(),
                    created_by: ctx.user_id,
                },
            })
            .await;

        let (document, current_version) = match created {
            Ok(pair) => pair,
            Err(e) => {
                warn!(key = %key, error = %e, "Document insert failed, removing uploaded object");
                self.storage.discard(&key).await;
                return Err(e);
            }
        };

        info!(
            document_id = %document.id,
            folder_id = %folder.id,
            user_id = %ctx.user_id,
            bytes = size_bytes,
            "Document uploaded"
        );
        Ok(UploadedDocument {
            document,
            current_version,
        })
    }

    /// Documents of a folder, or of a team, in the caller's organization,
    /// filtered by privacy.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        query: DocumentQuery,
    ) -> Result<Vec<Document>, AppError> {
        let org_id = match query.folder_id {
            Some(folder_id) => self.find_folder(folder_id).await?.organization_id,
            None => ctx.require_organization()?,
        };
        let roles = self
            .access
            .require(ctx, &policies::DOCUMENT_LIST, Scope::Organization(org_id))
            .await?;

        let filter = match (query.folder_id, query.team_id) {
            (Some(folder_id), _) => DocumentFilter::Folder(folder_id),
            (None, Some(team_id)) => DocumentFilter::Team(team_id),
            (None, None) => DocumentFilter::Organization(org_id),
        };
        let documents = self.document_repo.find_all(filter).await?;
        self.visible(ctx, org_id, roles, documents).await
    }

    /// Documents of one folder, filtered by privacy.
    pub async fn list_in_folder(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
    ) -> Result<Vec<Document>, AppError> {
        let folder = self.find_folder(folder_id).await?;
        let roles = self
            .access
            .require_team_member(ctx, folder.organization_id, folder.team_id)
            .await?;
        let documents = self
            .document_repo
            .find_all(DocumentFilter::Folder(folder.id))
            .await?;
        self.visible(ctx, folder.organization_id, roles, documents)
            .await
    }

    /// A document with its version history.
    pub async fn get(
        &self,
        ctx: &RequestContext,
        id: Uuid,
    ) -> Result<DocumentWithVersions, AppError> {
        let document = self.viewable(ctx, id).await?.0;
        let versions = self.document_repo.list_versions(id).await?;
        Ok(DocumentWithVersions { document, versions })
    }

    /// Patch document metadata. Allowed for its creator, org owners/admins
    /// and the team leader.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        data: UpdateDocument,
    ) -> Result<Document, AppError> {
        let (document, roles) = self.viewable(ctx, id).await?;
        self.require_writer(ctx, &document, &roles)?;

        if data.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(AppError::validation("Document name cannot be empty"));
        }
        catalogue::ensure_programs_exist(
            &self.program_repo,
            data.associated_programs.as_deref().unwrap_or_default(),
        )
        .await?;
        catalogue::ensure_standards_exist(
            &self.standard_repo,
            data.associated_standards.as_deref().unwrap_or_default(),
        )
        .await?;

        let document = self.document_repo.update(id, &data).await?;
        info!(document_id = %id, user_id = %ctx.user_id, "Document updated");
        Ok(document)
    }

    /// Delete the document record and every stored version.
    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> Result<(), AppError> {
        let (document, roles) = self.viewable(ctx, id).await?;
        if document.created_by != ctx.user_id {
            complyhub_auth::rbac::authorize(&policies::DOCUMENT_DELETE, &roles)?;
        }

        let keys = self
            .document_repo
            .delete(id)
            .await?
            .ok_or_else(|| AppError::not_found("Document not found"))?;
        let removed = self.storage.discard_all(&keys).await;
        info!(
            document_id = %id,
            user_id = %ctx.user_id,
            versions = keys.len(),
            objects_removed = removed,
            "Document deleted"
        );
        Ok(())
    }

    pub async fn versions(
        &self,
        ctx: &RequestContext,
        id: Uuid,
    ) -> Result<Vec<DocumentVersion>, AppError> {
        self.viewable(ctx, id).await?;
        self.document_repo.list_versions(id).await
    }

    /// Upload a new current version. The file must have the document's
    /// format.
    pub async fn add_version(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        file: UploadedFile,
    ) -> Result<UploadedDocument, AppError> {
        let (document, roles) = self.viewable(ctx, id).await?;
        self.require_writer(ctx, &document, &roles)?;

        if let Some(ext) = file.extension() {
            if ext != document.document_type.as_str() {
                return Err(AppError::bad_request(format!(
                    "New version must be a {} file",
                    document.document_type
                )));
            }
        }

        let key = document_key(
            document.organization_id,
            document.team_id,
            document.folder_id,
            document.document_type.as_str(),
        );
        let size_bytes = file.data.len() as i64;
        let content_type = document.document_type.content_type();
        self.storage.put(&key, file.data, content_type).await?;

        let version = self
            .document_repo
            .add_version(
                id,
                &NewVersion {
                    storage_key: key.clone(),
                    size_bytes,
                    content_type: content_type.to_string(),
                    created_by: ctx.user_id,
                },
            )
            .await;
        let current_version = match version {
            Ok(v) => v,
            Err(e) => {
                warn!(key = %key, error = %e, "Version insert failed, removing uploaded object");
                self.storage.discard(&key).await;
                return Err(e);
            }
        };

        info!(
            document_id = %id,
            version = %current_version.version_number,
            user_id = %ctx.user_id,
            "Document version added"
        );
        let document = self
            .document_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Document not found"))?;
        Ok(UploadedDocument {
            document,
            current_version,
        })
    }

    /// Signed URL or byte stream for the current version.
    pub async fn download(&self, ctx: &RequestContext, id: Uuid) -> Result<DocumentDownload, AppError> {
        let (document, _) = self.viewable(ctx, id).await?;
        let version = self
            .document_repo
            .current_version(id)
            .await?
            .ok_or_else(|| AppError::not_found("No current version found"))?;
        let download = self.storage.download(&version.storage_key).await?;
        Ok(DocumentDownload {
            document,
            version,
            download,
        })
    }

    // ── Helpers ─────────────────────────────────────────────────

    /// Load a document and check the caller may see it.
    async fn viewable(
        &self,
        ctx: &RequestContext,
        id: Uuid,
    ) -> Result<(Document, CallerRoles), AppError> {
        let document = self
            .document_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Document not found"))?;
        let roles = self
            .access
            .caller_roles(
                ctx,
                Scope::Team {
                    organization_id: document.organization_id,
                    team_id: document.team_id,
                },
            )
            .await?;
        if !can_view(ctx.user_id, &roles, !roles.team.is_empty(), &document) {
            return Err(AppError::authorization(
                "You do not have access to this document",
            ));
        }
        Ok((document, roles))
    }

    fn require_writer(
        &self,
        ctx: &RequestContext,
        document: &Document,
        roles: &CallerRoles,
    ) -> Result<(), AppError> {
        if document.created_by == ctx.user_id {
            return Ok(());
        }
        complyhub_auth::rbac::authorize(&policies::DOCUMENT_WRITE, roles)
    }

    async fn visible(
        &self,
        ctx: &RequestContext,
        org_id: Uuid,
        roles: CallerRoles,
        documents: Vec<Document>,
    ) -> Result<Vec<Document>, AppError> {
        let teams: HashSet<Uuid> = self
            .team_repo
            .find_memberships(ctx.user_id, Some(org_id))
            .await?
            .into_iter()
            .map(|m| m.team_id)
            .collect();
        Ok(documents
            .into_iter()
            .filter(|d| d.organization_id == org_id)
            .filter(|d| can_view(ctx.user_id, &roles, teams.contains(&d.team_id), d))
            .collect())
    }

    async fn find_folder(&self, id: Uuid) -> Result<Folder, AppError> {
        self.folder_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Folder not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str) -> UploadedFile {
        UploadedFile {
            file_name: name.into(),
            content_type: None,
            data: Bytes::from_static(b"x"),
        }
    }

    #[test]
    fn type_comes_from_extension() {
        assert_eq!(resolve_type(None, &file("Policy.PDF")).expect("pdf"), DocumentType::Pdf);
        assert_eq!(resolve_type(None, &file("risks.xlsx")).expect("xlsx"), DocumentType::Xlsx);
        assert!(resolve_type(None, &file("notes.txt")).is_err());
        assert!(resolve_type(None, &file("README")).is_err());
    }

    #[test]
    fn explicit_type_wins() {
        let t = resolve_type(Some(DocumentType::Docx), &file("scan.bin")).expect("explicit");
        assert_eq!(t, DocumentType::Docx);
    }
}
