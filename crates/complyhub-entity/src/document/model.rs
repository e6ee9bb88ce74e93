//! Document entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::version::{DocumentVersion, NewVersion};

/// Accepted document file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "document_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Docx,
    Pdf,
    Xlsx,
}

text_enum!(DocumentType, "document type", {
    Docx => "docx",
    Pdf => "pdf",
    Xlsx => "xlsx",
});

impl DocumentType {
    /// MIME type of files of this format.
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Self::Pdf => "application/pdf",
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        }
    }
}

/// A document in a folder. Its file content lives in [`DocumentVersion`]s.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub document_type: DocumentType,
    /// Private documents are visible to their creator and org owners/admins only.
    pub is_private: bool,
    pub organization_id: Uuid,
    pub team_id: Uuid,
    pub folder_id: Uuid,
    pub associated_programs: Vec<Uuid>,
    pub associated_standards: Vec<Uuid>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A document with its version history, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentWithVersions {
    #[serde(flatten)]
    pub document: Document,
    pub versions: Vec<DocumentVersion>,
}

impl DocumentWithVersions {
    /// The version flagged current, if any.
    pub fn current_version(&self) -> Option<&DocumentVersion> {
        self.versions.iter().find(|v| v.is_current)
    }
}

/// Data required to create a document and its first version.
#[derive(Debug, Clone)]
pub struct CreateDocument {
    pub name: String,
    pub document_type: DocumentType,
    pub is_private: bool,
    pub organization_id: Uuid,
    pub team_id: Uuid,
    pub folder_id: Uuid,
    pub associated_programs: Vec<Uuid>,
    pub associated_standards: Vec<Uuid>,
    pub created_by: Uuid,
    pub first_version: NewVersion,
}

/// Whitelisted document fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDocument {
    pub name: Option<String>,
    pub is_private: Option<bool>,
    pub associated_programs: Option<Vec<Uuid>>,
    pub associated_standards: Option<Vec<Uuid>>,
}

/// Document listing scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFilter {
    Folder(Uuid),
    Team(Uuid),
    Organization(Uuid),
}
