//! Document version entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One uploaded file revision of a document.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DocumentVersion {
    pub id: Uuid,
    pub document_id: Uuid,
    /// `v1.0`, `v2.0`, ...
    pub version_number: String,
    /// Object key in the storage provider.
    pub storage_key: String,
    pub size_bytes: i64,
    pub content_type: String,
    /// At most one version per document is current.
    pub is_current: bool,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Data for a version about to be inserted.
#[derive(Debug, Clone)]
pub struct NewVersion {
    pub storage_key: String,
    pub size_bytes: i64,
    pub content_type: String,
    pub created_by: Uuid,
}

/// Label of the `n`th version of a document (1-based).
pub fn version_label(n: i64) -> String {
    format!("v{n}.0")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_count_from_one() {
        assert_eq!(version_label(1), "v1.0");
        assert_eq!(version_label(12), "v12.0");
    }
}
