//! Object key layout for stored document versions.

use uuid::Uuid;

/// Key for a newly uploaded document version:
/// `documents/{org}/{team}/{folder}/{uuid}.{ext}`.
pub fn document_key(organization_id: Uuid, team_id: Uuid, folder_id: Uuid, extension: &str) -> String {
    format!(
        "documents/{organization_id}/{team_id}/{folder_id}/{}.{}",
        Uuid::new_v4(),
        extension.trim_start_matches('.').to_ascii_lowercase()
    )
}
