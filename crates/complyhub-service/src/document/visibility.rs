//! Who may see which document.

use uuid::Uuid;

use complyhub_auth::rbac::CallerRoles;
use complyhub_entity::document::Document;

/// Whether a caller may read `doc`.
///
/// `org_roles` are the caller's roles in the document's organization and
/// `in_team` says whether they belong to its team. Private documents are
/// limited to their creator and org owners/admins.
pub fn can_view(user_id: Uuid, roles: &CallerRoles, in_team: bool, doc: &Document) -> bool {
    if roles.is_site_admin() || roles.is_org_admin() || doc.created_by == user_id {
        return true;
    }
    !doc.is_private && !roles.org.is_empty() && in_team
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use complyhub_entity::document::DocumentType;
    use complyhub_entity::role::{OrgRole, SiteRole, TeamRole};

    use super::*;

    fn doc(created_by: Uuid, is_private: bool) -> Document {
        Document {
            id: Uuid::new_v4(),
            name: "Access policy".into(),
            document_type: DocumentType::Pdf,
            is_private,
            organization_id: Uuid::new_v4(),
            team_id: Uuid::new_v4(),
            folder_id: Uuid::new_v4(),
            associated_programs: vec![],
            associated_standards: vec![],
            created_by,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn employee() -> CallerRoles {
        CallerRoles {
            site: vec![SiteRole::SiteUser],
            org: vec![OrgRole::Employee],
            team: vec![TeamRole::Employee],
        }
    }

    #[test]
    fn private_documents_hide_from_teammates() {
        let me = Uuid::new_v4();
        let author = Uuid::new_v4();
        assert!(!can_view(me, &employee(), true, &doc(author, true)));
        assert!(can_view(author, &employee(), true, &doc(author, true)));
    }

    #[test]
    fn org_admins_see_private_documents() {
        let admin = CallerRoles {
            org: vec![OrgRole::OrgAdmin],
            ..CallerRoles::default()
        };
        assert!(can_view(Uuid::new_v4(), &admin, false, &doc(Uuid::new_v4(), true)));
    }

    #[test]
    fn shared_documents_need_org_and_team() {
        let shared = doc(Uuid::new_v4(), false);
        let me = Uuid::new_v4();
        assert!(can_view(me, &employee(), true, &shared));
        assert!(!can_view(me, &employee(), false, &shared));

        let outsider = CallerRoles::site_only(vec![SiteRole::SiteUser]);
        assert!(!can_view(me, &outsider, true, &shared));
    }
}
