//! Role enumerations for the three access scopes.
//!
//! A user holds a set of [`SiteRole`]s platform-wide, a non-empty set of
//! [`OrgRole`]s in each organization they belong to, and exactly one
//! [`TeamRole`] in each team.

use serde::{Deserialize, Serialize};

/// Platform-wide role, independent of any organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "site_role", rename_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub enum SiteRole {
    /// Passes every role check.
    SiteAdmin,
    /// Manages the compliance catalogue and templates.
    SiteModerator,
    /// Default role of every registered user.
    SiteUser,
}

text_enum!(SiteRole, "site role", {
    SiteAdmin => "siteAdmin",
    SiteModerator => "siteModerator",
    SiteUser => "siteUser",
});

/// Role held within one organization's member list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "org_role", rename_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub enum OrgRole {
    /// Created the organization or was granted ownership.
    OrgOwner,
    /// Manages members, teams and settings.
    OrgAdmin,
    /// Leads at least one team in the organization.
    TeamLeader,
    /// Regular member.
    Employee,
}

text_enum!(OrgRole, "organization role", {
    OrgOwner => "orgOwner",
    OrgAdmin => "orgAdmin",
    TeamLeader => "teamLeader",
    Employee => "employee",
});

impl OrgRole {
    /// Owner or admin of the organization.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::OrgOwner | Self::OrgAdmin)
    }
}

/// Role held within one team's member list.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "team_role", rename_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub enum TeamRole {
    /// Leads the team.
    TeamLeader,
    /// Regular team member.
    #[default]
    Employee,
}

text_enum!(TeamRole, "team role", {
    TeamLeader => "teamLeader",
    Employee => "employee",
});

impl TeamRole {
    /// Organization role implied by holding this team role.
    pub fn implied_org_role(&self) -> OrgRole {
        match self {
            Self::TeamLeader => OrgRole::TeamLeader,
            Self::Employee => OrgRole::Employee,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_are_camel_case() {
        assert_eq!(SiteRole::SiteAdmin.as_str(), "siteAdmin");
        assert_eq!(OrgRole::OrgOwner.to_string(), "orgOwner");
        assert_eq!(
            serde_json::to_string(&TeamRole::TeamLeader).expect("serialize"),
            "\"teamLeader\""
        );
    }

    #[test]
    fn from_str_is_exact() {
        assert_eq!("orgAdmin".parse::<OrgRole>().ok(), Some(OrgRole::OrgAdmin));
        assert!("ORGADMIN".parse::<OrgRole>().is_err());
        let err = "manager".parse::<TeamRole>().expect_err("unknown role");
        assert!(err.message.contains("teamLeader, employee"));
    }

    #[test]
    fn admin_roles() {
        assert!(OrgRole::OrgOwner.is_admin());
        assert!(OrgRole::OrgAdmin.is_admin());
        assert!(!OrgRole::TeamLeader.is_admin());
        assert_eq!(TeamRole::TeamLeader.implied_org_role(), OrgRole::TeamLeader);
        assert_eq!(TeamRole::default(), TeamRole::Employee);
    }
}
