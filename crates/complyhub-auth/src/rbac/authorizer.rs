//! Multi-scope role check shared by every endpoint.
//!
//! A requirement lists acceptable roles per scope. The caller passes when
//! they hold any listed site role, or any listed organization role in the
//! target organization, or any listed team role in the target team. A site
//! administrator always passes, and a requirement naming no roles at all
//! admits any authenticated caller.

use complyhub_core::error::AppError;
use complyhub_entity::role::{OrgRole, SiteRole, TeamRole};

/// Roles that satisfy an endpoint, per scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleRequirement {
    pub site: &'static [SiteRole],
    pub org: &'static [OrgRole],
    pub team: &'static [TeamRole],
}

impl RoleRequirement {
    /// Any authenticated caller.
    pub const AUTHENTICATED: Self = Self::new(&[], &[], &[]);

    pub const fn new(
        site: &'static [SiteRole],
        org: &'static [OrgRole],
        team: &'static [TeamRole],
    ) -> Self {
        Self { site, org, team }
    }

    pub const fn site(site: &'static [SiteRole]) -> Self {
        Self::new(site, &[], &[])
    }

    /// True when no scope lists a role.
    pub fn is_open(&self) -> bool {
        self.site.is_empty() && self.org.is_empty() && self.team.is_empty()
    }

    /// Whether the requirement names any organization or team roles, in
    /// which case the caller's memberships have to be looked up.
    pub fn needs_membership(&self) -> bool {
        !self.org.is_empty() || !self.team.is_empty()
    }

    /// Whether `caller` satisfies the requirement.
    pub fn allows(&self, caller: &CallerRoles) -> bool {
        if caller.site.contains(&SiteRole::SiteAdmin) || self.is_open() {
            return true;
        }
        self.site.iter().any(|r| caller.site.contains(r))
            || self.org.iter().any(|r| caller.org.contains(r))
            || self.team.iter().any(|r| caller.team.contains(r))
    }

    fn describe(&self) -> String {
        self.site
            .iter()
            .map(SiteRole::as_str)
            .chain(self.org.iter().map(OrgRole::as_str))
            .chain(self.team.iter().map(TeamRole::as_str))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// The roles a caller holds for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallerRoles {
    pub site: Vec<SiteRole>,
    /// Roles in the target organization, empty when not a member.
    pub org: Vec<OrgRole>,
    /// Roles in the target team, empty when not a member.
    pub team: Vec<TeamRole>,
}

impl CallerRoles {
    pub fn site_only(site: Vec<SiteRole>) -> Self {
        Self {
            site,
            ..Self::default()
        }
    }

    pub fn is_site_admin(&self) -> bool {
        self.site.contains(&SiteRole::SiteAdmin)
    }

    pub fn has_site_role(&self, role: SiteRole) -> bool {
        self.site.contains(&role)
    }

    pub fn has_org_role(&self, role: OrgRole) -> bool {
        self.org.contains(&role)
    }

    /// Org owner or admin.
    pub fn is_org_admin(&self) -> bool {
        self.org.iter().any(OrgRole::is_admin)
    }
}

/// Check `caller` against `requirement`, returning a 403 error that names
/// the sufficient roles on denial.
pub fn authorize(requirement: &RoleRequirement, caller: &CallerRoles) -> Result<(), AppError> {
    if requirement.allows(caller) {
        return Ok(());
    }
    tracing::debug!(required = %requirement.describe(), "Role check denied");
    Err(AppError::authorization(format!(
        "You need one of the following roles to access this resource: {}",
        requirement.describe()
    )))
}

#[cfg(test)]
mod tests {
    use complyhub_core::error::ErrorKind;

    use super::*;
    use crate::rbac::policies;

    fn caller(site: &[SiteRole], org: &[OrgRole], team: &[TeamRole]) -> CallerRoles {
        CallerRoles {
            site: site.to_vec(),
            org: org.to_vec(),
            team: team.to_vec(),
        }
    }

    #[test]
    fn site_admin_passes_everything() {
        let admin = caller(&[SiteRole::SiteAdmin], &[], &[]);
        assert!(authorize(&policies::ORG_DELETE, &admin).is_ok());
        assert!(authorize(&policies::TEAM_DELETE, &admin).is_ok());
        assert!(authorize(&policies::PROGRAM_WRITE, &admin).is_ok());
    }

    #[test]
    fn any_scope_is_enough() {
        let leader = caller(&[SiteRole::SiteUser], &[OrgRole::Employee], &[TeamRole::TeamLeader]);
        assert!(authorize(&policies::TEAM_MANAGE, &leader).is_ok());

        let org_admin = caller(&[SiteRole::SiteUser], &[OrgRole::OrgAdmin], &[]);
        assert!(authorize(&policies::TEAM_MANAGE, &org_admin).is_ok());

        let moderator = caller(&[SiteRole::SiteModerator], &[], &[]);
        assert!(authorize(&policies::TEAM_MANAGE, &moderator).is_ok());
    }

    #[test]
    fn unlisted_scope_grants_nothing() {
        // team delete lists no team roles, so a team member gets no credit
        let employee = caller(&[SiteRole::SiteUser], &[OrgRole::Employee], &[TeamRole::Employee]);
        assert!(authorize(&policies::TEAM_READ, &employee).is_ok());

        let err = authorize(&policies::TEAM_DELETE, &employee).expect_err("denied");
        assert_eq!(err.kind, ErrorKind::Authorization);
        assert_eq!(
            err.message,
            "You need one of the following roles to access this resource: \
             siteAdmin, siteModerator, orgOwner, orgAdmin"
        );
    }

    #[test]
    fn absent_caller_is_denied() {
        let stranger = caller(&[SiteRole::SiteUser], &[], &[]);
        assert!(authorize(&policies::ORG_READ, &stranger).is_err());
        assert!(authorize(&policies::TEAM_READ, &stranger).is_err());
    }

    #[test]
    fn open_requirement_admits_anyone() {
        let nobody = CallerRoles::default();
        assert!(RoleRequirement::AUTHENTICATED.is_open());
        assert!(authorize(&RoleRequirement::AUTHENTICATED, &nobody).is_ok());
        assert!(!RoleRequirement::AUTHENTICATED.needs_membership());
    }

    #[test]
    fn site_only_requirements_skip_membership() {
        assert!(!policies::PROGRAM_READ.needs_membership());
        assert!(policies::TEAM_READ.needs_membership());
    }
}
