//! Resolves a caller's roles for the organization/team a request targets
//! and runs them through the shared authorizer.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use complyhub_auth::rbac::{CallerRoles, RoleRequirement, authorize};
use complyhub_core::error::AppError;
use complyhub_database::repositories::organization::OrganizationRepository;
use complyhub_database::repositories::team::TeamRepository;

use crate::context::RequestContext;

/// What a request addresses, for role lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// No organization; only site roles count.
    Site,
    /// One organization.
    Organization(Uuid),
    /// One team of one organization.
    Team { organization_id: Uuid, team_id: Uuid },
    /// An organization, with the caller's roles in any of its teams.
    AnyTeamIn(Uuid),
}

/// Loads membership rows and authorizes requests against them.
#[derive(Debug, Clone)]
pub struct AccessResolver {
    org_repo: Arc<OrganizationRepository>,
    team_repo: Arc<TeamRepository>,
}

impl AccessResolver {
    pub fn new(org_repo: Arc<OrganizationRepository>, team_repo: Arc<TeamRepository>) -> Self {
        Self {
            org_repo,
            team_repo,
        }
    }

    /// The caller's roles in `scope`. Non-members get empty role lists.
    pub async fn caller_roles(
        &self,
        ctx: &RequestContext,
        scope: Scope,
    ) -> Result<CallerRoles, AppError> {
        let mut roles = CallerRoles::site_only(ctx.site_roles.clone());

        let organization_id = match scope {
            Scope::Site => return Ok(roles),
            Scope::Organization(id) | Scope::AnyTeamIn(id) => id,
            Scope::Team {
                organization_id, ..
            } => organization_id,
        };

        if let Some(member) = self.org_repo.find_member(organization_id, ctx.user_id).await? {
            roles.org = member.roles;
        }

        match scope {
            Scope::Team { team_id, .. } => {
                if let Some(member) = self.team_repo.find_member(team_id, ctx.user_id).await? {
                    roles.team = vec![member.role];
                }
            }
            Scope::AnyTeamIn(id) => {
                roles.team = self
                    .team_repo
                    .find_memberships(ctx.user_id, Some(id))
                    .await?
                    .into_iter()
                    .map(|m| m.role)
                    .collect();
            }
            _ => {}
        }

        Ok(roles)
    }

    /// Authorize `ctx` for `requirement` in `scope`, returning the roles
    /// that were checked. Memberships are only loaded when the requirement
    /// names organization or team roles and the caller is not a site admin.
    pub async fn require(
        &self,
        ctx: &RequestContext,
        requirement: &RoleRequirement,
        scope: Scope,
    ) -> Result<CallerRoles, AppError> {
        let roles = if ctx.is_site_admin() || !requirement.needs_membership() {
            CallerRoles::site_only(ctx.site_roles.clone())
        } else {
            self.caller_roles(ctx, scope).await?
        };

        authorize(requirement, &roles).inspect_err(|_| {
            debug!(user_id = %ctx.user_id, ?scope, "Access denied");
        })?;
        Ok(roles)
    }

    /// Require membership of both the organization and the team. Org
    /// owners and admins are let through without joining the team.
    pub async fn require_team_member(
        &self,
        ctx: &RequestContext,
        organization_id: Uuid,
        team_id: Uuid,
    ) -> Result<CallerRoles, AppError> {
        let roles = self
            .caller_roles(
                ctx,
                Scope::Team {
                    organization_id,
                    team_id,
                },
            )
            .await?;
        if !is_team_member(&roles) {
            debug!(user_id = %ctx.user_id, %team_id, "Team access denied");
            return Err(AppError::authorization(
                "You need to be a member of this organization and team to access this resource",
            ));
        }
        Ok(roles)
    }
}

/// Site admin, org owner/admin, or a member of the organization and the
/// team at once.
pub fn is_team_member(roles: &CallerRoles) -> bool {
    roles.is_site_admin() || roles.is_org_admin() || (!roles.org.is_empty() && !roles.team.is_empty())
}
