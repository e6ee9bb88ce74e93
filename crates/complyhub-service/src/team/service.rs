//! Team lifecycle, membership and leadership.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use complyhub_auth::rbac::{RoleRequirement, policies};
use complyhub_core::error::AppError;
use complyhub_database::repositories::organization::OrganizationRepository;
use complyhub_database::repositories::team::TeamRepository;
use complyhub_entity::role::TeamRole;
use complyhub_entity::team::{
    CreateTeam, Team, TeamDetails, TeamMemberView, TeamMembership, UpdateTeam,
};
use complyhub_storage::StorageManager;

use crate::access::{AccessResolver, Scope};
use crate::context::RequestContext;
use crate::validation::validate_request;

/// One user and the role they get in a team.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberAssignment {
    pub user_id: Uuid,
    #[serde(default)]
    pub role: TeamRole,
}

/// Request to create a team. Without `members` the creator joins as
/// leader when they belong to the organization.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTeamRequest {
    #[validate(length(min = 1, max = 200, message = "Team name is required"))]
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub members: Vec<MemberAssignment>,
}

/// Bulk member assignment.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignMembersRequest {
    pub members: Vec<MemberAssignment>,
}

/// Bulk member removal.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveMembersRequest {
    pub user_ids: Vec<Uuid>,
}

/// Target of a leadership transfer.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferLeadershipRequest {
    pub user_id: Uuid,
}

/// How many rows a bulk change affected.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkResult {
    pub affected: u64,
}

/// Manages teams inside organizations.
#[derive(Debug, Clone)]
pub struct TeamService {
    team_repo: Arc<TeamRepository>,
    org_repo: Arc<OrganizationRepository>,
    access: Arc<AccessResolver>,
    storage: Arc<StorageManager>,
}

impl TeamService {
    pub fn new(
        team_repo: Arc<TeamRepository>,
        org_repo: Arc<OrganizationRepository>,
        access: Arc<AccessResolver>,
        storage: Arc<StorageManager>,
    ) -> Self {
        Self {
            team_repo,
            org_repo,
            access,
            storage,
        }
    }

    pub async fn create(
        &self,
        ctx: &RequestContext,
        org_id: Uuid,
        req: CreateTeamRequest,
    ) -> Result<Team, AppError> {
        self.access
            .require(ctx, &policies::TEAM_CREATE, Scope::Organization(org_id))
            .await?;
        validate_request(&req)?;
        let name = req.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::bad_request("Team name is required"));
        }
        self.org_repo
            .find_by_id(org_id)
            .await?
            .ok_or_else(|| AppError::not_found("Organization not found"))?;

        let mut members: Vec<(Uuid, TeamRole)> =
            req.members.iter().map(|m| (m.user_id, m.role)).collect();
        if members.is_empty()
            && self.org_repo.find_member(org_id, ctx.user_id).await?.is_some()
        {
            members.push((ctx.user_id, TeamRole::TeamLeader));
        }

        let team = self
            .team_repo
            .create_with_members(&CreateTeam {
                organization_id: org_id,
                name,
                description: req.description,
                created_by: ctx.user_id,
                members,
            })
            .await?;

        info!(
            team_id = %team.id,
            organization_id = %org_id,
            user_id = %ctx.user_id,
            "Team created"
        );
        Ok(team)
    }

    /// Teams of an organization. Team roles held in any of its teams count.
    pub async fn list(&self, ctx: &RequestContext, org_id: Uuid) -> Result<Vec<Team>, AppError> {
        self.access
            .require(ctx, &policies::TEAM_READ, Scope::AnyTeamIn(org_id))
            .await?;
        self.team_repo.find_by_organization(org_id).await
    }

    /// A team with its members.
    pub async fn get(
        &self,
        ctx: &RequestContext,
        org_id: Uuid,
        team_id: Uuid,
    ) -> Result<TeamDetails, AppError> {
        let team = self
            .authorized_team(ctx, &policies::TEAM_READ, org_id, team_id)
            .await?;
        let members = self.team_repo.list_members(team.id).await?;
        Ok(TeamDetails { team, members })
    }

    pub async fn update(
        &self,
        ctx: &RequestContext,
        org_id: Uuid,
        team_id: Uuid,
        data: UpdateTeam,
    ) -> Result<Team, AppError> {
        let team = self
            .authorized_team(ctx, &policies::TEAM_MANAGE, org_id, team_id)
            .await?;
        if data.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(AppError::validation("Team name cannot be empty"));
        }
        let team = self.team_repo.update(team.id, &data).await?;
        info!(team_id = %team.id, user_id = %ctx.user_id, "Team updated");
        Ok(team)
    }

    /// Delete a team with its folders and documents, then remove the
    /// stored files.
    pub async fn delete(
        &self,
        ctx: &RequestContext,
        org_id: Uuid,
        team_id: Uuid,
    ) -> Result<(), AppError> {
        let team = self
            .authorized_team(ctx, &policies::TEAM_DELETE, org_id, team_id)
            .await?;
        let keys = self
            .team_repo
            .delete_cascade(team.id)
            .await?
            .ok_or_else(|| AppError::not_found("Team not found"))?;
        let removed = self.storage.discard_all(&keys).await;

        info!(
            team_id = %team.id,
            organization_id = %org_id,
            user_id = %ctx.user_id,
            objects_removed = removed,
            "Team deleted"
        );
        Ok(())
    }

    // ── Members ─────────────────────────────────────────────────

    /// Add one user. They join the organization too if they are not in it.
    pub async fn add_user(
        &self,
        ctx: &RequestContext,
        org_id: Uuid,
        team_id: Uuid,
        req: MemberAssignment,
    ) -> Result<(), AppError> {
        let team = self
            .authorized_team(ctx, &policies::TEAM_MANAGE, org_id, team_id)
            .await?;
        self.team_repo
            .add_member(&team, req.user_id, req.role)
            .await?;
        info!(
            team_id = %team.id,
            user_id = %req.user_id,
            role = %req.role,
            added_by = %ctx.user_id,
            "User added to team"
        );
        Ok(())
    }

    pub async fn remove_user(
        &self,
        ctx: &RequestContext,
        org_id: Uuid,
        team_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), AppError> {
        let team = self
            .authorized_team(ctx, &policies::TEAM_MANAGE, org_id, team_id)
            .await?;
        if self.team_repo.remove_members(&team, &[user_id]).await? == 0 {
            return Err(AppError::not_found("User is not a member of this team"));
        }
        info!(team_id = %team.id, user_id = %user_id, removed_by = %ctx.user_id, "User removed from team");
        Ok(())
    }

    pub async fn list_members(
        &self,
        ctx: &RequestContext,
        org_id: Uuid,
        team_id: Uuid,
    ) -> Result<Vec<TeamMemberView>, AppError> {
        let team = self
            .authorized_team(ctx, &policies::TEAM_MANAGE, org_id, team_id)
            .await?;
        self.team_repo.list_members(team.id).await
    }

    /// Add several users at once; existing members keep their role.
    pub async fn assign_members(
        &self,
        ctx: &RequestContext,
        org_id: Uuid,
        team_id: Uuid,
        req: AssignMembersRequest,
    ) -> Result<BulkResult, AppError> {
        let team = self
            .authorized_team(ctx, &policies::TEAM_MANAGE, org_id, team_id)
            .await?;
        if req.members.is_empty() {
            return Err(AppError::bad_request("At least one member is required"));
        }
        let members: Vec<_> = req.members.iter().map(|m| (m.user_id, m.role)).collect();
        let affected = self.team_repo.add_members(&team, &members).await?;
        info!(team_id = %team.id, added = affected, user_id = %ctx.user_id, "Team members assigned");
        Ok(BulkResult { affected })
    }

    pub async fn remove_members(
        &self,
        ctx: &RequestContext,
        org_id: Uuid,
        team_id: Uuid,
        req: RemoveMembersRequest,
    ) -> Result<BulkResult, AppError> {
        let team = self
            .authorized_team(ctx, &policies::TEAM_MANAGE, org_id, team_id)
            .await?;
        if req.user_ids.is_empty() {
            return Err(AppError::bad_request("At least one user id is required"));
        }
        let affected = self.team_repo.remove_members(&team, &req.user_ids).await?;
        info!(team_id = %team.id, removed = affected, user_id = %ctx.user_id, "Team members removed");
        Ok(BulkResult { affected })
    }

    // ── Leadership ──────────────────────────────────────────────

    /// Promote a member to leader. Existing leaders stay leaders.
    pub async fn make_leader(
        &self,
        ctx: &RequestContext,
        org_id: Uuid,
        team_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), AppError> {
        let team = self
            .authorized_team(ctx, &policies::TEAM_LEADERSHIP, org_id, team_id)
            .await?;
        if !self.team_repo.promote_leader(&team, user_id).await? {
            return Err(AppError::not_found("User is not a member of this team"));
        }
        info!(team_id = %team.id, user_id = %user_id, promoted_by = %ctx.user_id, "Team leader assigned");
        Ok(())
    }

    /// Make `user_id` the only leader, demoting the previous ones.
    pub async fn transfer_leadership(
        &self,
        ctx: &RequestContext,
        org_id: Uuid,
        team_id: Uuid,
        req: TransferLeadershipRequest,
    ) -> Result<(), AppError> {
        let team = self
            .authorized_team(ctx, &policies::TEAM_LEADERSHIP, org_id, team_id)
            .await?;
        let demoted = self
            .team_repo
            .transfer_leadership(&team, req.user_id)
            .await?;
        info!(
            team_id = %team.id,
            user_id = %req.user_id,
            demoted = demoted.len(),
            transferred_by = %ctx.user_id,
            "Team leadership transferred"
        );
        Ok(())
    }

    /// Teams a user belongs to within an organization. Site staff only.
    pub async fn user_teams(
        &self,
        ctx: &RequestContext,
        org_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<TeamMembership>, AppError> {
        self.access
            .require(ctx, &policies::USER_TEAMS, Scope::Site)
            .await?;
        self.team_repo.find_memberships(user_id, Some(org_id)).await
    }

    /// Authorize against the team, then load it. A team of another
    /// organization is reported as missing.
    async fn authorized_team(
        &self,
        ctx: &RequestContext,
        requirement: &RoleRequirement,
        org_id: Uuid,
        team_id: Uuid,
    ) -> Result<Team, AppError> {
        self.access
            .require(
                ctx,
                requirement,
                Scope::Team {
                    organization_id: org_id,
                    team_id,
                },
            )
            .await?;
        self.team_repo
            .find_by_id(team_id)
            .await?
            .filter(|t| t.organization_id == org_id)
            .ok_or_else(|| AppError::not_found("Team not found"))
    }
}
