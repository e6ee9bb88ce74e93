//! Organization lifecycle and membership management.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use complyhub_auth::rbac::policies;
use complyhub_core::error::AppError;
use complyhub_database::repositories::organization::OrganizationRepository;
use complyhub_database::repositories::program::ProgramRepository;
use complyhub_database::repositories::user::UserRepository;
use complyhub_entity::organization::{
    BillingInfo, CreateOrganization, Organization, OrganizationMember, OrganizationMemberView,
    OrganizationSettings, UpdateOrganization,
};
use complyhub_entity::role::OrgRole;
use complyhub_entity::user::User;
use complyhub_storage::StorageManager;

use crate::access::{AccessResolver, Scope};
use crate::auth::{AuthService, RegisterRequest};
use crate::catalogue;
use crate::context::RequestContext;
use crate::validation::validate_request;

/// Request to create an organization.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrganizationRequest {
    #[validate(length(min = 1, max = 200, message = "Organization name is required"))]
    pub name: String,
    pub description: Option<String>,
    #[validate(url(message = "logoUrl must be a valid URL"))]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub billing_info: BillingInfo,
    #[serde(default)]
    pub compliance_programs_enabled: Vec<Uuid>,
    #[validate(range(min = 1, message = "dataRetentionPeriod must be positive"))]
    pub data_retention_period: Option<i32>,
    #[serde(default)]
    pub ip_restrictions: Vec<String>,
}

/// Add an existing user by id.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberRequest {
    pub user_id: Uuid,
    #[serde(default)]
    pub roles: Vec<OrgRole>,
}

/// Add an existing user by username or email.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddExistingMemberRequest {
    #[serde(alias = "username", alias = "email")]
    pub identifier: String,
    #[serde(default)]
    pub roles: Vec<OrgRole>,
}

/// Register a new user straight into an organization.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddNewMemberRequest {
    #[serde(flatten)]
    pub user: RegisterRequest,
    #[serde(default)]
    pub roles: Vec<OrgRole>,
}

/// A newly registered member.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMember {
    pub user: User,
    pub membership: OrganizationMember,
}

/// Manages organizations and their member lists.
#[derive(Debug, Clone)]
pub struct OrganizationService {
    org_repo: Arc<OrganizationRepository>,
    user_repo: Arc<UserRepository>,
    program_repo: Arc<ProgramRepository>,
    auth: Arc<AuthService>,
    access: Arc<AccessResolver>,
    storage: Arc<StorageManager>,
}

impl OrganizationService {
    pub fn new(
        org_repo: Arc<OrganizationRepository>,
        user_repo: Arc<UserRepository>,
        program_repo: Arc<ProgramRepository>,
        auth: Arc<AuthService>,
        access: Arc<AccessResolver>,
        storage: Arc<StorageManager>,
    ) -> Self {
        Self {
            org_repo,
            user_repo,
            program_repo,
            auth,
            access,
            storage,
        }
    }

    /// Create an organization owned by the caller.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        req: CreateOrganizationRequest,
    ) -> Result<Organization, AppError> {
        validate_request(&req)?;
        let name = req.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::validation("Organization name is required"));
        }
        catalogue::ensure_programs_exist(&self.program_repo, &req.compliance_programs_enabled).await?;

        let mut settings = OrganizationSettings {
            compliance_programs_enabled: req.compliance_programs_enabled,
            ip_restrictions: req.ip_restrictions,
            ..OrganizationSettings::default()
        };
        if let Some(days) = req.data_retention_period {
            settings.data_retention_period = days;
        }

        let org = self
            .org_repo
            .create_with_owner(&CreateOrganization {
                name,
                description: req.description,
                logo_url: req.logo_url,
                billing_info: req.billing_info,
                settings,
                created_by: ctx.user_id,
            })
            .await?;

        info!(
            organization_id = %org.id,
            user_id = %ctx.user_id,
            name = %org.name,
            "Organization created"
        );
        Ok(org)
    }

    /// Every organization. Site staff only.
    pub async fn list_all(&self, ctx: &RequestContext) -> Result<Vec<Organization>, AppError> {
        self.access
            .require(ctx, &policies::ORG_LIST_ALL, Scope::Site)
            .await?;
        self.org_repo.find_all().await
    }

    /// Organizations the caller belongs to.
    pub async fn mine(&self, ctx: &RequestContext) -> Result<Vec<Organization>, AppError> {
        self.org_repo.find_for_user(ctx.user_id).await
    }

    pub async fn get(&self, ctx: &RequestContext, org_id: Uuid) -> Result<Organization, AppError> {
        self.access
            .require(ctx, &policies::ORG_READ, Scope::Organization(org_id))
            .await?;
        self.find(org_id).await
    }

    pub async fn update(
        &self,
        ctx: &RequestContext,
        org_id: Uuid,
        data: UpdateOrganization,
    ) -> Result<Organization, AppError> {
        self.access
            .require(ctx, &policies::ORG_UPDATE, Scope::Organization(org_id))
            .await?;
        if let Some(name) = &data.name {
            if name.trim().is_empty() {
                return Err(AppError::validation("Organization name cannot be empty"));
            }
        }
        if let Some(programs) = &data.compliance_programs_enabled {
            catalogue::ensure_programs_exist(&self.program_repo, programs).await?;
        }

        let org = self.org_repo.update(org_id, &data).await?;
        info!(organization_id = %org.id, user_id = %ctx.user_id, "Organization updated");
        Ok(org)
    }

    /// Delete the organization and everything in it, then remove the
    /// stored document files.
    pub async fn delete(&self, ctx: &RequestContext, org_id: Uuid) -> Result<(), AppError> {
        self.access
            .require(ctx, &policies::ORG_DELETE, Scope::Organization(org_id))
            .await?;

        let keys = self
            .org_repo
            .delete_cascade(org_id)
            .await?
            .ok_or_else(|| AppError::not_found("Organization not found"))?;
        let removed = self.storage.discard_all(&keys).await;

        info!(
            organization_id = %org_id,
            user_id = %ctx.user_id,
            objects = keys.len(),
            objects_removed = removed,
            "Organization deleted"
        );
        Ok(())
    }

    // ── Members ─────────────────────────────────────────────────

    pub async fn list_members(
        &self,
        ctx: &RequestContext,
        org_id: Uuid,
    ) -> Result<Vec<OrganizationMemberView>, AppError> {
        self.access
            .require(ctx, &policies::ORG_MEMBERS, Scope::Organization(org_id))
            .await?;
        self.find(org_id).await?;
        self.org_repo.list_members(org_id).await
    }

    /// Add an existing user by id.
    pub async fn add_member(
        &self,
        ctx: &RequestContext,
        org_id: Uuid,
        req: AddMemberRequest,
    ) -> Result<OrganizationMember, AppError> {
        let roles = self.grantable_roles(ctx, org_id, req.roles).await?;
        self.find(org_id).await?;
        self.user_repo
            .find_by_id(req.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;
        self.enroll(ctx, org_id, req.user_id, &roles).await
    }

    /// Add an existing user found by username or email.
    pub async fn add_existing_member(
        &self,
        ctx: &RequestContext,
        org_id: Uuid,
        req: AddExistingMemberRequest,
    ) -> Result<OrganizationMember, AppError> {
        let roles = self.grantable_roles(ctx, org_id, req.roles).await?;
        self.find(org_id).await?;
        let identifier = req.identifier.trim();
        if identifier.is_empty() {
            return Err(AppError::bad_request("Username or email is required"));
        }
        let user = self
            .user_repo
            .find_by_identifier(identifier)
            .await?
            .ok_or_else(|| AppError::not_found("User does not exist"))?;
        self.enroll(ctx, org_id, user.id, &roles).await
    }

    /// Register a user and enroll them in one transaction.
    pub async fn add_new_member(
        &self,
        ctx: &RequestContext,
        org_id: Uuid,
        req: AddNewMemberRequest,
    ) -> Result<NewMember, AppError> {
        let roles = self.grantable_roles(ctx, org_id, req.roles).await?;
        self.find(org_id).await?;
        let data = self.auth.prepare_user(&req.user)?;

        let (user, membership) = self
            .org_repo
            .create_user_as_member(org_id, &data, &roles)
            .await?;
        info!(
            organization_id = %org_id,
            user_id = %user.id,
            added_by = %ctx.user_id,
            "New user registered into organization"
        );
        Ok(NewMember { user, membership })
    }

    /// Remove a member. Only owners and site admins may remove an owner,
    /// and the last owner cannot be removed.
    pub async fn remove_member(
        &self,
        ctx: &RequestContext,
        org_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), AppError> {
        let caller = self
            .access
            .require(ctx, &policies::ORG_MEMBERS, Scope::Organization(org_id))
            .await?;
        let owners_removable = caller.is_site_admin() || caller.has_org_role(OrgRole::OrgOwner);

        self.org_repo
            .remove_member(org_id, user_id, owners_removable)
            .await?;
        info!(
            organization_id = %org_id,
            user_id = %user_id,
            removed_by = %ctx.user_id,
            "Member removed from organization"
        );
        Ok(())
    }

    /// Authorize member management and settle the roles to grant. Only
    /// owners (or site admins) may hand out ownership.
    async fn grantable_roles(
        &self,
        ctx: &RequestContext,
        org_id: Uuid,
        requested: Vec<OrgRole>,
    ) -> Result<Vec<OrgRole>, AppError> {
        let caller = self
            .access
            .require(ctx, &policies::ORG_MEMBERS, Scope::Organization(org_id))
            .await?;

        let mut roles: Vec<OrgRole> = Vec::with_capacity(requested.len());
        for role in requested {
            if !roles.contains(&role) {
                roles.push(role);
            }
        }
        if roles.is_empty() {
            roles.push(OrgRole::Employee);
        }
        if roles.contains(&OrgRole::OrgOwner)
            && !caller.is_site_admin()
            && !caller.has_org_role(OrgRole::OrgOwner)
        {
            return Err(AppError::authorization(
                "Only an organization owner can grant the orgOwner role",
            ));
        }
        Ok(roles)
    }

    async fn enroll(
        &self,
        ctx: &RequestContext,
        org_id: Uuid,
        user_id: Uuid,
        roles: &[OrgRole],
    ) -> Result<OrganizationMember, AppError> {
        let member = self.org_repo.add_member(org_id, user_id, roles).await?;
        info!(
            organization_id = %org_id,
            user_id = %user_id,
            added_by = %ctx.user_id,
            "Member added to organization"
        );
        Ok(member)
    }

    async fn find(&self, org_id: Uuid) -> Result<Organization, AppError> {
        self.org_repo
            .find_by_id(org_id)
            .await?
            .ok_or_else(|| AppError::not_found("Organization not found"))
    }
}
