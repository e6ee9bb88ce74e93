//! Profile reads and updates, plus site-admin user management.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use complyhub_auth::rbac::policies;
use complyhub_core::error::AppError;
use complyhub_database::repositories::user::UserRepository;
use complyhub_entity::user::{UpdateProfile, User};

use crate::access::{AccessResolver, Scope};
use crate::context::RequestContext;

/// Manages user accounts.
#[derive(Debug, Clone)]
pub struct UserService {
    user_repo: Arc<UserRepository>,
    access: Arc<AccessResolver>,
}

impl UserService {
    pub fn new(user_repo: Arc<UserRepository>, access: Arc<AccessResolver>) -> Self {
        Self { user_repo, access }
    }

    /// The caller's own account.
    pub async fn me(&self, ctx: &RequestContext) -> Result<User, AppError> {
        self.find(ctx.user_id).await
    }

    /// Patch profile fields. Credentials and roles are not reachable from
    /// here.
    pub async fn update_me(
        &self,
        ctx: &RequestContext,
        data: UpdateProfile,
    ) -> Result<User, AppError> {
        if data.is_empty() {
            return Err(AppError::bad_request("No profile fields to update"));
        }
        if let Some(phone) = &data.phone_number {
            if phone.trim().is_empty() {
                return Err(AppError::validation("Phone number cannot be empty"));
            }
        }
        let user = self.user_repo.update_profile(ctx.user_id, &data).await?;
        info!(user_id = %user.id, "Profile updated");
        Ok(user)
    }

    /// A user by id. Callers other than site admins may only read
    /// themselves.
    pub async fn get(&self, ctx: &RequestContext, user_id: Uuid) -> Result<User, AppError> {
        if user_id != ctx.user_id {
            self.access.require(ctx, &policies::USER_ADMIN, Scope::Site).await?;
        }
        self.find(user_id).await
    }

    /// Every user. Site admins only.
    pub async fn list(&self, ctx: &RequestContext) -> Result<Vec<User>, AppError> {
        self.access.require(ctx, &policies::USER_ADMIN, Scope::Site).await?;
        self.user_repo.find_all().await
    }

    /// Delete another user's account. Site admins only.
    pub async fn delete(&self, ctx: &RequestContext, user_id: Uuid) -> Result<(), AppError> {
        self.access.require(ctx, &policies::USER_ADMIN, Scope::Site).await?;
        if user_id == ctx.user_id {
            return Err(AppError::bad_request("You cannot delete your own account"));
        }
        if !self.user_repo.delete(user_id).await? {
            return Err(AppError::not_found("User not found"));
        }
        info!(user_id = %user_id, deleted_by = %ctx.user_id, "User deleted");
        Ok(())
    }

    async fn find(&self, user_id: Uuid) -> Result<User, AppError> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }
}
