//! Registration, login, token refresh and active-context switching.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use complyhub_auth::jwt::{JwtDecoder, JwtEncoder, TokenPair, TokenSubject};
use complyhub_auth::password::{PasswordHasher, PasswordValidator};
use complyhub_core::error::AppError;
use complyhub_database::repositories::organization::OrganizationRepository;
use complyhub_database::repositories::team::TeamRepository;
use complyhub_database::repositories::user::UserRepository;
use complyhub_entity::role::SiteRole;
use complyhub_entity::user::{CreateUser, User};

use crate::context::RequestContext;
use crate::validation::validate_request;

/// Self-service registration payload. Every field is required.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterRequest {
    #[validate(
        length(min = 3, max = 32, message = "Username must be 3 to 32 characters"),
        custom(function = "validate_username")
    )]
    pub username: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    #[validate(length(max = 100, message = "First name is too long"))]
    pub first_name: String,
    #[validate(length(max = 100, message = "Last name is too long"))]
    pub last_name: String,
    #[validate(length(min = 5, max = 32, message = "Phone number must be 5 to 32 characters"))]
    pub phone_number: String,
}

impl RegisterRequest {
    fn has_blank_field(&self) -> bool {
        [
            &self.username,
            &self.email,
            &self.password,
            &self.first_name,
            &self.last_name,
            &self.phone_number,
        ]
        .iter()
        .any(|v| v.trim().is_empty())
    }
}

fn validate_username(username: &str) -> Result<(), ValidationError> {
    let ok = username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'));
    if ok {
        Ok(())
    } else {
        Err(ValidationError::new("username")
            .with_message("Username may only contain letters, digits, '.', '_' and '-'".into()))
    }
}

/// Login with username or email.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: String,
}

/// Select the active organization and, optionally, a team inside it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchOrganizationRequest {
    pub organization_id: Uuid,
    pub team_id: Option<Uuid>,
}

/// A signed-in user with their fresh token pair.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub user: User,
    #[serde(flatten)]
    pub tokens: TokenPair,
}

/// Issues and rotates credentials.
#[derive(Debug, Clone)]
pub struct AuthService {
    user_repo: Arc<UserRepository>,
    org_repo: Arc<OrganizationRepository>,
    team_repo: Arc<TeamRepository>,
    encoder: Arc<JwtEncoder>,
    decoder: Arc<JwtDecoder>,
    hasher: Arc<PasswordHasher>,
    password_validator: Arc<PasswordValidator>,
}

impl AuthService {
    pub fn new(
        user_repo: Arc<UserRepository>,
        org_repo: Arc<OrganizationRepository>,
        team_repo: Arc<TeamRepository>,
        encoder: Arc<JwtEncoder>,
        decoder: Arc<JwtDecoder>,
        hasher: Arc<PasswordHasher>,
        password_validator: Arc<PasswordValidator>,
    ) -> Self {
        Self {
            user_repo,
            org_repo,
            team_repo,
            encoder,
            decoder,
            hasher,
            password_validator,
        }
    }

    /// Check and hash a registration payload into a user row.
    pub fn prepare_user(&self, req: &RegisterRequest) -> Result<CreateUser, AppError> {
        if req.has_blank_field() {
            return Err(AppError::bad_request("All fields are required"));
        }
        validate_request(req)?;
        self.password_validator.validate(&req.password)?;

        Ok(CreateUser {
            username: req.username.trim().to_lowercase(),
            email: req.email.trim().to_lowercase(),
            password_hash: self.hasher.hash_password(&req.password)?,
            first_name: req.first_name.trim().to_string(),
            last_name: req.last_name.trim().to_string(),
            phone_number: req.phone_number.trim().to_string(),
            site_roles: vec![SiteRole::SiteUser],
        })
    }

    /// Create a site user. Duplicate email or username is a 400.
    pub async fn register(&self, req: RegisterRequest) -> Result<User, AppError> {
        let data = self.prepare_user(&req)?;
        let user = self.user_repo.create(&data).await?;
        info!(user_id = %user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// Verify credentials and open a session, restoring the last active
    /// context when the user still belongs to it.
    pub async fn login(&self, req: LoginRequest, ip_address: &str) -> Result<AuthSession, AppError> {
        let identifier = [req.username.as_deref(), req.email.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|s| !s.is_empty())
            .ok_or_else(|| AppError::bad_request("Email or username is required"))?;

        let user = self
            .user_repo
            .find_by_identifier(&identifier.to_lowercase())
            .await?
            .ok_or_else(|| AppError::not_found("User does not exist"))?;

        if !self.hasher.verify_password(&req.password, &user.password_hash)? {
            warn!(user_id = %user.id, ip = %ip_address, "Login with wrong password");
            return Err(AppError::authentication("Invalid User Credentials"));
        }
        if !user.account_status.can_login() {
            return Err(AppError::authorization(format!(
                "Account is {}",
                user.account_status
            )));
        }

        let subject = self.restore_subject(&user).await?;
        let tokens = self.encoder.issue(&subject)?;
        self.user_repo.record_login(user.id, tokens.refresh_jti).await?;
        self.persist_context(&user, &subject, tokens.refresh_jti).await?;

        info!(user_id = %user.id, ip = %ip_address, "User logged in");
        let user = self.reload(user.id).await?;
        Ok(AuthSession { user, tokens })
    }

    /// Exchange a refresh token for a new pair. The presented token must be
    /// the one most recently issued to the user; it stops working afterwards.
    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthSession, AppError> {
        let claims = self.decoder.decode_refresh_token(refresh_token)?;
        let user = self
            .user_repo
            .find_by_id(claims.user_id())
            .await?
            .ok_or_else(|| AppError::authentication("Invalid refresh token"))?;

        if user.refresh_token_id != Some(claims.jti) {
            warn!(user_id = %user.id, "Refresh token reuse rejected");
            return Err(AppError::authentication("Refresh token is expired or used"));
        }
        if !user.account_status.can_login() {
            return Err(AppError::authorization(format!(
                "Account is {}",
                user.account_status
            )));
        }

        let subject = self.restore_subject(&user).await?;
        let tokens = self.encoder.issue(&subject)?;
        let rotated = self
            .user_repo
            .rotate_refresh_token(user.id, claims.jti, tokens.refresh_jti)
            .await?;
        if !rotated {
            // a concurrent exchange already consumed this token
            return Err(AppError::authentication("Refresh token is expired or used"));
        }
        self.persist_context(&user, &subject, tokens.refresh_jti).await?;

        info!(user_id = %user.id, "Tokens refreshed");
        let user = self.reload(user.id).await?;
        Ok(AuthSession { user, tokens })
    }

    /// Forget the user's refresh token.
    pub async fn logout(&self, ctx: &RequestContext) -> Result<(), AppError> {
        self.user_repo.clear_refresh_token(ctx.user_id).await?;
        info!(user_id = %ctx.user_id, "User logged out");
        Ok(())
    }

    /// Make `organization_id` (and optionally a team in it) the caller's
    /// active context after re-checking membership.
    pub async fn switch_organization(
        &self,
        ctx: &RequestContext,
        req: SwitchOrganizationRequest,
    ) -> Result<AuthSession, AppError> {
        let user = self.reload(ctx.user_id).await?;

        self.org_repo
            .find_by_id(req.organization_id)
            .await?
            .ok_or_else(|| AppError::not_found("Organization not found"))?;
        let member = self
            .org_repo
            .find_member(req.organization_id, user.id)
            .await?
            .ok_or_else(|| AppError::authorization("You are not a member of this organization"))?;

        let mut subject = TokenSubject {
            user_id: user.id,
            site_roles: user.site_roles.clone(),
            organization_id: Some(req.organization_id),
            org_roles: member.roles,
            ..TokenSubject::default()
        };

        if let Some(team_id) = req.team_id {
            let team = self
                .team_repo
                .find_by_id(team_id)
                .await?
                .filter(|t| t.organization_id == req.organization_id)
                .ok_or_else(|| AppError::not_found("Team not found in this organization"))?;
            let team_member = self
                .team_repo
                .find_member(team.id, user.id)
                .await?
                .ok_or_else(|| AppError::authorization("You are not a member of this team"))?;
            subject.team_id = Some(team.id);
            subject.team_roles = vec![team_member.role];
        }

        let tokens = self.encoder.issue(&subject)?;
        self.user_repo
            .set_active_context(user.id, subject.organization_id, subject.team_id, tokens.refresh_jti)
            .await?;

        info!(
            user_id = %user.id,
            organization_id = %req.organization_id,
            team_id = ?subject.team_id,
            "Active organization switched"
        );
        let user = self.reload(user.id).await?;
        Ok(AuthSession { user, tokens })
    }

    /// Token subject for the user's stored context, dropping any part of it
    /// they no longer belong to. Without a valid stored organization the
    /// first membership is used.
    async fn restore_subject(&self, user: &User) -> Result<TokenSubject, AppError> {
        let mut subject = TokenSubject {
            user_id: user.id,
            site_roles: user.site_roles.clone(),
            ..TokenSubject::default()
        };

        let mut membership = None;
        if let Some(org_id) = user.active_organization_id {
            membership = self.org_repo.find_member(org_id, user.id).await?;
        }
        if membership.is_none() {
            if let Some(first) = self.org_repo.find_for_user(user.id).await?.first() {
                membership = self.org_repo.find_member(first.id, user.id).await?;
            }
        }
        let Some(member) = membership else {
            return Ok(subject);
        };

        subject.organization_id = Some(member.organization_id);
        subject.org_roles = member.roles;

        if let Some(team_id) = user.active_team_id {
            let team_member = self
                .team_repo
                .find_memberships(user.id, Some(member.organization_id))
                .await?
                .into_iter()
                .find(|m| m.team_id == team_id);
            if let Some(m) = team_member {
                subject.team_id = Some(m.team_id);
                subject.team_roles = vec![m.role];
            }
        }
        Ok(subject)
    }

    async fn persist_context(
        &self,
        user: &User,
        subject: &TokenSubject,
        refresh_jti: Uuid,
    ) -> Result<(), AppError> {
        if user.active_organization_id != subject.organization_id
            || user.active_team_id != subject.team_id
        {
            self.user_repo
                .set_active_context(user.id, subject.organization_id, subject.team_id, refresh_jti)
                .await?;
        }
        Ok(())
    }

    async fn reload(&self, user_id: Uuid) -> Result<User, AppError> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }
}
