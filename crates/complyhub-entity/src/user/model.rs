//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::status::AccountStatus;
use crate::role::SiteRole;

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Unique login name, always lowercase.
    pub username: String,
    /// Unique email address.
    pub email: String,
    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact phone number.
    pub phone_number: String,
    /// Avatar image URL.
    pub avatar: Option<String>,
    /// Account status.
    pub account_status: AccountStatus,
    /// Platform-wide roles.
    pub site_roles: Vec<SiteRole>,
    /// Token id of the single refresh token currently honoured.
    #[serde(skip_serializing)]
    pub refresh_token_id: Option<Uuid>,
    /// Organization selected as the active context.
    pub active_organization_id: Option<Uuid>,
    /// Team selected as the active context.
    pub active_team_id: Option<Uuid>,
    /// Last successful login time.
    pub last_login_at: Option<DateTime<Utc>>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether the user holds the site administrator role.
    pub fn is_site_admin(&self) -> bool {
        self.site_roles.contains(&SiteRole::SiteAdmin)
    }

    /// Whether the user holds any of the given site roles.
    pub fn has_site_role(&self, roles: &[SiteRole]) -> bool {
        self.site_roles.iter().any(|r| roles.contains(r))
    }

    /// Reduced view used when listing members.
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
        }
    }
}

/// Public identity fields of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    /// User identifier.
    pub id: Uuid,
    /// Login name.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
}

/// Data required to create a new user.
#[derive(Debug, Clone)]
pub struct CreateUser {
    /// Login name; stored lowercase.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Pre-hashed password.
    pub password_hash: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact phone number.
    pub phone_number: String,
    /// Initial site roles.
    pub site_roles: Vec<SiteRole>,
}

/// Whitelisted profile fields a user may change about themselves.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfile {
    /// New given name.
    pub first_name: Option<String>,
    /// New family name.
    pub last_name: Option<String>,
    /// New phone number.
    pub phone_number: Option<String>,
    /// New avatar URL.
    pub avatar: Option<String>,
}

impl UpdateProfile {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.phone_number.is_none()
            && self.avatar.is_none()
    }
}
