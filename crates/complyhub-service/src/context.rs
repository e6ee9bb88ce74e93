//! Request context carrying the authenticated caller and their active
//! organization/team.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use complyhub_core::error::AppError;
use complyhub_entity::role::SiteRole;

/// Context for the current authenticated request.
///
/// Built from access-token claims by the API layer and passed into every
/// service method so each operation knows who is acting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: Uuid,
    /// Site roles at the time the token was issued.
    pub site_roles: Vec<SiteRole>,
    /// Active organization from the token, if any.
    pub organization_id: Option<Uuid>,
    /// Active team from the token, if any.
    pub team_id: Option<Uuid>,
    /// IP address of the request origin.
    pub ip_address: String,
    /// User-Agent header value.
    pub user_agent: Option<String>,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    pub fn new(
        user_id: Uuid,
        site_roles: Vec<SiteRole>,
        organization_id: Option<Uuid>,
        team_id: Option<Uuid>,
        ip_address: String,
        user_agent: Option<String>,
    ) -> Self {
        Self {
            user_id,
            site_roles,
            organization_id,
            team_id,
            ip_address,
            user_agent,
            request_time: Utc::now(),
        }
    }

    pub fn is_site_admin(&self) -> bool {
        self.site_roles.contains(&SiteRole::SiteAdmin)
    }

    /// Site admin or moderator.
    pub fn is_site_staff(&self) -> bool {
        self.site_roles
            .iter()
            .any(|r| matches!(r, SiteRole::SiteAdmin | SiteRole::SiteModerator))
    }

    /// The active organization, or a 400 asking the caller to pick one.
    pub fn require_organization(&self) -> Result<Uuid, AppError> {
        self.organization_id
            .ok_or_else(|| AppError::bad_request("No active organization selected"))
    }
}
