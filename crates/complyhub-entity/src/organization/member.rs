//! Organization membership rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::role::OrgRole;

/// One user's membership in one organization.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationMember {
    pub organization_id: Uuid,
    pub user_id: Uuid,
    /// Never empty.
    pub roles: Vec<OrgRole>,
    pub joined_at: DateTime<Utc>,
}

impl OrganizationMember {
    /// Whether the member is an owner or admin.
    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(OrgRole::is_admin)
    }
}

/// Membership joined with the member's identity, for member listings.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationMemberView {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub roles: Vec<OrgRole>,
    pub joined_at: DateTime<Utc>,
}
