//! JWT claims carried in access and refresh tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use complyhub_entity::role::{OrgRole, SiteRole, TeamRole};

/// Claims payload.
///
/// Access tokens carry the full active context. Refresh tokens only carry
/// `sub`, `jti` and `token_type`; the context fields default to empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject, the user ID.
    pub sub: Uuid,
    /// Active organization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org: Option<Uuid>,
    /// Roles held in the active organization.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub oroles: Vec<OrgRole>,
    /// Active team.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<Uuid>,
    /// Role held in the active team.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub troles: Vec<TeamRole>,
    /// Platform-wide roles.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sroles: Vec<SiteRole>,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Token ID. For refresh tokens this is the value persisted on the user.
    pub jti: Uuid,
    /// Token type: "access" or "refresh".
    pub token_type: TokenType,
}

/// Distinguishes access tokens from refresh tokens.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// Short-lived token for API requests.
    Access,
    /// Long-lived token exchanged for a new pair.
    Refresh,
}

impl Claims {
    /// Returns the user ID from the subject claim.
    pub fn user_id(&self) -> Uuid {
        self.sub
    }

    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }

    pub fn is_site_admin(&self) -> bool {
        self.sroles.contains(&SiteRole::SiteAdmin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_claims_deserialize_without_context() {
        let json = serde_json::json!({
            "sub": Uuid::nil(),
            "iat": 0,
            "exp": 10,
            "jti": Uuid::nil(),
            "token_type": "refresh",
        });
        let claims: Claims = serde_json::from_value(json).expect("claims");
        assert_eq!(claims.token_type, TokenType::Refresh);
        assert!(claims.org.is_none());
        assert!(claims.sroles.is_empty());
        assert!(!claims.is_site_admin());
    }
}
