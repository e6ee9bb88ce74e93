//! JWT token creation with separate access and refresh signing keys.

use chrono::{DateTime, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde::Serialize;
use uuid::Uuid;

use complyhub_core::config::auth::AuthConfig;
use complyhub_core::error::AppError;
use complyhub_entity::role::{OrgRole, SiteRole, TeamRole};

use super::claims::{Claims, TokenType};

/// Identity and active context embedded in an access token.
#[derive(Debug, Clone, Default)]
pub struct TokenSubject {
    pub user_id: Uuid,
    pub site_roles: Vec<SiteRole>,
    pub organization_id: Option<Uuid>,
    pub org_roles: Vec<OrgRole>,
    pub team_id: Option<Uuid>,
    pub team_roles: Vec<TeamRole>,
}

/// Result of issuing a token pair.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// `jti` of the refresh token, to be persisted on the user.
    #[serde(skip)]
    pub refresh_jti: Uuid,
    pub access_expires_at: DateTime<Utc>,
    pub refresh_expires_at: DateTime<Utc>,
}

/// Creates signed HS256 access and refresh tokens.
#[derive(Clone)]
pub struct JwtEncoder {
    access_key: EncodingKey,
    refresh_key: EncodingKey,
    access_ttl_minutes: i64,
    refresh_ttl_hours: i64,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("access_ttl_minutes", &self.access_ttl_minutes)
            .field("refresh_ttl_hours", &self.refresh_ttl_hours)
            .finish()
    }
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            access_key: EncodingKey::from_secret(config.access_token_secret.as_bytes()),
            refresh_key: EncodingKey::from_secret(config.refresh_token_secret.as_bytes()),
            access_ttl_minutes: config.access_token_ttl_minutes as i64,
            refresh_ttl_hours: config.refresh_token_ttl_hours as i64,
        }
    }

    /// Issues a fresh access + refresh pair for `subject`.
    pub fn issue(&self, subject: &TokenSubject) -> Result<TokenPair, AppError> {
        let now = Utc::now();
        let access_exp = now + chrono::Duration::minutes(self.access_ttl_minutes);
        let refresh_exp = now + chrono::Duration::hours(self.refresh_ttl_hours);

        let access_claims = Claims {
            sub: subject.user_id,
            org: subject.organization_id,
            oroles: subject.org_roles.clone(),
            team: subject.team_id,
            troles: subject.team_roles.clone(),
            sroles: subject.site_roles.clone(),
            iat: now.timestamp(),
            exp: access_exp.timestamp(),
            jti: Uuid::new_v4(),
            token_type: TokenType::Access,
        };

        let refresh_jti = Uuid::new_v4();
        let refresh_claims = Claims {
            sub: subject.user_id,
            org: None,
            oroles: Vec::new(),
            team: None,
            troles: Vec::new(),
            sroles: Vec::new(),
            iat: now.timestamp(),
            exp: refresh_exp.timestamp(),
            jti: refresh_jti,
            token_type: TokenType::Refresh,
        };

        let access_token = encode(&Header::default(), &access_claims, &self.access_key)
            .map_err(|e| AppError::internal(format!("Failed to encode access token: {e}")))?;

        let refresh_token = encode(&Header::default(), &refresh_claims, &self.refresh_key)
            .map_err(|e| AppError::internal(format!("Failed to encode refresh token: {e}")))?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            refresh_jti,
            access_expires_at: access_exp,
            refresh_expires_at: refresh_exp,
        })
    }
}
