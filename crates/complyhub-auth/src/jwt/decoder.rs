//! JWT token validation.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use complyhub_core::config::auth::AuthConfig;
use complyhub_core::error::AppError;

use super::claims::{Claims, TokenType};

/// Validates access and refresh tokens against their signing secrets.
#[derive(Clone)]
pub struct JwtDecoder {
    access_key: DecodingKey,
    refresh_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 5; // seconds of clock skew
        validation.required_spec_claims = ["exp", "sub"].iter().map(|c| c.to_string()).collect();

        Self {
            access_key: DecodingKey::from_secret(config.access_token_secret.as_bytes()),
            refresh_key: DecodingKey::from_secret(config.refresh_token_secret.as_bytes()),
            validation,
        }
    }

    /// Decodes and validates an access token.
    pub fn decode_access_token(&self, token: &str) -> Result<Claims, AppError> {
        let claims = decode::<Claims>(token, &self.access_key, &self.validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::authentication("Access token has expired")
                }
                _ => AppError::authentication("Invalid access token"),
            })?
            .claims;

        if claims.token_type != TokenType::Access {
            return Err(AppError::authentication("Invalid access token"));
        }
        Ok(claims)
    }

    /// Decodes and validates a refresh token. Whether it is still the
    /// user's current one is checked by the caller.
    pub fn decode_refresh_token(&self, token: &str) -> Result<Claims, AppError> {
        let claims = decode::<Claims>(token, &self.refresh_key, &self.validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::authentication("Refresh token is expired or used")
                }
                _ => AppError::authentication("Invalid refresh token"),
            })?
            .claims;

        if claims.token_type != TokenType::Refresh {
            return Err(AppError::authentication("Invalid refresh token"));
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use complyhub_core::error::ErrorKind;
    use complyhub_entity::role::{OrgRole, SiteRole};
    use uuid::Uuid;

    use super::*;
    use crate::jwt::encoder::{JwtEncoder, TokenSubject};

    fn config() -> AuthConfig {
        AuthConfig {
            access_token_secret: "access-secret".into(),
            refresh_token_secret: "refresh-secret".into(),
            ..AuthConfig::default()
        }
    }

    fn subject() -> TokenSubject {
        TokenSubject {
            user_id: Uuid::new_v4(),
            site_roles: vec![SiteRole::SiteUser],
            organization_id: Some(Uuid::new_v4()),
            org_roles: vec![OrgRole::OrgOwner],
            ..TokenSubject::default()
        }
    }

    #[test]
    fn access_token_carries_active_context() {
        let cfg = config();
        let subject = subject();
        let pair = JwtEncoder::new(&cfg).issue(&subject).expect("issue");
        let claims = JwtDecoder::new(&cfg)
            .decode_access_token(&pair.access_token)
            .expect("decode");

        assert_eq!(claims.sub, subject.user_id);
        assert_eq!(claims.org, subject.organization_id);
        assert_eq!(claims.oroles, vec![OrgRole::OrgOwner]);
        assert_eq!(claims.sroles, vec![SiteRole::SiteUser]);
        assert!(claims.team.is_none());
    }

    #[test]
    fn refresh_token_keeps_its_jti() {
        let cfg = config();
        let pair = JwtEncoder::new(&cfg).issue(&subject()).expect("issue");
        let claims = JwtDecoder::new(&cfg)
            .decode_refresh_token(&pair.refresh_token)
            .expect("decode");
        assert_eq!(claims.jti, pair.refresh_jti);
        assert!(claims.org.is_none());
    }

    #[test]
    fn tokens_are_not_interchangeable() {
        let cfg = config();
        let pair = JwtEncoder::new(&cfg).issue(&subject()).expect("issue");
        let decoder = JwtDecoder::new(&cfg);

        let err = decoder
            .decode_access_token(&pair.refresh_token)
            .expect_err("refresh token used as access token");
        assert_eq!(err.kind, ErrorKind::Authentication);

        let err = decoder
            .decode_refresh_token(&pair.access_token)
            .expect_err("access token used as refresh token");
        assert_eq!(err.message, "Invalid refresh token");
    }

    #[test]
    fn foreign_secret_is_rejected() {
        let pair = JwtEncoder::new(&config()).issue(&subject()).expect("issue");
        let other = AuthConfig {
            access_token_secret: "someone-else".into(),
            ..config()
        };
        let err = JwtDecoder::new(&other)
            .decode_access_token(&pair.access_token)
            .expect_err("wrong key");
        assert_eq!(err.message, "Invalid access token");
    }
}
