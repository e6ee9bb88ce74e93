//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Token signing and credential configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC-SHA256 secret for access tokens.
    #[serde(default = "default_access_secret")]
    pub access_token_secret: String,
    /// HMAC-SHA256 secret for refresh tokens.
    #[serde(default = "default_refresh_secret")]
    pub refresh_token_secret: String,
    /// Access token TTL in minutes.
    #[serde(default = "default_access_ttl")]
    pub access_token_ttl_minutes: u64,
    /// Refresh token TTL in hours.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_token_ttl_hours: u64,
    /// Set the `Secure` attribute on session cookies.
    #[serde(default = "default_cookie_secure")]
    pub cookie_secure: bool,
    /// Minimum password length.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_token_secret: default_access_secret(),
            refresh_token_secret: default_refresh_secret(),
            access_token_ttl_minutes: default_access_ttl(),
            refresh_token_ttl_hours: default_refresh_ttl(),
            cookie_secure: default_cookie_secure(),
            password_min_length: default_password_min(),
        }
    }
}

fn default_access_secret() -> String {
    "CHANGE_ME_ACCESS_SECRET".to_string()
}

fn default_refresh_secret() -> String {
    "CHANGE_ME_REFRESH_SECRET".to_string()
}

fn default_access_ttl() -> u64 {
    15
}

fn default_refresh_ttl() -> u64 {
    240
}

fn default_cookie_secure() -> bool {
    true
}

fn default_password_min() -> usize {
    8
}
