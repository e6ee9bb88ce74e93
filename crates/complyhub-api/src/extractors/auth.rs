//! `AuthUser` extractor: reads the access token from the session cookie or
//! the `Authorization` header, validates it, and injects the request
//! context.

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;
use axum_extra::extract::CookieJar;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::{Authorization, HeaderMapExt};

use complyhub_core::error::AppError;
use complyhub_service::context::RequestContext;

use super::client::ClientInfo;
use crate::error::ApiError;
use crate::state::AppState;

/// Cookie holding the access token.
pub const ACCESS_COOKIE: &str = "accessToken";
/// Cookie holding the refresh token.
pub const REFRESH_COOKIE: &str = "refreshToken";

/// Extracted authenticated user context available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser(pub RequestContext);

impl AuthUser {
    /// Returns the inner `RequestContext`.
    pub fn context(&self) -> &RequestContext {
        &self.0
    }
}

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Value of a non-empty cookie.
pub(crate) fn cookie_token(jar: &CookieJar, name: &str) -> Option<String> {
    jar.get(name)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

/// Token of an `Authorization: Bearer` header.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|Authorization(bearer)| bearer.token().to_string())
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = cookie_token(&jar, ACCESS_COOKIE)
            .or_else(|| bearer_token(&parts.headers))
            .ok_or_else(|| AppError::authentication("Unauthorized request"))?;

        let claims = state.jwt_decoder.decode_access_token(&token)?;
        let client = ClientInfo::from_headers(&parts.headers);

        let ctx = RequestContext::new(
            claims.user_id(),
            claims.sroles,
            claims.org,
            claims.team,
            client.ip_address,
            client.user_agent,
        );

        Ok(AuthUser(ctx))
    }
}
