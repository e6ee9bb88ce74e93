//! Auth handlers: register, login, logout, refresh, switch organization.

use axum::extract::State;
use axum::http::HeaderMap;
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use bytes::Bytes;

use complyhub_auth::jwt::TokenPair;
use complyhub_core::error::AppError;
use complyhub_entity::user::User;
use complyhub_service::auth::{AuthSession, LoginRequest, RegisterRequest, SwitchOrganizationRequest};

use crate::dto::request::RefreshRequest;
use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::auth::{bearer_token, cookie_token};
use crate::extractors::{ACCESS_COOKIE, ApiJson, AuthUser, ClientInfo, REFRESH_COOKIE};
use crate::state::AppState;

fn session_cookie(name: &'static str, value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build()
}

/// Set both session cookies from a fresh token pair.
fn with_session_cookies(jar: CookieJar, tokens: &TokenPair, secure: bool) -> CookieJar {
    jar.add(session_cookie(ACCESS_COOKIE, tokens.access_token.clone(), secure))
        .add(session_cookie(REFRESH_COOKIE, tokens.refresh_token.clone(), secure))
}

fn without_session_cookies(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(ACCESS_COOKIE).path("/"))
        .remove(Cookie::build(REFRESH_COOKIE).path("/"))
}

/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ApiResult<ApiResponse<User>> {
    let user = state.auth_service.register(req).await?;
    Ok(ApiResponse::created("User registered successfully", user))
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    client: ClientInfo,
    jar: CookieJar,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<(CookieJar, ApiResponse<AuthSession>)> {
    let session = state.auth_service.login(req, &client.ip_address).await?;
    let jar = with_session_cookies(jar, &session.tokens, state.config.auth.cookie_secure);
    Ok((jar, ApiResponse::ok("User logged in successfully", session)))
}

/// POST /api/v1/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
    jar: CookieJar,
) -> ApiResult<(CookieJar, ApiResponse<serde_json::Value>)> {
    state.auth_service.logout(&auth).await?;
    Ok((
        without_session_cookies(jar),
        ApiResponse::message("User logged out successfully"),
    ))
}

/// POST /api/v1/auth/refresh-token
///
/// The refresh token is read from its cookie, then the JSON body, then
/// the bearer header.
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<(CookieJar, ApiResponse<AuthSession>)> {
    let from_body = || {
        serde_json::from_slice::<RefreshRequest>(&body)
            .ok()
            .and_then(|r| r.refresh_token)
            .filter(|t| !t.is_empty())
    };
    let token = cookie_token(&jar, REFRESH_COOKIE)
        .or_else(from_body)
        .or_else(|| bearer_token(&headers))
        .ok_or_else(|| AppError::authentication("Unauthorized request"))?;

    let session = state.auth_service.refresh(&token).await?;
    let jar = with_session_cookies(jar, &session.tokens, state.config.auth.cookie_secure);
    Ok((jar, ApiResponse::ok("Access token refreshed", session)))
}

/// POST /api/v1/auth/switch-organization
pub async fn switch_organization(
    State(state): State<AppState>,
    auth: AuthUser,
    jar: CookieJar,
    ApiJson(req): ApiJson<SwitchOrganizationRequest>,
) -> ApiResult<(CookieJar, ApiResponse<AuthSession>)> {
    let session = state.auth_service.switch_organization(&auth, req).await?;
    let jar = with_session_cookies(jar, &session.tokens, state.config.auth.cookie_secure);
    Ok((jar, ApiResponse::ok("Active organization switched", session)))
}
