//! Request DTOs that exist only at the HTTP boundary.

use serde::Deserialize;

/// Body of `POST /auth/refresh-token`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

/// `?isActive=` filter on the program list.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramListQuery {
    pub is_active: Option<bool>,
}
