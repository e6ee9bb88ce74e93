//! Custom Axum extractors.

pub mod auth;
pub mod client;
pub mod json;

pub use auth::{ACCESS_COOKIE, AuthUser, REFRESH_COOKIE};
pub use client::ClientInfo;
pub use json::{ApiJson, ApiPath, ApiQuery};
