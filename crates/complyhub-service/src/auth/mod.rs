//! Credential and session services.

pub mod service;

pub use service::{AuthService, AuthSession, LoginRequest, RegisterRequest, SwitchOrganizationRequest};
