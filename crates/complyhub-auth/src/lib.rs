//! # complyhub-auth
//!
//! Credential handling and access control for ComplyHub.
//!
//! ## Modules
//!
//! - `jwt`: access/refresh token issuing and validation
//! - `password`: Argon2id hashing and the password policy
//! - `rbac`: the role-scope authorizer and per-endpoint requirements

pub mod jwt;
pub mod password;
pub mod rbac;

pub use jwt::{Claims, JwtDecoder, JwtEncoder, TokenPair, TokenSubject, TokenType};
pub use password::{PasswordHasher, PasswordValidator};
pub use rbac::{CallerRoles, RoleRequirement, authorize};
