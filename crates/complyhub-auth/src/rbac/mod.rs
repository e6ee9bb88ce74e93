//! Role-scope authorization.

pub mod authorizer;
pub mod policies;

pub use authorizer::{CallerRoles, RoleRequirement, authorize};
