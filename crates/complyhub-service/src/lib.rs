//! # complyhub-service
//!
//! Business logic service layer for ComplyHub. Each service orchestrates
//! repositories, object storage and authentication to implement one area
//! of the API.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references. Authorization goes through
//! [`access::AccessResolver`], which loads the caller's memberships for
//! the organization or team a request targets.

pub mod access;
pub mod auth;
pub mod catalogue;
pub mod context;
pub mod document;
pub mod folder;
pub mod organization;
pub mod program;
pub mod team;
pub mod template;
pub mod user;
pub mod validation;

pub use access::{AccessResolver, Scope};
pub use auth::AuthService;
pub use context::RequestContext;
pub use document::DocumentService;
pub use folder::FolderService;
pub use organization::OrganizationService;
pub use program::ProgramService;
pub use team::TeamService;
pub use template::TemplateService;
pub use user::UserService;
