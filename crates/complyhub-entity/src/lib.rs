//! # complyhub-entity
//!
//! Domain entity models for ComplyHub. Every struct in this crate
//! represents a database table row or a domain value object. Row types
//! derive `sqlx::FromRow` and serialize with camelCase field names, which
//! is the shape clients see.

#[macro_use]
mod macros;

pub mod document;
pub mod folder;
pub mod organization;
pub mod program;
pub mod role;
pub mod team;
pub mod template;
pub mod user;

pub use role::{OrgRole, SiteRole, TeamRole};
