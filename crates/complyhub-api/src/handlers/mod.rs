//! Route handlers organized by domain.

pub mod auth;
pub mod document;
pub mod folder;
pub mod health;
pub mod organization;
pub mod program;
pub mod team;
pub mod template;
pub mod user;
