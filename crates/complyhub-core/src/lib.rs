//! # complyhub-core
//!
//! Core crate for ComplyHub. Contains the unified error system, the
//! configuration schema, and the storage provider trait.
//!
//! This crate has **no** internal dependencies on other ComplyHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;
