//! # complyhub-storage
//!
//! Object storage for document versions. Supports the local filesystem
//! and S3-compatible object stores.

pub mod keys;
pub mod manager;
pub mod providers;

pub use manager::StorageManager;
