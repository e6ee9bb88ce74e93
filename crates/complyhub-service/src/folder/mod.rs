//! Folder services.

pub mod service;

pub use service::{CreateFolderRequest, FolderQuery, FolderService};
