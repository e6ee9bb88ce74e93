//! Trait seams implemented by other crates.

pub mod storage;

pub use storage::{ByteStream, StorageObjectMeta, StorageProvider};
