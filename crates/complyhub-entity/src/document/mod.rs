//! Document domain entities.

pub mod model;
pub mod version;

pub use model::{
    CreateDocument, Document, DocumentFilter, DocumentType, DocumentWithVersions, UpdateDocument,
};
pub use version::{DocumentVersion, NewVersion};
