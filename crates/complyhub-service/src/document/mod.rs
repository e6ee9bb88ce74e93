//! Document services.

pub mod service;
pub mod visibility;

pub use service::{
    DocumentDownload, DocumentQuery, DocumentService, UploadDocument, UploadedDocument,
    UploadedFile,
};
pub use visibility::can_view;
