//! Template services.

pub mod service;

pub use service::{CreateTemplateRequest, TemplateService};
