//! Document template entities.

pub mod model;

pub use model::{CreateTemplate, Template, TemplateType, UpdateTemplate};
