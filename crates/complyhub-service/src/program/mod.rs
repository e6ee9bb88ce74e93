//! Compliance program services.

pub mod service;

pub use service::{CreateProgramRequest, CreateRuleRequest, CreateStandardRequest, ProgramService};
