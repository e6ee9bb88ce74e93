//! Compliance catalogue: programs, their rules, and their standards.

pub mod model;
pub mod rule;
pub mod standard;

pub use model::{
    CreateProgram, Program, ProgramCascade, ProgramOverview, RuleWithStandards, UpdateProgram,
};
pub use rule::{CreateRule, Rule, UpdateRule};
pub use standard::{CreateStandard, Standard, StandardPriority, StandardType, UpdateStandard};
