//! Compliance program entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::rule::Rule;
use super::standard::Standard;

/// A compliance program such as ISO 27001 or HIPAA.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    pub id: Uuid,
    /// Unique name.
    pub name: String,
    pub description: Option<String>,
    pub industry: String,
    /// Inactive programs are hidden from organizations but keep their rules.
    pub is_active: bool,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data required to create a program.
#[derive(Debug, Clone)]
pub struct CreateProgram {
    pub name: String,
    pub description: Option<String>,
    pub industry: String,
    pub created_by: Uuid,
}

/// Whitelisted program fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProgram {
    pub name: Option<String>,
    pub description: Option<String>,
    pub industry: Option<String>,
}

/// A rule and the standards filed under it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleWithStandards {
    #[serde(flatten)]
    pub rule: Rule,
    pub standards: Vec<Standard>,
}

/// A program with its complete rule/standard tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramOverview {
    #[serde(flatten)]
    pub program: Program,
    pub rules: Vec<RuleWithStandards>,
    /// Standards attached directly to the program rather than to a rule.
    pub standalone_standards: Vec<Standard>,
}

/// Row counts removed by a cascading delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramCascade {
    pub rules_deleted: u64,
    pub standards_deleted: u64,
}
