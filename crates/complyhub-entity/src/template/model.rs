//! Template entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Template category.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "template_type")]
pub enum TemplateType {
    #[serde(rename = "SOP")]
    #[sqlx(rename = "SOP")]
    Sop,
    Policy,
    Checklist,
    #[default]
    Other,
}

text_enum!(TemplateType, "template type", {
    Sop => "SOP",
    Policy => "Policy",
    Checklist => "Checklist",
    Other => "Other",
});

/// Reusable document content linked to parts of the compliance catalogue.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub template_type: TemplateType,
    /// Body text or a URL to it.
    pub content: String,
    pub associated_programs: Vec<Uuid>,
    pub associated_standards: Vec<Uuid>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateTemplate {
    pub name: String,
    pub template_type: TemplateType,
    pub content: String,
    pub associated_programs: Vec<Uuid>,
    pub associated_standards: Vec<Uuid>,
    pub created_by: Uuid,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTemplate {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub template_type: Option<TemplateType>,
    pub content: Option<String>,
    pub associated_programs: Option<Vec<Uuid>>,
    pub associated_standards: Option<Vec<Uuid>>,
}
