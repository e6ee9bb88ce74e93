//! Organization entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use uuid::Uuid;

use super::billing::BillingInfo;

/// Default retention of documents, in days.
pub const DEFAULT_DATA_RETENTION_DAYS: i32 = 365;

/// Lifecycle state of an organization.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "organization_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrganizationStatus {
    #[default]
    Active,
    Inactive,
    Suspended,
}

text_enum!(OrganizationStatus, "organization status", {
    Active => "active",
    Inactive => "inactive",
    Suspended => "suspended",
});

/// Tenant-level settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationSettings {
    /// Compliance programs whose templates the organization can use.
    pub compliance_programs_enabled: Vec<Uuid>,
    /// Days documents are retained.
    pub data_retention_period: i32,
    /// Allowed client addresses or CIDR ranges.
    pub ip_restrictions: Vec<String>,
}

impl Default for OrganizationSettings {
    fn default() -> Self {
        Self {
            compliance_programs_enabled: Vec::new(),
            data_retention_period: DEFAULT_DATA_RETENTION_DAYS,
            ip_restrictions: Vec::new(),
        }
    }
}

/// A tenant: owns members, teams, folders and documents.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    /// Unique identifier.
    pub id: Uuid,
    /// Unique display name.
    pub name: String,
    /// Free-text description.
    pub description: Option<String>,
    /// Logo image URL.
    pub logo_url: Option<String>,
    /// Billing details.
    pub billing_info: Json<BillingInfo>,
    /// Tenant settings.
    #[sqlx(flatten)]
    pub settings: OrganizationSettings,
    /// Lifecycle state.
    pub status: OrganizationStatus,
    /// User who created the organization.
    pub created_by: Uuid,
    /// When the organization was created.
    pub created_at: DateTime<Utc>,
    /// When the organization was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data required to create an organization.
#[derive(Debug, Clone)]
pub struct CreateOrganization {
    pub name: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub billing_info: BillingInfo,
    pub settings: OrganizationSettings,
    pub created_by: Uuid,
}

/// Whitelisted organization fields an owner or admin may change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrganization {
    pub name: Option<String>,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub billing_info: Option<BillingInfo>,
    pub compliance_programs_enabled: Option<Vec<Uuid>>,
    pub data_retention_period: Option<i32>,
    pub ip_restrictions: Option<Vec<String>>,
    pub status: Option<OrganizationStatus>,
}
