//! Account status enumeration.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a user account.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "account_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    /// Normal account.
    #[default]
    Active,
    /// Disabled by the user or an administrator.
    Inactive,
    /// Disabled pending review.
    Suspended,
}

text_enum!(AccountStatus, "account status", {
    Active => "active",
    Inactive => "inactive",
    Suspended => "suspended",
});

impl AccountStatus {
    /// Whether the account may sign in.
    pub fn can_login(&self) -> bool {
        matches!(self, Self::Active)
    }
}
