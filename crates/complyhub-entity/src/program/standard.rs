//! Program standard entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Relative importance of a standard.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "standard_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum StandardPriority {
    High,
    #[default]
    Medium,
    Low,
}

text_enum!(StandardPriority, "standard priority", {
    High => "high",
    Medium => "medium",
    Low => "low",
});

/// Control family a standard belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "standard_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum StandardType {
    Administrative,
    Technical,
    Physical,
    #[default]
    General,
}

text_enum!(StandardType, "standard type", {
    Administrative => "administrative",
    Technical => "technical",
    Physical => "physical",
    General => "general",
});

/// A standard within a program, optionally filed under one of the
/// program's rules.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Standard {
    pub id: Uuid,
    pub program_id: Uuid,
    /// Must reference a rule of the same program.
    pub program_rule_id: Option<Uuid>,
    pub label: String,
    pub title: String,
    pub description: Option<String>,
    pub priority: StandardPriority,
    #[serde(rename = "type")]
    pub standard_type: StandardType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateStandard {
    pub program_id: Uuid,
    pub program_rule_id: Option<Uuid>,
    pub label: String,
    pub title: String,
    pub description: Option<String>,
    pub priority: StandardPriority,
    pub standard_type: StandardType,
}

/// Whitelisted standard fields. `program_rule_id: Some(None)` detaches the
/// standard from its rule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStandard {
    #[serde(default, with = "double_option")]
    pub program_rule_id: Option<Option<Uuid>>,
    pub label: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<StandardPriority>,
    #[serde(rename = "type")]
    pub standard_type: Option<StandardType>,
}

mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<T: Serialize, S: Serializer>(
        value: &Option<Option<T>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, T: Deserialize<'de>, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Option<T>>, D::Error> {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_distinguishes_null_from_absent() {
        let absent: UpdateStandard = serde_json::from_str(r#"{"title":"x"}"#).expect("parse");
        assert_eq!(absent.program_rule_id, None);

        let cleared: UpdateStandard =
            serde_json::from_str(r#"{"programRuleId":null}"#).expect("parse");
        assert_eq!(cleared.program_rule_id, Some(None));
    }

    #[test]
    fn enum_defaults() {
        assert_eq!(StandardPriority::default(), StandardPriority::Medium);
        assert_eq!(StandardType::default(), StandardType::General);
        assert!("urgent".parse::<StandardPriority>().is_err());
    }
}
