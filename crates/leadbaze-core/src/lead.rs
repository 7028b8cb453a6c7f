use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::phone::{classify_phone, normalize_phone, PhoneKind};

/// A business contact returned by a directory search or stored in a list.
///
/// Field aliases accept both the generator webhook's snake_case output and
/// the camelCase shape older list rows were saved with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    #[serde(
        default,
        deserialize_with = "de_opt_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: Option<String>,
    /// Directory rating on a 0-5 scale.
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default, alias = "reviews_count", alias = "reviewCount")]
    pub review_count: Option<u32>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default, alias = "business_type")]
    pub category: Option<String>,
    /// Row selection in an interactive table. Never persisted.
    #[serde(skip)]
    pub selected: bool,
}

/// Identity of a lead inside one table or batch.
///
/// Generated leads often have no id yet, so `(name, phone)` stands in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LeadKey {
    Id(String),
    NamePhone { name: String, phone: String },
}

impl Lead {
    #[must_use]
    pub fn key(&self) -> LeadKey {
        match &self.id {
            Some(id) => LeadKey::Id(id.clone()),
            None => LeadKey::NamePhone {
                name: self.name.clone(),
                phone: self.phone.clone().unwrap_or_default(),
            },
        }
    }

    /// Digits-only phone, or `None` when the lead has no usable phone.
    #[must_use]
    pub fn normalized_phone(&self) -> Option<String> {
        self.phone
            .as_deref()
            .map(normalize_phone)
            .filter(|digits| !digits.is_empty())
    }

    #[must_use]
    pub fn phone_kind(&self) -> PhoneKind {
        self.phone
            .as_deref()
            .map_or(PhoneKind::Unclassified, classify_phone)
    }

    #[must_use]
    pub fn has_website(&self) -> bool {
        self.website.as_deref().is_some_and(|w| !w.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListStatus {
    #[default]
    Active,
    Archived,
}

impl std::fmt::Display for ListStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListStatus::Active => write!(f, "active"),
            ListStatus::Archived => write!(f, "archived"),
        }
    }
}

/// A named, owned collection of leads as stored by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadList {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub status: ListStatus,
    #[serde(default)]
    pub total_leads: u32,
    #[serde(default)]
    pub leads: Vec<Lead>,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewLeadList {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Accepts `"abc"`, `42`, or `null` and yields `Option<String>`.
fn de_opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        Str(String),
        Int(i64),
        Float(f64),
    }

    Ok(
        Option::<StringOrNumber>::deserialize(deserializer)?.map(|v| match v {
            StringOrNumber::Str(s) => s,
            StringOrNumber::Int(n) => n.to_string(),
            StringOrNumber::Float(n) => n.to_string(),
        }),
    )
}
