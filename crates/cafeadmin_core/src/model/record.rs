//! Record identity shared by every admin list.
//!
//! # Responsibility
//! - Normalize backend identifiers (numeric or textual) into one key type.
//! - Unify the primary `id` field and the legacy `_id` field at the boundary.
//!
//! # Invariants
//! - A `RecordId` is never empty and carries no surrounding whitespace.
//! - `record_id()` prefers the primary field and falls back to the legacy one.

use crate::model::validation::ValidationError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

/// Normalized backend identifier.
///
/// Backends return ids as JSON numbers or strings; both normalize to the same
/// textual key so `7` and `"7"` collide during reconciliation. The original
/// JSON form is kept so the id is sent back exactly as it arrived.
#[derive(Debug, Clone)]
pub struct RecordId {
    text: String,
    form: IdForm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IdForm {
    Number,
    Text,
}

impl RecordId {
    /// Parses a raw identifier, returning `None` for blank input.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self {
            text: trimmed.to_string(),
            form: IdForm::Text,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Numeric view used for natural id ordering.
    ///
    /// Only canonical decimal text qualifies: `"007"` and `"+7"` stay textual.
    pub fn as_number(&self) -> Option<u64> {
        self.text
            .parse::<u64>()
            .ok()
            .filter(|number| number.to_string() == self.text)
    }

    /// Whether the backend sent this id as a JSON number.
    pub fn is_numeric_form(&self) -> bool {
        self.form == IdForm::Number
    }

    fn number(text: String) -> Self {
        Self {
            text,
            form: IdForm::Number,
        }
    }
}

impl PartialEq for RecordId {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for RecordId {}

impl Hash for RecordId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.text.hash(state);
    }
}

impl PartialOrd for RecordId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RecordId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.text.cmp(&other.text)
    }
}

impl Display for RecordId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<u64> for RecordId {
    fn from(value: u64) -> Self {
        Self::number(value.to_string())
    }
}

impl Serialize for RecordId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.form == IdForm::Text {
            return serializer.serialize_str(&self.text);
        }
        if let Ok(value) = self.text.parse::<u64>() {
            serializer.serialize_u64(value)
        } else if let Ok(value) = self.text.parse::<i64>() {
            serializer.serialize_i64(value)
        } else if let Ok(value) = self.text.parse::<f64>() {
            serializer.serialize_f64(value)
        } else {
            serializer.serialize_str(&self.text)
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    Text(String),
}

impl RawId {
    fn normalize(self) -> Option<RecordId> {
        match self {
            Self::Unsigned(value) => Some(RecordId::number(value.to_string())),
            Self::Signed(value) => Some(RecordId::number(value.to_string())),
            Self::Float(value) if value.fract() == 0.0 && value.is_finite() => {
                Some(RecordId::number((value as i64).to_string()))
            }
            Self::Float(value) => Some(RecordId::number(value.to_string())),
            Self::Text(value) => RecordId::parse(&value),
        }
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RawId::deserialize(deserializer)?
            .normalize()
            .ok_or_else(|| serde::de::Error::custom("record id cannot be blank"))
    }
}

/// Lenient optional id decoder: `null`, blanks and absent fields become `None`.
pub(crate) fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<RecordId>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawId>::deserialize(deserializer)?.and_then(RawId::normalize))
}

/// Decodes `null` as the field's default instead of failing the whole row.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// `active` flag decoder: missing or `null` means active.
pub(crate) fn deserialize_active<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(true))
}

/// Backend collections reachable through the admin API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Customers,
    Suppliers,
    Users,
    Sales,
}

impl EntityKind {
    /// Singular human label used in notifications ("customer").
    pub fn singular(self) -> &'static str {
        match self {
            Self::Customers => "customer",
            Self::Suppliers => "supplier",
            Self::Users => "user",
            Self::Sales => "sale",
        }
    }

    /// Plural human label used in notifications ("customers").
    pub fn plural(self) -> &'static str {
        match self {
            Self::Customers => "customers",
            Self::Suppliers => "suppliers",
            Self::Users => "users",
            Self::Sales => "sales",
        }
    }
}

/// Anything carrying a backend identifier in either of the two legacy fields.
pub trait Identified {
    fn primary_id(&self) -> Option<&RecordId>;
    fn legacy_id(&self) -> Option<&RecordId>;

    /// Resolved identifier: primary field first, legacy field second.
    fn record_id(&self) -> Option<&RecordId> {
        self.primary_id().or_else(|| self.legacy_id())
    }
}

/// A record managed by one of the CRUD screens.
pub trait AdminRecord: Identified + Clone + Serialize + DeserializeOwned {
    const KIND: EntityKind;

    /// Primary label, used for name sorting.
    fn display_name(&self) -> &str;

    /// Text fields matched by the screen search box.
    fn search_text(&self) -> Vec<&str>;

    /// Client-side form validation run before any backend call.
    fn validate(&self) -> Result<(), ValidationError>;
}

pub(crate) fn default_active() -> bool {
    true
}
