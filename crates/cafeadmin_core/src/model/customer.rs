//! Customer record as exchanged with the admin backend.

use crate::model::record::{
    default_active, deserialize_active, deserialize_optional_id, null_as_default, AdminRecord,
    EntityKind, Identified, RecordId,
};
use crate::model::validation::{check_email, check_phone, require, ValidationError};
use serde::{Deserialize, Serialize};

/// Customer row shown on the customers screen.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Customer {
    #[serde(
        default,
        deserialize_with = "deserialize_optional_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    /// Identifier field still emitted by older backend rows.
    #[serde(
        rename = "_id",
        default,
        deserialize_with = "deserialize_optional_id",
        skip_serializing
    )]
    pub legacy_id: Option<RecordId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(
        default = "default_active",
        deserialize_with = "deserialize_active"
    )]
    pub active: bool,
}

impl Customer {
    /// Creates an unsaved customer draft.
    pub fn draft(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            active: true,
            ..Self::default()
        }
    }
}

impl Identified for Customer {
    fn primary_id(&self) -> Option<&RecordId> {
        self.id.as_ref()
    }

    fn legacy_id(&self) -> Option<&RecordId> {
        self.legacy_id.as_ref()
    }
}

impl AdminRecord for Customer {
    const KIND: EntityKind = EntityKind::Customers;

    fn display_name(&self) -> &str {
        &self.name
    }

    fn search_text(&self) -> Vec<&str> {
        [
            Some(self.name.as_str()),
            self.email.as_deref(),
            self.phone.as_deref(),
            self.document_number.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)?;
        check_email(self.email.as_deref())?;
        check_phone(self.phone.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::Customer;
    use crate::model::record::{AdminRecord, Identified, RecordId};

    #[test]
    fn legacy_id_is_used_when_primary_is_missing() {
        let customer: Customer =
            serde_json::from_str(r#"{"_id": 12, "name": "Ana"}"#).expect("decode customer");
        assert!(customer.id.is_none());
        assert_eq!(customer.record_id(), RecordId::parse("12").as_ref());
        assert!(customer.active);
    }

    #[test]
    fn primary_id_wins_over_legacy() {
        let customer: Customer = serde_json::from_str(r#"{"id": "3", "_id": 12, "name": "Ana"}"#)
            .expect("decode customer");
        assert_eq!(customer.record_id(), RecordId::parse("3").as_ref());
    }

    #[test]
    fn legacy_id_is_not_sent_back() {
        let mut customer = Customer::draft("Ana");
        customer.legacy_id = RecordId::parse("12");
        let json = serde_json::to_value(&customer).expect("encode customer");
        assert!(json.get("_id").is_none());
        assert!(json.get("id").is_none());
    }

    #[test]
    fn validate_requires_name_and_checks_contact() {
        assert!(Customer::draft(" ").validate().is_err());
        let mut customer = Customer::draft("Ana");
        customer.email = Some("not-an-email".to_string());
        assert!(customer.validate().is_err());
        customer.email = Some("ana@cafe.example".to_string());
        assert!(customer.validate().is_ok());
    }
}
