//! Supplier record as exchanged with the admin backend.

use crate::model::record::{
    default_active, deserialize_active, deserialize_optional_id, null_as_default, AdminRecord,
    EntityKind, Identified, RecordId,
};
use crate::model::validation::{check_email, check_phone, check_tax_id, require, ValidationError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Supplier {
    #[serde(
        default,
        deserialize_with = "deserialize_optional_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
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
    pub contact_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(
        default = "default_active",
        deserialize_with = "deserialize_active"
    )]
    pub active: bool,
}

impl Supplier {
    pub fn draft(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            active: true,
            ..Self::default()
        }
    }
}

impl Identified for Supplier {
    fn primary_id(&self) -> Option<&RecordId> {
        self.id.as_ref()
    }

    fn legacy_id(&self) -> Option<&RecordId> {
        self.legacy_id.as_ref()
    }
}

impl AdminRecord for Supplier {
    const KIND: EntityKind = EntityKind::Suppliers;

    fn display_name(&self) -> &str {
        &self.name
    }

    fn search_text(&self) -> Vec<&str> {
        [
            Some(self.name.as_str()),
            self.contact_name.as_deref(),
            self.email.as_deref(),
            self.tax_id.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)?;
        check_email(self.email.as_deref())?;
        check_phone(self.phone.as_deref())?;
        check_tax_id(self.tax_id.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::Supplier;
    use crate::model::record::AdminRecord;

    #[test]
    fn search_text_includes_contact_and_tax_id() {
        let mut supplier = Supplier::draft("Lácteos del Valle");
        supplier.contact_name = Some("Marta".to_string());
        supplier.tax_id = Some("900123456-7".to_string());
        let text = supplier.search_text();
        assert!(text.contains(&"Marta"));
        assert!(text.contains(&"900123456-7"));
    }

    #[test]
    fn validate_rejects_malformed_tax_id() {
        let mut supplier = Supplier::draft("Panadería Sol");
        supplier.tax_id = Some("x".to_string());
        assert!(supplier.validate().is_err());
    }
}
