//! Back-office user record.

use crate::model::record::{
    default_active, deserialize_active, deserialize_optional_id, null_as_default, AdminRecord,
    EntityKind, Identified, RecordId,
};
use crate::model::validation::{check_email, check_username, require, ValidationError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Permission tier of a back-office user.
///
/// Decoding is case-insensitive. Roles this client does not know are kept
/// verbatim in `Other` and sent back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UserRole {
    Admin,
    Manager,
    #[default]
    Cashier,
    Other(String),
}

impl UserRole {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Cashier => "cashier",
            Self::Other(role) => role.as_str(),
        }
    }

    fn from_wire(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "cashier" => Self::Cashier,
            "admin" => Self::Admin,
            "manager" => Self::Manager,
            _ => Self::Other(raw.trim().to_string()),
        }
    }
}

impl Serialize for UserRole {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for UserRole {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Option::<String>::deserialize(deserializer)?
            .map(|raw| Self::from_wire(&raw))
            .unwrap_or_default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct User {
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
    pub username: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub role: UserRole,
    #[serde(
        default = "default_active",
        deserialize_with = "deserialize_active"
    )]
    pub active: bool,
}

impl User {
    pub fn draft(username: impl Into<String>, full_name: impl Into<String>, role: UserRole) -> Self {
        Self {
            username: username.into(),
            full_name: full_name.into(),
            role,
            active: true,
            ..Self::default()
        }
    }
}

impl Identified for User {
    fn primary_id(&self) -> Option<&RecordId> {
        self.id.as_ref()
    }

    fn legacy_id(&self) -> Option<&RecordId> {
        self.legacy_id.as_ref()
    }
}

impl AdminRecord for User {
    const KIND: EntityKind = EntityKind::Users;

    fn display_name(&self) -> &str {
        &self.full_name
    }

    fn search_text(&self) -> Vec<&str> {
        [
            Some(self.username.as_str()),
            Some(self.full_name.as_str()),
            self.email.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_username(&self.username)?;
        require("full name", &self.full_name)?;
        check_email(self.email.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::{User, UserRole};
    use crate::model::record::AdminRecord;

    #[test]
    fn role_defaults_to_cashier_when_missing() {
        let user: User = serde_json::from_str(r#"{"id": 1, "username": "luis", "full_name": "Luis"}"#)
            .expect("decode user");
        assert_eq!(user.role, UserRole::Cashier);
    }

    #[test]
    fn role_is_case_insensitive_and_keeps_unknown_values() {
        let user: User = serde_json::from_str(
            r#"{"id": 2, "username": "ana", "full_name": null, "role": "Admin", "active": null}"#,
        )
        .expect("decode user");
        assert_eq!(user.role, UserRole::Admin);
        assert_eq!(user.full_name, "");
        assert!(user.active);

        let user: User = serde_json::from_str(r#"{"id": 3, "role": "supervisor"}"#)
            .expect("decode user with unknown role");
        assert_eq!(user.role, UserRole::Other("supervisor".to_string()));
        let json = serde_json::to_value(&user).expect("encode user");
        assert_eq!(json["role"], "supervisor");
    }

    #[test]
    fn validate_checks_username_format() {
        assert!(User::draft("luis.p", "Luis P", UserRole::Admin).validate().is_ok());
        assert!(User::draft("Luis P", "Luis P", UserRole::Admin).validate().is_err());
        assert!(User::draft("luis", "", UserRole::Admin).validate().is_err());
    }
}
