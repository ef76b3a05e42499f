//! Runtime configuration for the admin client core.
//!
//! Values come from `CAFEADMIN_*` environment variables; every missing value
//! falls back to a logged default. Malformed values are reported as errors.

use crate::model::record::EntityKind;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DEFAULT_NOTIFICATION_DURATION_MS: u64 = 4_000;
pub const DEFAULT_CASH_STATE_KEY: &str = "cash_register_state";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Invalid {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid { key, value, reason } => {
                write!(f, "invalid {key} value `{value}`: {reason}")
            }
        }
    }
}

impl Error for ConfigError {}

/// REST collection paths, relative to the API base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub customers: String,
    pub suppliers: String,
    pub users: String,
    pub sales: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            customers: "/customers".to_string(),
            suppliers: "/suppliers".to_string(),
            users: "/users".to_string(),
            sales: "/sales".to_string(),
        }
    }
}

impl Endpoints {
    pub fn collection(&self, kind: EntityKind) -> &str {
        match kind {
            EntityKind::Customers => &self.customers,
            EntityKind::Suppliers => &self.suppliers,
            EntityKind::Users => &self.users,
            EntityKind::Sales => &self.sales,
        }
    }

    pub fn item(&self, kind: EntityKind, id: &str) -> String {
        format!("{}/{}", self.collection(kind), id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminConfig {
    pub api_base_url: String,
    pub endpoints: Endpoints,
    pub notification_duration_ms: u64,
    pub cash_state_key: String,
    /// SQLite file for persisted client state; in-memory when unset.
    pub db_path: Option<PathBuf>,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3000/api".to_string(),
            endpoints: Endpoints::default(),
            notification_duration_ms: DEFAULT_NOTIFICATION_DURATION_MS,
            cash_state_key: DEFAULT_CASH_STATE_KEY.to_string(),
            db_path: None,
        }
    }
}

impl AdminConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let load = |key: &'static str, default: &str| -> String {
            match lookup(key).map(|value| value.trim().to_string()) {
                Some(value) if !value.is_empty() => value,
                _ => {
                    info!("event=config_default module=config key={key} value={default}");
                    default.to_string()
                }
            }
        };

        let api_base_url = load("CAFEADMIN_API_BASE", &defaults.api_base_url)
            .trim_end_matches('/')
            .to_string();
        let endpoints = Endpoints {
            customers: endpoint_path(
                "CAFEADMIN_CUSTOMERS_PATH",
                load("CAFEADMIN_CUSTOMERS_PATH", &defaults.endpoints.customers),
            )?,
            suppliers: endpoint_path(
                "CAFEADMIN_SUPPLIERS_PATH",
                load("CAFEADMIN_SUPPLIERS_PATH", &defaults.endpoints.suppliers),
            )?,
            users: endpoint_path(
                "CAFEADMIN_USERS_PATH",
                load("CAFEADMIN_USERS_PATH", &defaults.endpoints.users),
            )?,
            sales: endpoint_path(
                "CAFEADMIN_SALES_PATH",
                load("CAFEADMIN_SALES_PATH", &defaults.endpoints.sales),
            )?,
        };

        let duration_text = load(
            "CAFEADMIN_TOAST_MS",
            &defaults.notification_duration_ms.to_string(),
        );
        let notification_duration_ms = duration_text.parse::<u64>().map_err(|_| {
            warn!("event=config_invalid module=config key=CAFEADMIN_TOAST_MS");
            ConfigError::Invalid {
                key: "CAFEADMIN_TOAST_MS",
                value: duration_text.clone(),
                reason: "expected a non-negative integer of milliseconds",
            }
        })?;

        let cash_state_key = load("CAFEADMIN_CASH_KEY", &defaults.cash_state_key);
        let db_path = lookup("CAFEADMIN_DB_PATH")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            api_base_url,
            endpoints,
            notification_duration_ms,
            cash_state_key,
            db_path,
        })
    }
}

fn endpoint_path(key: &'static str, value: String) -> Result<String, ConfigError> {
    if !value.starts_with('/') {
        warn!("event=config_invalid module=config key={key}");
        return Err(ConfigError::Invalid {
            key,
            value,
            reason: "endpoint paths must start with `/`",
        });
    }
    let trimmed = value.trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid {
            key,
            value,
            reason: "endpoint path cannot be the root",
        });
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::{AdminConfig, ConfigError, DEFAULT_NOTIFICATION_DURATION_MS};
    use crate::model::record::EntityKind;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_lookup_yields_defaults() {
        let config = AdminConfig::from_lookup(|_| None).expect("defaults");
        assert_eq!(config, AdminConfig::default());
        assert_eq!(
            config.notification_duration_ms,
            DEFAULT_NOTIFICATION_DURATION_MS
        );
    }

    #[test]
    fn overrides_are_normalized() {
        let config = AdminConfig::from_lookup(lookup_from(&[
            ("CAFEADMIN_API_BASE", "https://pos.example/api/"),
            ("CAFEADMIN_CUSTOMERS_PATH", "/clientes/"),
            ("CAFEADMIN_TOAST_MS", "2500"),
            ("CAFEADMIN_DB_PATH", "/tmp/cafeadmin.sqlite3"),
        ]))
        .expect("config");
        assert_eq!(config.api_base_url, "https://pos.example/api");
        assert_eq!(config.endpoints.collection(EntityKind::Customers), "/clientes");
        assert_eq!(config.endpoints.item(EntityKind::Customers, "7"), "/clientes/7");
        assert_eq!(config.notification_duration_ms, 2_500);
        assert!(config.db_path.is_some());
    }

    #[test]
    fn malformed_values_are_rejected() {
        let err = AdminConfig::from_lookup(lookup_from(&[("CAFEADMIN_TOAST_MS", "soon")]))
            .expect_err("bad duration");
        assert!(matches!(err, ConfigError::Invalid { key: "CAFEADMIN_TOAST_MS", .. }));

        let err = AdminConfig::from_lookup(lookup_from(&[("CAFEADMIN_USERS_PATH", "users")]))
            .expect_err("relative path");
        assert!(err.to_string().contains("must start with"));
    }
}
