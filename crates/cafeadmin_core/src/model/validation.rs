//! Client-side form validation.
//!
//! # Invariants
//! - Validation never performs I/O; failures are caught before any request.
//! - Optional fields are only checked when present and non-blank.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}$").expect("valid email regex")
});
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9 ()\-]{7,20}$").expect("valid phone regex"));
static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9_.]{3,32}$").expect("valid username regex"));
static TAX_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9A-Za-z\-]{5,20}$").expect("valid tax id regex"));

const PHONE_MIN_DIGITS: usize = 7;

/// Form validation failure surfaced as a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required field is missing or blank.
    Required(&'static str),
    InvalidEmail(String),
    InvalidPhone(String),
    /// Field present but not in the accepted format.
    InvalidFormat {
        field: &'static str,
        value: String,
    },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Required(field) => write!(f, "{field} is required"),
            Self::InvalidEmail(value) => write!(f, "invalid email address: `{value}`"),
            Self::InvalidPhone(value) => write!(f, "invalid phone number: `{value}`"),
            Self::InvalidFormat { field, value } => write!(f, "invalid {field}: `{value}`"),
        }
    }
}

impl Error for ValidationError {}

pub fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required(field));
    }
    Ok(())
}

pub fn check_email(value: Option<&str>) -> Result<(), ValidationError> {
    match present(value) {
        Some(email) if !EMAIL_RE.is_match(email) => {
            Err(ValidationError::InvalidEmail(email.to_string()))
        }
        _ => Ok(()),
    }
}

pub fn check_phone(value: Option<&str>) -> Result<(), ValidationError> {
    let Some(phone) = present(value) else {
        return Ok(());
    };
    let digits = phone.chars().filter(char::is_ascii_digit).count();
    if !PHONE_RE.is_match(phone) || digits < PHONE_MIN_DIGITS {
        return Err(ValidationError::InvalidPhone(phone.to_string()));
    }
    Ok(())
}

pub fn check_username(value: &str) -> Result<(), ValidationError> {
    require("username", value)?;
    if !USERNAME_RE.is_match(value.trim()) {
        return Err(ValidationError::InvalidFormat {
            field: "username",
            value: value.to_string(),
        });
    }
    Ok(())
}

pub fn check_tax_id(value: Option<&str>) -> Result<(), ValidationError> {
    match present(value) {
        Some(tax_id) if !TAX_ID_RE.is_match(tax_id) => Err(ValidationError::InvalidFormat {
            field: "tax id",
            value: tax_id.to_string(),
        }),
        _ => Ok(()),
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
