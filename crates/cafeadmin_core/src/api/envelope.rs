//! Backend response envelope and the client error taxonomy.
//!
//! # Invariants
//! - Anything other than `success == true` is a failure, whatever the
//!   transport status code was.
//! - `ApiError::user_message` always returns non-empty text.

use crate::model::validation::ValidationError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Shown when neither the backend nor the transport gave a usable message.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

/// `{success, data?, error?, message?}` response shape shared by all endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiEnvelope {
    pub fn ok(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            ..Self::default()
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// Parses a raw response body.
    pub fn from_json(body: &str) -> Result<Self, ApiError> {
        serde_json::from_str(body).map_err(|err| ApiError::Decode(err.to_string()))
    }

    /// Unwraps `data` for successful responses; business failures become errors.
    pub fn into_data(self) -> Result<Option<Value>, ApiError> {
        if !self.success {
            return Err(ApiError::Backend {
                error: self.error,
                message: self.message,
            });
        }
        Ok(self.data.filter(|data| !data.is_null()))
    }
}

/// Network-level failure reported by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    pub message: String,
    pub status: Option<u16>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(message: impl Into<String>, status: u16) -> Self {
        Self {
            message: message.into(),
            status: Some(status),
        }
    }
}

impl Display for TransportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} (status {status})", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl Error for TransportError {}

/// Failure of a backend round-trip or of its client-side preconditions.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Request never produced an envelope.
    Transport(TransportError),
    /// Envelope arrived with `success != true`.
    Backend {
        error: Option<String>,
        message: Option<String>,
    },
    /// Rejected before any request was sent.
    Validation(ValidationError),
    /// Envelope or payload did not have the expected shape.
    Decode(String),
}

impl ApiError {
    /// Most specific message available for a user-facing notification.
    pub fn user_message(&self) -> String {
        let specific = match self {
            Self::Validation(err) => return err.to_string(),
            Self::Transport(err) => non_blank(Some(err.message.as_str())),
            Self::Backend { error, message } => {
                non_blank(error.as_deref()).or_else(|| non_blank(message.as_deref()))
            }
            Self::Decode(_) => None,
        };
        specific.unwrap_or(GENERIC_FAILURE_MESSAGE).to_string()
    }

    /// Short machine-friendly tag for log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport_failed",
            Self::Backend { .. } => "backend_rejected",
            Self::Validation(_) => "validation_failed",
            Self::Decode(_) => "decode_failed",
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(err) => write!(f, "transport error: {err}"),
            Self::Backend { .. } => write!(f, "backend error: {}", self.user_message()),
            Self::Validation(err) => write!(f, "validation error: {err}"),
            Self::Decode(details) => write!(f, "unexpected response shape: {details}"),
        }
    }
}

impl Error for ApiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Transport(err) => Some(err),
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

fn non_blank(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|text| !text.is_empty())
}

impl From<TransportError> for ApiError {
    fn from(value: TransportError) -> Self {
        Self::Transport(value)
    }
}

impl From<ValidationError> for ApiError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}
