//! Request shape and the transport seam to the REST backend.

use crate::api::envelope::{ApiEnvelope, TransportError};
use serde_json::Value;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Display for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        })
    }
}

/// One backend call, described independently of any HTTP client.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the API base URL, always starting with `/`.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Post, path).with_body(body)
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Put, path).with_body(body)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Absolute URL for transports that speak HTTP.
    pub fn url(&self, base_url: &str) -> String {
        let mut url = format!("{}{}", base_url.trim_end_matches('/'), self.path);
        for (index, (key, value)) in self.query.iter().enumerate() {
            url.push(if index == 0 { '?' } else { '&' });
            url.push_str(key);
            url.push('=');
            url.push_str(value);
        }
        url
    }
}

/// Delivers requests to the backend and returns its envelope.
///
/// Implementations return `Err` only when no envelope was produced
/// (connection refused, timeout, unreadable body). Business failures travel
/// inside the envelope.
pub trait ApiTransport {
    fn send(&self, request: &ApiRequest) -> Result<ApiEnvelope, TransportError>;
}

impl<T: ApiTransport + ?Sized> ApiTransport for &T {
    fn send(&self, request: &ApiRequest) -> Result<ApiEnvelope, TransportError> {
        (**self).send(request)
    }
}

impl<T: ApiTransport + ?Sized> ApiTransport for Box<T> {
    fn send(&self, request: &ApiRequest) -> Result<ApiEnvelope, TransportError> {
        (**self).send(request)
    }
}
