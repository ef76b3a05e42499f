//! Typed CRUD client over an `ApiTransport`.
//!
//! # Responsibility
//! - Build requests from configured endpoint paths.
//! - Decode envelopes into typed records.
//! - Emit one `api_request` log event per call.
//!
//! # Invariants
//! - List requests carry a `_t` cache-busting timestamp.
//! - Missing or `null` fields decode to defaults; only elements that still
//!   cannot be read are skipped, and they are counted, never fatal to the
//!   whole list.

use crate::api::envelope::ApiError;
use crate::api::transport::{ApiRequest, ApiTransport};
use crate::clock::Clock;
use crate::config::Endpoints;
use crate::model::record::{AdminRecord, EntityKind, RecordId};
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

/// Decoded list payload plus the number of elements that could not be read.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedList<D> {
    pub records: Vec<D>,
    pub malformed: usize,
}

impl<D> From<Vec<D>> for FetchedList<D> {
    fn from(records: Vec<D>) -> Self {
        Self {
            records,
            malformed: 0,
        }
    }
}

pub struct RecordClient<T: ApiTransport> {
    transport: T,
    endpoints: Endpoints,
    clock: Arc<dyn Clock>,
}

impl<T: ApiTransport> RecordClient<T> {
    pub fn new(transport: T, endpoints: Endpoints, clock: Arc<dyn Clock>) -> Self {
        Self {
            transport,
            endpoints,
            clock,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Fetches the full collection for `R`.
    pub fn list<R: AdminRecord>(&self) -> Result<Vec<R>, ApiError> {
        self.list_kind(R::KIND)
    }

    pub fn list_kind<D: DeserializeOwned>(&self, kind: EntityKind) -> Result<Vec<D>, ApiError> {
        self.fetch_kind(kind).map(|fetched| fetched.records)
    }

    /// Like `list`, but also reports how many elements were unreadable.
    pub fn fetch<R: AdminRecord>(&self) -> Result<FetchedList<R>, ApiError> {
        self.fetch_kind(R::KIND)
    }

    pub fn fetch_kind<D: DeserializeOwned>(
        &self,
        kind: EntityKind,
    ) -> Result<FetchedList<D>, ApiError> {
        let request = ApiRequest::get(self.endpoints.collection(kind))
            .with_query("_t", self.clock.now_ms().to_string());
        let data = self.execute(&request)?;
        decode_list(kind, data)
    }

    pub fn get<R: AdminRecord>(&self, id: &RecordId) -> Result<Option<R>, ApiError> {
        self.get_kind(R::KIND, id)
    }

    pub fn get_kind<D: DeserializeOwned>(
        &self,
        kind: EntityKind,
        id: &RecordId,
    ) -> Result<Option<D>, ApiError> {
        let request = ApiRequest::get(self.endpoints.item(kind, id.as_str()));
        let data = self.execute(&request)?;
        match data {
            Some(value @ Value::Object(_)) => serde_json::from_value(value)
                .map(Some)
                .map_err(|err| ApiError::Decode(err.to_string())),
            Some(_) => Err(ApiError::Decode(format!(
                "expected one {} object",
                kind.singular()
            ))),
            None => Ok(None),
        }
    }

    /// Creates a record and returns the authoritative copy when the backend
    /// echoes one.
    pub fn create<R: AdminRecord>(&self, draft: &R) -> Result<Option<R>, ApiError> {
        let body = encode(draft)?;
        let request = ApiRequest::post(self.endpoints.collection(R::KIND), body);
        self.execute(&request).map(decode_echo::<R>)
    }

    pub fn update<R: AdminRecord>(&self, id: &RecordId, draft: &R) -> Result<Option<R>, ApiError> {
        let body = encode(draft)?;
        let request = ApiRequest::put(self.endpoints.item(R::KIND, id.as_str()), body);
        self.execute(&request).map(decode_echo::<R>)
    }

    pub fn delete(&self, kind: EntityKind, id: &RecordId) -> Result<(), ApiError> {
        let request = ApiRequest::delete(self.endpoints.item(kind, id.as_str()));
        self.execute(&request).map(|_| ())
    }

    fn execute(&self, request: &ApiRequest) -> Result<Option<Value>, ApiError> {
        let started_at = Instant::now();
        let outcome = self
            .transport
            .send(request)
            .map_err(ApiError::from)
            .and_then(|envelope| envelope.into_data());

        match &outcome {
            Ok(_) => info!(
                "event=api_request module=api status=ok method={} path={} duration_ms={}",
                request.method,
                request.path,
                started_at.elapsed().as_millis()
            ),
            Err(err) => warn!(
                "event=api_request module=api status=error method={} path={} duration_ms={} error_code={}",
                request.method,
                request.path,
                started_at.elapsed().as_millis(),
                err.code()
            ),
        }
        outcome
    }
}

fn encode<R: AdminRecord>(draft: &R) -> Result<Value, ApiError> {
    serde_json::to_value(draft).map_err(|err| ApiError::Decode(err.to_string()))
}

fn decode_list<D: DeserializeOwned>(
    kind: EntityKind,
    data: Option<Value>,
) -> Result<FetchedList<D>, ApiError> {
    let items = match data {
        None => return Ok(FetchedList::from(Vec::new())),
        Some(Value::Array(items)) => items,
        Some(_) => {
            return Err(ApiError::Decode(format!(
                "expected a list of {}",
                kind.plural()
            )))
        }
    };

    let mut fetched = FetchedList::from(Vec::with_capacity(items.len()));
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value(item) {
            Ok(record) => fetched.records.push(record),
            Err(err) => {
                fetched.malformed += 1;
                warn!(
                    "event=api_decode module=api status=skipped kind={} index={index} line={} column={}",
                    kind.plural(),
                    err.line(),
                    err.column()
                );
            }
        }
    }
    Ok(fetched)
}

fn decode_echo<R: AdminRecord>(data: Option<Value>) -> Option<R> {
    match data {
        Some(value @ Value::Object(_)) => serde_json::from_value(value).ok(),
        Some(_) => {
            debug!(
                "event=api_decode module=api status=skipped kind={} reason=non_object_echo",
                R::KIND.plural()
            );
            None
        }
        None => None,
    }
}
