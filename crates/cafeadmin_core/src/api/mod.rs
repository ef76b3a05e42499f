//! Backend API boundary.
//!
//! # Responsibility
//! - Model the `{success, data, error, message}` envelope.
//! - Define the transport seam and a typed CRUD client on top of it.
//! - Classify failures for user-facing notifications.

pub mod client;
pub mod envelope;
pub mod transport;
