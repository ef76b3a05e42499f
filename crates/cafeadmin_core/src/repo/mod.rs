//! Persistence contracts for client-side state.
//!
//! # Responsibility
//! - Define storage seams used by stateful services.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Repository APIs surface storage failures as typed errors, never panics.

pub mod kv_repo;
