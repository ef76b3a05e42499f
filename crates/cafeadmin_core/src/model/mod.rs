//! Admin domain model.
//!
//! # Responsibility
//! - Define the records exchanged with the admin backend.
//! - Unify backend identifier fields into `RecordId`.
//! - Provide client-side validation for CRUD forms.
//!
//! # Invariants
//! - Every list record resolves its identity through `Identified::record_id`.

pub mod customer;
pub mod record;
pub mod sale;
pub mod supplier;
pub mod user;
pub mod validation;
