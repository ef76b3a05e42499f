//! Transient user notifications ("toasts").
//!
//! The store owns every notification; renderers read `visible()` and listen
//! on `subscribe()` for changes.

pub mod store;
