//! Per-screen list state machines.

pub mod list_screen;
