//! Simulated cash register shared between views through persisted state.

pub mod bus;
pub mod simulator;
pub mod state;
