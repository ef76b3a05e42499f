//! Typed publish/subscribe channel for cash-state changes.
//!
//! Same-context listeners and storage-driven listeners receive the same
//! `CashEvent` type; `origin` tells them how it arrived.

use crate::cash::state::CashState;
use log::debug;
use std::sync::mpsc::{channel, Receiver, Sender};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOrigin {
    /// Published by the context that made the change.
    Local,
    /// Observed through the shared persisted state.
    Storage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CashChange {
    Initialized,
    SaleRecorded,
    Reset,
    /// Another context wrote the state; the exact operation is unknown.
    Replaced,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CashEvent {
    pub change: CashChange,
    /// Delta carried by `SaleRecorded` events.
    pub sale_total: Option<i64>,
    /// State after the change; `None` once reset.
    pub state: Option<CashState>,
    pub origin: EventOrigin,
    pub revision: i64,
}

impl CashEvent {
    /// State as the JSON text stored in the key-value store.
    pub fn serialized_state(&self) -> Option<String> {
        self.state
            .as_ref()
            .and_then(|state| serde_json::to_string(state).ok())
    }
}

#[derive(Default)]
pub struct CashEventBus {
    subscribers: Vec<Sender<CashEvent>>,
}

impl CashEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> Receiver<CashEvent> {
        let (sender, receiver) = channel();
        self.subscribers.push(sender);
        receiver
    }

    /// Delivers `event` to live subscribers and returns how many got it.
    pub fn publish(&mut self, event: &CashEvent) -> usize {
        self.subscribers
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
        debug!(
            "event=cash_publish module=cash change={:?} origin={:?} revision={} subscribers={}",
            event.change,
            event.origin,
            event.revision,
            self.subscribers.len()
        );
        self.subscribers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
