//! Notification queue with auto-expiry.
//!
//! # Invariants
//! - Ids are unique and strictly increasing for the lifetime of a store.
//! - Entries keep insertion order.
//! - An entry past its deadline is never reported as visible, even before
//!   `sweep` physically removes it.
//! - `remove` on an unknown id is a no-op.

use crate::clock::Clock;
use crate::config::DEFAULT_NOTIFICATION_DURATION_MS;
use log::debug;
use std::fmt::{Display, Formatter};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NotificationId(u64);

impl NotificationId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl Display for NotificationId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Success,
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: NotificationId,
    pub message: String,
    pub severity: Severity,
    /// Display time in milliseconds; `0` keeps the entry until dismissed.
    pub duration_ms: u64,
    pub created_at_ms: i64,
}

impl Notification {
    pub fn is_persistent(&self) -> bool {
        self.duration_ms == 0
    }

    pub fn expires_at_ms(&self) -> Option<i64> {
        if self.is_persistent() {
            return None;
        }
        let duration = i64::try_from(self.duration_ms).unwrap_or(i64::MAX);
        Some(self.created_at_ms.saturating_add(duration))
    }

    fn is_expired(&self, now_ms: i64) -> bool {
        self.expires_at_ms().is_some_and(|deadline| now_ms >= deadline)
    }
}

/// Change feed consumed by renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationChange {
    Added(NotificationId),
    Removed(NotificationId),
}

pub struct NotificationStore {
    entries: Vec<Notification>,
    next_id: u64,
    default_duration_ms: u64,
    clock: Arc<dyn Clock>,
    subscribers: Vec<Sender<NotificationChange>>,
}

impl NotificationStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_default_duration(clock, DEFAULT_NOTIFICATION_DURATION_MS)
    }

    pub fn with_default_duration(clock: Arc<dyn Clock>, default_duration_ms: u64) -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
            default_duration_ms,
            clock,
            subscribers: Vec::new(),
        }
    }

    /// Queues a message and returns its id.
    ///
    /// A non-zero `duration_ms` arms the expiry deadline immediately.
    pub fn show(
        &mut self,
        message: impl Into<String>,
        severity: Severity,
        duration_ms: u64,
    ) -> NotificationId {
        let id = NotificationId(self.next_id);
        self.next_id += 1;
        self.entries.push(Notification {
            id,
            message: message.into(),
            severity,
            duration_ms,
            created_at_ms: self.clock.now_ms(),
        });
        debug!(
            "event=notification_show module=notify id={} severity={} duration_ms={}",
            id,
            severity.as_str(),
            duration_ms
        );
        self.publish(NotificationChange::Added(id));
        id
    }

    pub fn show_default(&mut self, message: impl Into<String>, severity: Severity) -> NotificationId {
        self.show(message, severity, self.default_duration_ms)
    }

    pub fn success(&mut self, message: impl Into<String>) -> NotificationId {
        self.show_default(message, Severity::Success)
    }

    pub fn error(&mut self, message: impl Into<String>) -> NotificationId {
        self.show_default(message, Severity::Error)
    }

    pub fn warning(&mut self, message: impl Into<String>) -> NotificationId {
        self.show_default(message, Severity::Warning)
    }

    pub fn info(&mut self, message: impl Into<String>) -> NotificationId {
        self.show_default(message, Severity::Info)
    }

    /// Dismisses one entry. Returns whether anything was removed.
    pub fn remove(&mut self, id: NotificationId) -> bool {
        let Some(index) = self.entries.iter().position(|entry| entry.id == id) else {
            return false;
        };
        self.entries.remove(index);
        self.publish(NotificationChange::Removed(id));
        true
    }

    /// Drops every expired entry and returns the removed ids.
    pub fn sweep(&mut self) -> Vec<NotificationId> {
        let now = self.clock.now_ms();
        let expired: Vec<NotificationId> = self
            .entries
            .iter()
            .filter(|entry| entry.is_expired(now))
            .map(|entry| entry.id)
            .collect();
        for id in &expired {
            self.remove(*id);
        }
        expired
    }

    /// Entries that have not expired, oldest first.
    pub fn visible(&self) -> Vec<&Notification> {
        let now = self.clock.now_ms();
        self.entries
            .iter()
            .filter(|entry| !entry.is_expired(now))
            .collect()
    }

    pub fn get(&self, id: NotificationId) -> Option<&Notification> {
        let now = self.clock.now_ms();
        self.entries
            .iter()
            .find(|entry| entry.id == id && !entry.is_expired(now))
    }

    pub fn contains(&self, id: NotificationId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.visible().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Earliest pending deadline, for scheduling the next `sweep`.
    pub fn next_deadline_ms(&self) -> Option<i64> {
        self.entries
            .iter()
            .filter_map(Notification::expires_at_ms)
            .min()
    }

    pub fn default_duration_ms(&self) -> u64 {
        self.default_duration_ms
    }

    pub fn subscribe(&mut self) -> Receiver<NotificationChange> {
        let (sender, receiver) = channel();
        self.subscribers.push(sender);
        receiver
    }

    fn publish(&mut self, change: NotificationChange) {
        self.subscribers
            .retain(|subscriber| subscriber.send(change).is_ok());
    }
}
