//! Client-side state core for the cafeteria administration screens.
//!
//! Owns the pieces every CRUD screen shares: the notification queue, list
//! reconciliation, the fetch/mutate/refresh cycle, and the simulated cash
//! register used to verify cross-view synchronization.

pub mod api;
pub mod cash;
pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod notify;
pub mod reconcile;
pub mod repo;
pub mod screen;
pub mod service;

pub use api::client::{FetchedList, RecordClient};
pub use api::envelope::{ApiEnvelope, ApiError, TransportError, GENERIC_FAILURE_MESSAGE};
pub use api::transport::{ApiRequest, ApiTransport, Method};
pub use cash::bus::{CashChange, CashEvent, CashEventBus, EventOrigin};
pub use cash::simulator::{CashError, CashRegisterSimulator};
pub use cash::state::{CashMovement, CashState, TenderTotals, TenderType};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{AdminConfig, ConfigError, Endpoints};
pub use logging::{init_logging, logging_status, LogLevel, LoggingError};
pub use model::customer::Customer;
pub use model::record::{AdminRecord, EntityKind, Identified, RecordId};
pub use model::sale::{PurchaseHistoryEntry, SaleDetail, SaleHeader, SaleLine};
pub use model::supplier::Supplier;
pub use model::user::{User, UserRole};
pub use model::validation::ValidationError;
pub use notify::store::{
    Notification, NotificationChange, NotificationId, NotificationStore, Severity,
};
pub use reconcile::{
    reconcile, reconcile_with_report, ListFilter, ReconcileReport, SortDirection, SortField,
};
pub use repo::kv_repo::{KvEntry, KvError, KvResult, KvStore, SqliteKvStore};
pub use screen::list_screen::{FetchTicket, ListScreen, LoadOutcome, LoadState, ModalState};
pub use service::history::PurchaseHistoryService;

/// Minimal health-check used by the CLI probe.
pub fn ping() -> &'static str {
    "pong"
}

pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
