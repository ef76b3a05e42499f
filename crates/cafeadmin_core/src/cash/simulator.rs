//! Cash-register event simulator used to exercise cross-view sync.
//!
//! # Responsibility
//! - Own the persisted cash state under one key.
//! - Book simulated sales against an open register.
//! - Publish every change on the typed bus, locally and, via `poll_storage`,
//!   to contexts that only share the store.
//!
//! # Invariants
//! - `simulate` on a closed or missing register mutates nothing.
//! - A sale that would overflow a total is rejected before anything is
//!   persisted.
//! - A context never re-delivers its own writes through `poll_storage`.
//! - Read-modify-write is atomic within one context only.

use crate::cash::bus::{CashChange, CashEvent, CashEventBus, EventOrigin};
use crate::cash::state::{CashState, TenderType};
use crate::clock::Clock;
use crate::repo::kv_repo::{KvError, KvStore};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::mpsc::Receiver;
use std::sync::Arc;

#[derive(Debug)]
pub enum CashError {
    Kv(KvError),
    /// Stored text is not a valid cash state.
    Corrupt(String),
    InvalidAmount(i64),
    InvalidOpeningFloat(i64),
    /// Booking the sale would overflow a running total.
    Overflow {
        amount: i64,
        tender: TenderType,
    },
}

impl Display for CashError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Kv(err) => write!(f, "{err}"),
            Self::Corrupt(details) => write!(f, "corrupt cash state: {details}"),
            Self::InvalidAmount(amount) => write!(f, "sale amount must be positive, got {amount}"),
            Self::InvalidOpeningFloat(amount) => {
                write!(f, "opening float cannot be negative, got {amount}")
            }
            Self::Overflow { amount, tender } => {
                write!(f, "{tender} sale of {amount} overflows the register totals")
            }
        }
    }
}

impl Error for CashError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Kv(err) => Some(err),
            _ => None,
        }
    }
}

impl From<KvError> for CashError {
    fn from(value: KvError) -> Self {
        Self::Kv(value)
    }
}

pub struct CashRegisterSimulator<S: KvStore> {
    store: S,
    key: String,
    clock: Arc<dyn Clock>,
    bus: CashEventBus,
    last_seen_revision: Option<i64>,
}

impl<S: KvStore> CashRegisterSimulator<S> {
    pub fn new(store: S, key: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            key: key.into(),
            clock,
            bus: CashEventBus::new(),
            last_seen_revision: None,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn subscribe(&mut self) -> Receiver<CashEvent> {
        self.bus.subscribe()
    }

    /// Current persisted state, `None` when never initialized or reset.
    pub fn state(&self) -> Result<Option<CashState>, CashError> {
        let entry = self.store.get(&self.key)?;
        decode(entry.and_then(|entry| entry.value))
    }

    /// Opens a fresh register with zeroed totals.
    pub fn initialize(&mut self, opening_float: i64) -> Result<CashState, CashError> {
        if opening_float < 0 {
            return Err(CashError::InvalidOpeningFloat(opening_float));
        }
        let state = CashState::opened(opening_float);
        let revision = self.persist(&state)?;
        info!(
            "event=cash_initialize module=cash status=ok opening_float={opening_float} revision={revision}"
        );
        self.bus.publish(&CashEvent {
            change: CashChange::Initialized,
            sale_total: None,
            state: Some(state.clone()),
            origin: EventOrigin::Local,
            revision,
        });
        Ok(state)
    }

    /// Books one simulated sale.
    ///
    /// Returns `Ok(false)` without touching storage when the register is not
    /// open.
    pub fn simulate(&mut self, amount: i64, tender: TenderType) -> Result<bool, CashError> {
        if amount <= 0 {
            return Err(CashError::InvalidAmount(amount));
        }
        let Some(mut state) = self.state()?.filter(|state| state.is_open) else {
            info!(
                "event=cash_simulate module=cash status=rejected reason=register_closed tender={tender}"
            );
            return Ok(false);
        };

        if state
            .record_sale(amount, tender, self.clock.now_ms())
            .is_none()
        {
            warn!(
                "event=cash_simulate module=cash status=error tender={tender} amount={amount} error_code=overflow"
            );
            return Err(CashError::Overflow { amount, tender });
        }
        let revision = self.persist(&state)?;
        info!(
            "event=cash_simulate module=cash status=ok tender={tender} amount={amount} movements={} revision={revision}",
            state.movements.len()
        );
        self.bus.publish(&CashEvent {
            change: CashChange::SaleRecorded,
            sale_total: Some(amount),
            state: Some(state),
            origin: EventOrigin::Local,
            revision,
        });
        Ok(true)
    }

    /// Clears the persisted state.
    pub fn reset(&mut self) -> Result<(), CashError> {
        let Some(revision) = self.store.remove(&self.key)? else {
            return Ok(());
        };
        self.last_seen_revision = Some(revision);
        info!("event=cash_reset module=cash status=ok revision={revision}");
        self.bus.publish(&CashEvent {
            change: CashChange::Reset,
            sale_total: None,
            state: None,
            origin: EventOrigin::Local,
            revision,
        });
        Ok(())
    }

    /// Picks up writes made by other contexts sharing the store.
    ///
    /// The first poll of a fresh context delivers the state it found.
    pub fn poll_storage(&mut self) -> Result<Option<CashEvent>, CashError> {
        let Some(entry) = self.store.get(&self.key)? else {
            return Ok(None);
        };
        if self.last_seen_revision == Some(entry.revision) {
            return Ok(None);
        }
        self.last_seen_revision = Some(entry.revision);

        let state = decode(entry.value).map_err(|err| {
            warn!(
                "event=cash_poll module=cash status=error revision={} error_code=corrupt_state",
                entry.revision
            );
            err
        })?;
        let event = CashEvent {
            change: if state.is_some() {
                CashChange::Replaced
            } else {
                CashChange::Reset
            },
            sale_total: None,
            state,
            origin: EventOrigin::Storage,
            revision: entry.revision,
        };
        self.bus.publish(&event);
        Ok(Some(event))
    }

    fn persist(&mut self, state: &CashState) -> Result<i64, CashError> {
        let text =
            serde_json::to_string(state).map_err(|err| CashError::Corrupt(err.to_string()))?;
        let revision = self.store.put(&self.key, &text)?;
        self.last_seen_revision = Some(revision);
        Ok(revision)
    }
}

fn decode(value: Option<String>) -> Result<Option<CashState>, CashError> {
    value
        .map(|text| serde_json::from_str(&text).map_err(|err| CashError::Corrupt(err.to_string())))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::{CashError, CashRegisterSimulator};
    use crate::cash::bus::{CashChange, EventOrigin};
    use crate::cash::state::TenderType;
    use crate::clock::ManualClock;
    use crate::db::open_db_in_memory;
    use crate::repo::kv_repo::{KvStore, SqliteKvStore};
    use std::sync::Arc;

    #[test]
    fn scenario_opening_float_then_cash_sale() {
        let conn = open_db_in_memory().expect("open db");
        let clock = Arc::new(ManualClock::new(1_700_000_000_000));
        let mut simulator =
            CashRegisterSimulator::new(SqliteKvStore::new(&conn, clock.clone()), "cash", clock);

        simulator.initialize(75_000).expect("initialize");
        assert!(simulator.simulate(2_500, TenderType::Cash).expect("simulate"));

        let state = simulator.state().expect("state").expect("present");
        assert_eq!(state.cash_on_hand, 77_500);
        assert_eq!(state.total_sales, 2_500);
        assert_eq!(state.movements.len(), 1);
        assert_eq!(state.movements[0].timestamp_ms, 1_700_000_000_000);
    }

    #[test]
    fn closed_register_rejects_without_writing() {
        let conn = open_db_in_memory().expect("open db");
        let clock = Arc::new(ManualClock::new(0));
        let store = SqliteKvStore::new(&conn, clock.clone());
        let mut simulator = CashRegisterSimulator::new(store, "cash", clock.clone());

        assert!(!simulator.simulate(2_500, TenderType::Cash).expect("simulate"));
        assert!(SqliteKvStore::new(&conn, clock).get("cash").expect("get").is_none());
    }

    #[test]
    fn non_positive_amount_is_an_error() {
        let conn = open_db_in_memory().expect("open db");
        let clock = Arc::new(ManualClock::new(0));
        let mut simulator =
            CashRegisterSimulator::new(SqliteKvStore::new(&conn, clock.clone()), "cash", clock);
        simulator.initialize(0).expect("initialize");
        assert!(matches!(
            simulator.simulate(0, TenderType::Card),
            Err(CashError::InvalidAmount(0))
        ));
        assert!(matches!(
            simulator.initialize(-1),
            Err(CashError::InvalidOpeningFloat(-1))
        ));
    }

    #[test]
    fn overflowing_sale_is_rejected_before_persisting() {
        let conn = open_db_in_memory().expect("open db");
        let clock = Arc::new(ManualClock::new(0));
        let mut simulator = CashRegisterSimulator::new(
            SqliteKvStore::new(&conn, clock.clone()),
            "cash",
            clock.clone(),
        );
        simulator.initialize(1).expect("initialize");
        let events = simulator.subscribe();

        assert!(matches!(
            simulator.simulate(i64::MAX, TenderType::Cash),
            Err(CashError::Overflow {
                amount: i64::MAX,
                tender: TenderType::Cash
            })
        ));

        let entry = SqliteKvStore::new(&conn, clock)
            .get("cash")
            .expect("get")
            .expect("entry");
        assert_eq!(entry.revision, 1);
        let state = simulator.state().expect("state").expect("present");
        assert_eq!(state.cash_on_hand, 1);
        assert!(state.movements.is_empty());
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn largest_sale_that_fits_is_booked() {
        let conn = open_db_in_memory().expect("open db");
        let clock = Arc::new(ManualClock::new(0));
        let mut simulator =
            CashRegisterSimulator::new(SqliteKvStore::new(&conn, clock.clone()), "cash", clock);
        simulator.initialize(0).expect("initialize");

        assert!(simulator
            .simulate(i64::MAX, TenderType::Cash)
            .expect("simulate"));
        let state = simulator.state().expect("state").expect("present");
        assert_eq!(state.cash_on_hand, i64::MAX);
        assert_eq!(state.tender_totals.checked_sum(), Some(i64::MAX));
        assert!(matches!(
            simulator.simulate(1, TenderType::Card),
            Err(CashError::Overflow { .. })
        ));
    }

    #[test]
    fn local_events_carry_delta_and_state() {
        let conn = open_db_in_memory().expect("open db");
        let clock = Arc::new(ManualClock::new(0));
        let mut simulator =
            CashRegisterSimulator::new(SqliteKvStore::new(&conn, clock.clone()), "cash", clock);
        let events = simulator.subscribe();

        simulator.initialize(100).expect("initialize");
        simulator.simulate(40, TenderType::Transfer).expect("simulate");
        simulator.reset().expect("reset");

        let seen: Vec<_> = events.try_iter().collect();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[1].change, CashChange::SaleRecorded);
        assert_eq!(seen[1].sale_total, Some(40));
        assert_eq!(
            seen[1].state.as_ref().map(|state| state.cash_on_hand),
            Some(100)
        );
        assert!(seen.iter().all(|event| event.origin == EventOrigin::Local));
        assert_eq!(seen[2].state, None);

        assert!(simulator.poll_storage().expect("poll").is_none());
    }
}
