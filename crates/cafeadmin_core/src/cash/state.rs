//! Simulated cash-register state.
//!
//! # Invariants
//! - `cash_on_hand == opening_float + tender_totals.cash` for states built
//!   through `opened` + `record_sale`.
//! - `total_sales` equals the sum of all tender totals.
//! - Movements are append-only and ordered by recording time.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenderType {
    Cash,
    Card,
    Transfer,
}

impl TenderType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Card => "card",
            Self::Transfer => "transfer",
        }
    }
}

impl Display for TenderType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TenderType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "cash" => Ok(Self::Cash),
            "card" => Ok(Self::Card),
            "transfer" => Ok(Self::Transfer),
            other => Err(format!(
                "unsupported tender type `{other}`; expected cash|card|transfer"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenderTotals {
    pub cash: i64,
    pub card: i64,
    pub transfer: i64,
}

impl TenderTotals {
    pub fn get(&self, tender: TenderType) -> i64 {
        match tender {
            TenderType::Cash => self.cash,
            TenderType::Card => self.card,
            TenderType::Transfer => self.transfer,
        }
    }

    /// Totals with `amount` added to `tender`, or `None` on overflow.
    fn checked_add(self, tender: TenderType, amount: i64) -> Option<Self> {
        let mut next = self;
        let slot = match tender {
            TenderType::Cash => &mut next.cash,
            TenderType::Card => &mut next.card,
            TenderType::Transfer => &mut next.transfer,
        };
        *slot = slot.checked_add(amount)?;
        Some(next)
    }

    /// Sum of all tenders, or `None` when it does not fit in `i64`.
    pub fn checked_sum(&self) -> Option<i64> {
        self.cash.checked_add(self.card)?.checked_add(self.transfer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    Sale,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashMovement {
    pub id: Uuid,
    pub kind: MovementKind,
    pub tender: TenderType,
    pub amount: i64,
    pub timestamp_ms: i64,
}

/// Persisted register snapshot. Amounts are whole currency units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashState {
    pub is_open: bool,
    pub opening_float: i64,
    pub cash_on_hand: i64,
    pub total_sales: i64,
    #[serde(default)]
    pub tender_totals: TenderTotals,
    #[serde(default)]
    pub movements: Vec<CashMovement>,
}

impl CashState {
    /// Fresh open register holding only the opening float.
    pub fn opened(opening_float: i64) -> Self {
        Self {
            is_open: true,
            opening_float,
            cash_on_hand: opening_float,
            total_sales: 0,
            tender_totals: TenderTotals::default(),
            movements: Vec::new(),
        }
    }

    /// Books one sale; only cash tenders change the drawer balance.
    ///
    /// Returns `None` and leaves the state untouched when any running total
    /// would overflow.
    pub fn record_sale(
        &mut self,
        amount: i64,
        tender: TenderType,
        timestamp_ms: i64,
    ) -> Option<&CashMovement> {
        let cash_on_hand = if tender == TenderType::Cash {
            self.cash_on_hand.checked_add(amount)?
        } else {
            self.cash_on_hand
        };
        let total_sales = self.total_sales.checked_add(amount)?;
        let tender_totals = self.tender_totals.checked_add(tender, amount)?;

        self.cash_on_hand = cash_on_hand;
        self.total_sales = total_sales;
        self.tender_totals = tender_totals;
        self.movements.push(CashMovement {
            id: Uuid::new_v4(),
            kind: MovementKind::Sale,
            tender,
            amount,
            timestamp_ms,
        });
        self.movements.last()
    }
}

#[cfg(test)]
mod tests {
    use super::{CashState, TenderType};

    #[test]
    fn card_sale_does_not_touch_drawer() {
        let mut state = CashState::opened(1_000);
        state.record_sale(300, TenderType::Card, 1);
        assert_eq!(state.cash_on_hand, 1_000);
        assert_eq!(state.total_sales, 300);
        assert_eq!(state.tender_totals.get(TenderType::Card), 300);
    }

    #[test]
    fn totals_stay_consistent() {
        let mut state = CashState::opened(500);
        state.record_sale(100, TenderType::Cash, 1);
        state.record_sale(40, TenderType::Transfer, 2);
        assert_eq!(Some(state.total_sales), state.tender_totals.checked_sum());
        assert_eq!(state.cash_on_hand, state.opening_float + state.tender_totals.cash);
        assert_eq!(state.movements.len(), 2);
    }

    #[test]
    fn overflowing_sale_leaves_state_untouched() {
        let mut state = CashState::opened(1);
        assert!(state.record_sale(i64::MAX, TenderType::Cash, 1).is_none());
        assert_eq!(state, CashState::opened(1));

        let mut state = CashState::opened(0);
        assert!(state.record_sale(i64::MAX, TenderType::Card, 1).is_some());
        assert!(state.record_sale(1, TenderType::Transfer, 2).is_none());
        assert_eq!(state.total_sales, i64::MAX);
        assert_eq!(state.movements.len(), 1);
    }

    #[test]
    fn json_uses_camel_case_keys() {
        let json = serde_json::to_value(CashState::opened(75_000)).expect("encode");
        assert_eq!(json["cashOnHand"], 75_000);
        assert_eq!(json["isOpen"], true);
        assert!(json["movements"].as_array().is_some_and(Vec::is_empty));
    }

    #[test]
    fn tender_parses_case_insensitively() {
        assert_eq!(" CASH ".parse::<TenderType>(), Ok(TenderType::Cash));
        assert!("cheque".parse::<TenderType>().is_err());
    }
}
