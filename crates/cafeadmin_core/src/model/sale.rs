//! Sale header/detail shapes used for purchase-history enrichment.
//!
//! # Invariants
//! - A history entry always has a header; line items may be empty when the
//!   detail lookup failed or returned nothing.

use crate::model::record::{deserialize_optional_id, null_as_default, Identified, RecordId};
use serde::{Deserialize, Serialize};

/// Sale header as returned by the sales list endpoint.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SaleHeader {
    #[serde(
        default,
        deserialize_with = "deserialize_optional_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    #[serde(
        rename = "_id",
        default,
        deserialize_with = "deserialize_optional_id",
        skip_serializing
    )]
    pub legacy_id: Option<RecordId>,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub customer_id: Option<RecordId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    /// Backend timestamp, passed through verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Identified for SaleHeader {
    fn primary_id(&self) -> Option<&RecordId> {
        self.id.as_ref()
    }

    fn legacy_id(&self) -> Option<&RecordId> {
        self.legacy_id.as_ref()
    }
}

/// One line of a sale detail.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SaleLine {
    #[serde(default, deserialize_with = "null_as_default")]
    pub product_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub quantity: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub unit_price: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub subtotal: f64,
}

/// Sale detail: header fields plus line items.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SaleDetail {
    #[serde(flatten)]
    pub header: SaleHeader,
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<SaleLine>,
}

/// Header joined with its line items for the customer history view.
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseHistoryEntry {
    pub sale: SaleHeader,
    pub items: Vec<SaleLine>,
    /// `false` when the detail lookup failed and `items` is a placeholder.
    pub detail_loaded: bool,
}

impl PurchaseHistoryEntry {
    pub fn from_detail(header: SaleHeader, detail: SaleDetail) -> Self {
        Self {
            sale: header,
            items: detail.items,
            detail_loaded: true,
        }
    }

    /// Minimal entry used when the detail is missing.
    pub fn header_only(header: SaleHeader) -> Self {
        Self {
            sale: header,
            items: Vec::new(),
            detail_loaded: false,
        }
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::SaleDetail;
    use crate::model::record::{Identified, RecordId};

    #[test]
    fn detail_flattens_header_fields() {
        let detail: SaleDetail = serde_json::from_str(
            r#"{"id": 5, "customer_id": "7", "total": 12.5,
                "items": [{"product_name": "Café", "quantity": 2, "unit_price": 6.25, "subtotal": 12.5}]}"#,
        )
        .expect("decode sale detail");
        assert_eq!(detail.header.record_id(), RecordId::parse("5").as_ref());
        assert_eq!(detail.header.customer_id, RecordId::parse("7"));
        assert_eq!(detail.items.len(), 1);
    }
}
