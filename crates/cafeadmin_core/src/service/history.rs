//! Customer purchase history: sale headers joined with their line items.
//!
//! # Invariants
//! - Sale headers are deduplicated by id before detail lookups.
//! - A failed or empty detail lookup degrades to a header-only entry; it
//!   never fails the whole history.

use crate::api::client::RecordClient;
use crate::api::envelope::ApiError;
use crate::api::transport::ApiTransport;
use crate::model::record::{EntityKind, Identified, RecordId};
use crate::model::sale::{PurchaseHistoryEntry, SaleDetail, SaleHeader};
use crate::reconcile::reconcile;
use log::{info, warn};

pub struct PurchaseHistoryService<'a, T: ApiTransport> {
    client: &'a RecordClient<T>,
}

impl<'a, T: ApiTransport> PurchaseHistoryService<'a, T> {
    pub fn new(client: &'a RecordClient<T>) -> Self {
        Self { client }
    }

    /// Loads every sale of `customer_id` with its line items.
    ///
    /// Only the sales list request can fail the call.
    pub fn customer_history(
        &self,
        customer_id: &RecordId,
    ) -> Result<Vec<PurchaseHistoryEntry>, ApiError> {
        let headers: Vec<SaleHeader> = self.client.list_kind(EntityKind::Sales)?;
        let owned = reconcile(
            headers
                .into_iter()
                .filter(|sale| sale.customer_id.as_ref() == Some(customer_id)),
        );

        let mut missing_details = 0usize;
        let entries: Vec<PurchaseHistoryEntry> = owned
            .into_iter()
            .map(|header| {
                let entry = self.enrich(header);
                if !entry.detail_loaded {
                    missing_details += 1;
                }
                entry
            })
            .collect();

        info!(
            "event=purchase_history module=service status=ok sales={} missing_details={missing_details}",
            entries.len()
        );
        Ok(entries)
    }

    fn enrich(&self, header: SaleHeader) -> PurchaseHistoryEntry {
        let Some(sale_id) = header.record_id().cloned() else {
            return PurchaseHistoryEntry::header_only(header);
        };
        match self.client.get_kind::<SaleDetail>(EntityKind::Sales, &sale_id) {
            Ok(Some(detail)) => PurchaseHistoryEntry::from_detail(header, detail),
            Ok(None) => PurchaseHistoryEntry::header_only(header),
            Err(err) => {
                warn!(
                    "event=sale_detail module=service status=degraded sale_id={sale_id} error_code={}",
                    err.code()
                );
                PurchaseHistoryEntry::header_only(header)
            }
        }
    }
}
