//! Recalculation repair job
//!
//! Historical records can carry stale cached totals (imports, manual edits,
//! older derivation bugs). The repair job sweeps every shipment through the
//! fare calculator and persists only the ones that changed. A failure on one
//! record never aborts the pass; failures are collected into the report and
//! the sweep continues.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use core_kernel::ShipmentId;

use crate::error::ShipmentError;
use crate::fare;
use crate::ports::{ShipmentQuery, ShipmentStore};

/// A record that could not be repaired
#[derive(Debug, Clone)]
pub struct RepairFailure {
    pub shipment_id: ShipmentId,
    pub bilty_number: String,
    pub reason: String,
}

/// Outcome of a repair pass
#[derive(Debug, Default)]
pub struct RepairReport {
    /// Shipments examined
    pub scanned: usize,
    /// Shipments whose stored state was corrected
    pub repaired: usize,
    /// Line items whose cached total was stale, across all shipments
    pub items_fixed: usize,
    /// Per-record failures; the pass continued past each one
    pub failures: Vec<RepairFailure>,
}

impl RepairReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Sweeps all shipments and repairs stale derived fields
pub struct RepairJob {
    store: Arc<dyn ShipmentStore>,
}

impl RepairJob {
    pub fn new(store: Arc<dyn ShipmentStore>) -> Self {
        Self { store }
    }

    /// Runs one full pass. Running it again immediately afterwards repairs
    /// nothing, barring concurrent writes.
    #[instrument(skip(self))]
    pub async fn run(&self) -> Result<RepairReport, ShipmentError> {
        let shipments = self.store.find(ShipmentQuery::default()).await?;
        let mut report = RepairReport::default();

        for mut shipment in shipments {
            report.scanned += 1;
            let delta = fare::recalculate(&mut shipment);
            if !delta.changed {
                continue;
            }
            match self.store.update(&shipment).await {
                Ok(()) => {
                    report.repaired += 1;
                    report.items_fixed += delta.items_fixed;
                }
                Err(e) => {
                    warn!(bilty = %shipment.bilty_number, error = %e, "repair failed for record");
                    report.failures.push(RepairFailure {
                        shipment_id: shipment.id,
                        bilty_number: shipment.bilty_number.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            scanned = report.scanned,
            repaired = report.repaired,
            items_fixed = report.items_fixed,
            failures = report.failures.len(),
            "repair pass complete"
        );
        Ok(report)
    }
}
