//! Voucher consolidation
//!
//! Rolls a customer's unpaid bilties into one voucher. Creation is a
//! two-step write with compensation: the voucher is inserted first, then the
//! source shipments are flagged `voucher_made`; if flagging fails, the
//! voucher is removed again. The available-bilties pool therefore never
//! drifts from the vouchers that actually exist.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{error, info, instrument, warn};

use core_kernel::{Currency, CustomerId, Money, Rate, ShipmentId, VoucherId, VoucherNumber};
use domain_shipment::{Shipment, ShipmentStore};

use crate::error::VoucherError;
use crate::ports::{VoucherQuery, VoucherStore};
use crate::voucher::{Voucher, VoucherBiltyRef};

/// One bilty to consolidate: the shipment plus the amount the counter agreed
/// to carry over (normally the unpaid remainder)
#[derive(Debug, Clone)]
pub struct ConsolidationItem {
    pub shipment_id: ShipmentId,
    pub amount: Money,
}

/// Input for creating a voucher
#[derive(Debug, Clone)]
pub struct NewVoucher {
    pub customer_id: CustomerId,
    pub currency: Currency,
    pub items: Vec<ConsolidationItem>,
    /// Company tax percentage; defaults to zero
    pub tax_percentage: Option<Decimal>,
    /// Caller-supplied number; auto-generated when absent
    pub voucher_number: Option<String>,
}

/// Application service that builds vouchers from shipments
pub struct VoucherConsolidator {
    vouchers: Arc<dyn VoucherStore>,
    shipments: Arc<dyn ShipmentStore>,
}

impl VoucherConsolidator {
    pub fn new(vouchers: Arc<dyn VoucherStore>, shipments: Arc<dyn ShipmentStore>) -> Self {
        Self {
            vouchers,
            shipments,
        }
    }

    pub fn store(&self) -> Arc<dyn VoucherStore> {
        Arc::clone(&self.vouchers)
    }

    /// Creates a voucher and flags its source shipments
    #[instrument(skip(self, input), fields(customer = %input.customer_id))]
    pub async fn create(
        &self,
        input: NewVoucher,
        created_by: &str,
    ) -> Result<Voucher, VoucherError> {
        if input.items.is_empty() {
            return Err(VoucherError::validation(
                "a voucher needs at least one bilty",
            ));
        }

        // Every referenced shipment must resolve before anything is written.
        let mut refs = Vec::with_capacity(input.items.len());
        let mut shipment_ids = Vec::with_capacity(input.items.len());
        for item in &input.items {
            let shipment = self.resolve_shipment(item.shipment_id).await?;
            refs.push(VoucherBiltyRef {
                shipment_id: shipment.id,
                bilty_number: shipment.bilty_number.clone(),
                amount: item.amount,
            });
            shipment_ids.push(shipment.id);
        }

        let number = self.allocate_number(input.voucher_number.as_deref()).await?;
        let tax = Rate::from_percentage(input.tax_percentage.unwrap_or(Decimal::ZERO));
        let voucher = Voucher::new(
            number,
            input.customer_id,
            input.currency,
            refs,
            tax,
            created_by,
        );

        self.vouchers.insert(&voucher).await?;

        if let Err(flag_err) = self.shipments.set_voucher_made(&shipment_ids, true).await {
            warn!(
                voucher = %voucher.voucher_number,
                error = %flag_err,
                "flagging source shipments failed, rolling back voucher"
            );
            if let Err(rollback_err) = self.vouchers.delete(voucher.id).await {
                error!(
                    voucher = %voucher.voucher_number,
                    error = %rollback_err,
                    "rollback of orphaned voucher failed"
                );
            }
            return Err(flag_err.into());
        }

        info!(voucher = %voucher.voucher_number, total = %voucher.total_amount, "voucher created");
        Ok(voucher)
    }

    pub async fn get(&self, id: VoucherId) -> Result<Voucher, VoucherError> {
        self.vouchers
            .find_by_id(id)
            .await?
            .ok_or_else(|| VoucherError::not_found(id))
    }

    pub async fn list(&self, query: VoucherQuery) -> Result<Vec<Voucher>, VoucherError> {
        Ok(self.vouchers.find(query).await?)
    }

    /// Vouchers not yet bound into a trip settlement
    pub async fn available_for_trip(&self) -> Result<Vec<Voucher>, VoucherError> {
        Ok(self.vouchers.find(VoucherQuery::available_for_trip()).await?)
    }

    /// Records a payment against the voucher and re-derives its status
    #[instrument(skip(self))]
    pub async fn record_payment(
        &self,
        id: VoucherId,
        amount: Money,
    ) -> Result<Voucher, VoucherError> {
        if amount.is_negative() {
            return Err(VoucherError::validation("payment must not be negative"));
        }
        let mut voucher = self.get(id).await?;
        voucher.record_payment(amount);
        self.vouchers.update(&voucher).await?;
        info!(voucher = %voucher.voucher_number, ?amount, status = ?voucher.status, "payment recorded");
        Ok(voucher)
    }

    async fn resolve_shipment(&self, id: ShipmentId) -> Result<Shipment, VoucherError> {
        self.shipments
            .find_by_id(id)
            .await?
            .ok_or_else(|| VoucherError::ShipmentNotFound(id.to_string()))
    }

    /// Validates a caller-supplied number or generates one, rejecting any
    /// collision outright (no retry-with-suffix)
    async fn allocate_number(
        &self,
        supplied: Option<&str>,
    ) -> Result<VoucherNumber, VoucherError> {
        let number = match supplied {
            Some(raw) => VoucherNumber::parse(raw)
                .map_err(|e| VoucherError::validation(e.to_string()))?,
            None => VoucherNumber::generate(Utc::now().date_naive()),
        };
        if self.vouchers.find_by_number(&number).await?.is_some() {
            return Err(VoucherError::Conflict(format!(
                "voucher number {} already exists",
                number
            )));
        }
        Ok(number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::mock::MemoryVoucherStore;
    use chrono::NaiveDate;
    use core_kernel::BiltyNumber;
    use domain_shipment::ports::mock::MemoryShipmentStore;
    use domain_shipment::Shipment;
    use rust_decimal_macros::dec;

    fn pkr(amount: Decimal) -> Money {
        Money::new(amount, Currency::PKR)
    }

    fn shipment(serial: u64) -> Shipment {
        Shipment::new(
            BiltyNumber::from_parts(NaiveDate::from_ymd_opt(2024, 3, 7).unwrap(), serial),
            "Ali Traders",
            "0300-1234567",
            "Karachi Hardware",
            "0321-7654321",
            "Lahore Adda",
            Currency::PKR,
            "clerk-1",
        )
    }

    struct Fixture {
        consolidator: VoucherConsolidator,
        vouchers: Arc<MemoryVoucherStore>,
        shipments: Arc<MemoryShipmentStore>,
    }

    async fn fixture(shipments: Vec<Shipment>) -> Fixture {
        let shipment_store = Arc::new(MemoryShipmentStore::with_shipments(shipments).await);
        let voucher_store = Arc::new(MemoryVoucherStore::new());
        Fixture {
            consolidator: VoucherConsolidator::new(
                Arc::clone(&voucher_store) as _,
                Arc::clone(&shipment_store) as _,
            ),
            vouchers: voucher_store,
            shipments: shipment_store,
        }
    }

    fn input(items: Vec<ConsolidationItem>) -> NewVoucher {
        NewVoucher {
            customer_id: CustomerId::new_v7(),
            currency: Currency::PKR,
            items,
            tax_percentage: Some(dec!(10)),
            voucher_number: None,
        }
    }

    #[tokio::test]
    async fn test_create_consolidates_and_flags_shipments() {
        let a = shipment(1);
        let b = shipment(2);
        let f = fixture(vec![a.clone(), b.clone()]).await;

        let voucher = f
            .consolidator
            .create(
                input(vec![
                    ConsolidationItem {
                        shipment_id: a.id,
                        amount: pkr(dec!(280)),
                    },
                    ConsolidationItem {
                        shipment_id: b.id,
                        amount: pkr(dec!(120)),
                    },
                ]),
                "clerk-1",
            )
            .await
            .unwrap();

        assert_eq!(voucher.subtotal.amount(), dec!(400));
        assert_eq!(voucher.company_tax.amount(), dec!(40));
        assert_eq!(voucher.total_amount.amount(), dec!(440));

        let reloaded = f.shipments.find_by_id(a.id).await.unwrap().unwrap();
        assert!(reloaded.voucher_made);
    }

    #[tokio::test]
    async fn test_empty_input_is_rejected() {
        let f = fixture(vec![]).await;
        let err = f.consolidator.create(input(vec![]), "clerk-1").await.unwrap_err();
        assert!(matches!(err, VoucherError::Validation(_)));
    }

    #[tokio::test]
    async fn test_unknown_shipment_is_rejected() {
        let f = fixture(vec![]).await;
        let err = f
            .consolidator
            .create(
                input(vec![ConsolidationItem {
                    shipment_id: ShipmentId::new_v7(),
                    amount: pkr(dec!(100)),
                }]),
                "clerk-1",
            )
            .await
            .unwrap_err();
        assert!(matches!(err, VoucherError::ShipmentNotFound(_)));
        assert_eq!(f.vouchers.count().await, 0);
    }

    #[tokio::test]
    async fn test_supplied_number_collision_is_rejected() {
        let a = shipment(1);
        let b = shipment(2);
        let f = fixture(vec![a.clone(), b.clone()]).await;

        let mut first = input(vec![ConsolidationItem {
            shipment_id: a.id,
            amount: pkr(dec!(280)),
        }]);
        first.voucher_number = Some("VCH-2024-0307-001".to_string());
        f.consolidator.create(first, "clerk-1").await.unwrap();

        let mut second = input(vec![ConsolidationItem {
            shipment_id: b.id,
            amount: pkr(dec!(120)),
        }]);
        second.voucher_number = Some("VCH-2024-0307-001".to_string());
        let err = f.consolidator.create(second, "clerk-1").await.unwrap_err();
        assert!(matches!(err, VoucherError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_flagging_failure_rolls_back_the_voucher() {
        let a = shipment(1);
        let f = fixture(vec![a.clone()]).await;
        // Insert succeeds, then the shipment flag write fails.
        f.shipments.fail_next_write();

        let result = f
            .consolidator
            .create(
                input(vec![ConsolidationItem {
                    shipment_id: a.id,
                    amount: pkr(dec!(280)),
                }]),
                "clerk-1",
            )
            .await;
        assert!(result.is_err());
        assert_eq!(f.vouchers.count().await, 0);

        let reloaded = f.shipments.find_by_id(a.id).await.unwrap().unwrap();
        assert!(!reloaded.voucher_made);
    }

    #[tokio::test]
    async fn test_record_payment_transitions() {
        let a = shipment(1);
        let f = fixture(vec![a.clone()]).await;
        let voucher = f
            .consolidator
            .create(
                input(vec![ConsolidationItem {
                    shipment_id: a.id,
                    amount: pkr(dec!(400)),
                }]),
                "clerk-1",
            )
            .await
            .unwrap();

        let partial = f
            .consolidator
            .record_payment(voucher.id, pkr(dec!(100)))
            .await
            .unwrap();
        assert_eq!(partial.status, crate::voucher::VoucherStatus::Partial);

        let paid = f
            .consolidator
            .record_payment(voucher.id, pkr(dec!(340)))
            .await
            .unwrap();
        assert_eq!(paid.status, crate::voucher::VoucherStatus::Paid);
    }
}
