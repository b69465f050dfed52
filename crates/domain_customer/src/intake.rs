//! Shipment intake
//!
//! Issuing a bilty touches two aggregates: the shipment itself and the
//! sender's ledger. There is no cross-document transaction, so the intake
//! runs as ordered steps with compensation: if ledger bookkeeping fails, the
//! freshly created shipment is removed and the whole intake fails. The
//! caller never observes a shipment without its ledger entry.

use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use domain_shipment::{NewShipment, Shipment, ShipmentService};

use crate::customer::{BiltyLedgerEntry, Customer};
use crate::error::CustomerError;
use crate::ports::CustomerStore;

/// Orchestrates shipment creation together with customer-ledger bookkeeping
pub struct ShipmentIntake {
    shipments: Arc<ShipmentService>,
    customers: Arc<dyn CustomerStore>,
}

impl ShipmentIntake {
    pub fn new(shipments: Arc<ShipmentService>, customers: Arc<dyn CustomerStore>) -> Self {
        Self {
            shipments,
            customers,
        }
    }

    /// Creates the shipment and seeds the sender's ledger
    ///
    /// The sender is matched by exact (name, phone); an unknown sender gets a
    /// new customer record. The ledger entry is seeded from the shipment's
    /// remaining fare unless an entry with the same bilty number already
    /// exists (it never duplicates).
    #[instrument(skip(self, input), fields(sender = %input.sender_name))]
    pub async fn create_shipment(
        &self,
        input: NewShipment,
        created_by: &str,
    ) -> Result<Shipment, CustomerError> {
        let sender_name = input.sender_name.clone();
        let sender_phone = input.sender_phone.clone();

        let shipment = self.shipments.create(input, created_by).await?;

        match self
            .record_in_ledger(&sender_name, &sender_phone, &shipment)
            .await
        {
            Ok(()) => Ok(shipment),
            Err(ledger_err) => {
                warn!(
                    bilty = %shipment.bilty_number,
                    error = %ledger_err,
                    "ledger bookkeeping failed, rolling back shipment"
                );
                if let Err(rollback_err) = self.shipments.delete(shipment.id).await {
                    // Compensation itself failed; the record is orphaned and
                    // needs operator attention.
                    error!(
                        bilty = %shipment.bilty_number,
                        error = %rollback_err,
                        "rollback of orphaned shipment failed"
                    );
                }
                Err(ledger_err)
            }
        }
    }

    async fn record_in_ledger(
        &self,
        name: &str,
        phone: &str,
        shipment: &Shipment,
    ) -> Result<(), CustomerError> {
        let existing = self.customers.find_by_name_phone(name, phone).await?;

        match existing {
            Some(mut customer) => {
                if customer.ledger_entry(&shipment.bilty_number).is_some() {
                    // Already recorded; nothing to do.
                    return Ok(());
                }
                customer.add_ledger_entry(seed_entry(shipment))?;
                self.customers.update(&customer).await?;
                Ok(())
            }
            None => {
                let mut customer = Customer::new(name, phone);
                customer
                    .add_ledger_entry(seed_entry(shipment))
                    .map_err(|e| CustomerError::validation(e.to_string()))?;
                self.customers.insert(&customer).await?;
                info!(customer = %customer.id, "customer auto-created on intake");
                Ok(())
            }
        }
    }
}

fn seed_entry(shipment: &Shipment) -> BiltyLedgerEntry {
    let mut entry =
        BiltyLedgerEntry::unpaid(shipment.bilty_number.clone(), shipment.remaining_fare);
    entry.payment_status = shipment.payment_status;
    entry.paid_by_customer = shipment.paid_by_customer;
    entry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::mock::MemoryCustomerStore;
    use core_kernel::{Currency, InMemorySequence, Money};
    use domain_shipment::ports::mock::MemoryShipmentStore;
    use domain_shipment::NewLineItem;
    use rust_decimal_macros::dec;

    fn pkr(amount: rust_decimal::Decimal) -> Money {
        Money::new(amount, Currency::PKR)
    }

    struct Fixture {
        intake: ShipmentIntake,
        shipment_store: Arc<MemoryShipmentStore>,
        customer_store: Arc<MemoryCustomerStore>,
    }

    fn fixture() -> Fixture {
        let shipment_store = Arc::new(MemoryShipmentStore::new());
        let customer_store = Arc::new(MemoryCustomerStore::new());
        let shipments = Arc::new(ShipmentService::new(
            Arc::clone(&shipment_store) as _,
            Arc::new(InMemorySequence::new()),
        ));
        Fixture {
            intake: ShipmentIntake::new(shipments, Arc::clone(&customer_store) as _),
            shipment_store,
            customer_store,
        }
    }

    fn intake_input() -> NewShipment {
        NewShipment {
            sender_name: "Ali Traders".to_string(),
            sender_phone: "0300-1234567".to_string(),
            receiver_name: "Karachi Hardware".to_string(),
            receiver_phone: "0321-7654321".to_string(),
            adda: "Lahore Adda".to_string(),
            currency: Currency::PKR,
            items: vec![NewLineItem {
                description: "Cement".to_string(),
                quantity: 2,
                unit_fare: pkr(dec!(100)),
            }],
            mazdoori: None,
            bilty_charges: None,
            reri_charges: None,
            extra_charges: None,
            received_fare: Some(pkr(dec!(50))),
        }
    }

    #[tokio::test]
    async fn test_intake_creates_customer_and_seeds_ledger() {
        let f = fixture();
        let shipment = f.intake.create_shipment(intake_input(), "clerk-1").await.unwrap();

        let customer = f
            .customer_store
            .find_by_name_phone("Ali Traders", "0300-1234567")
            .await
            .unwrap()
            .expect("customer auto-created");
        let entry = customer.ledger_entry(&shipment.bilty_number).unwrap();
        assert_eq!(entry.amount_to_be_paid.amount(), dec!(150));
    }

    #[tokio::test]
    async fn test_intake_reuses_existing_customer() {
        let f = fixture();
        f.intake.create_shipment(intake_input(), "clerk-1").await.unwrap();
        f.intake.create_shipment(intake_input(), "clerk-1").await.unwrap();

        assert_eq!(f.customer_store.count().await, 1);
        let customer = f
            .customer_store
            .find_by_name_phone("Ali Traders", "0300-1234567")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(customer.ledger.len(), 2);
    }

    #[tokio::test]
    async fn test_ledger_failure_rolls_back_the_shipment() {
        let f = fixture();
        f.customer_store.fail_next_write();

        let result = f.intake.create_shipment(intake_input(), "clerk-1").await;
        assert!(result.is_err());
        assert_eq!(f.shipment_store.count().await, 0);
        assert_eq!(f.customer_store.count().await, 0);
    }
}
