//! Shipment application service
//!
//! Orchestrates shipment CRUD against the store port. Bilty numbers are
//! minted from the day-scoped serial sequence, and every write path runs the
//! fare calculator so derived fields are consistent before they hit storage.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument};

use core_kernel::{BiltyNumber, Currency, Money, PortError, SerialSequence, ShipmentId};

use crate::error::ShipmentError;
use crate::fare;
use crate::ports::{ShipmentQuery, ShipmentStore};
use crate::shipment::{DeliveryStatus, LineItem, PaymentStatus, Shipment, Surcharges};

/// Input for a new line item
#[derive(Debug, Clone)]
pub struct NewLineItem {
    pub description: String,
    pub quantity: i64,
    pub unit_fare: Money,
}

/// Input for creating a shipment
#[derive(Debug, Clone)]
pub struct NewShipment {
    pub sender_name: String,
    pub sender_phone: String,
    pub receiver_name: String,
    pub receiver_phone: String,
    pub adda: String,
    pub currency: Currency,
    pub items: Vec<NewLineItem>,
    pub mazdoori: Option<Money>,
    pub bilty_charges: Option<Money>,
    pub reri_charges: Option<Money>,
    pub extra_charges: Option<Money>,
    pub received_fare: Option<Money>,
}

/// Field allow-list for shipment updates
///
/// Updates are restricted to the fields named here; anything else on the
/// aggregate (identity, derived totals, audit fields) is never writable from
/// the outside.
#[derive(Debug, Clone, Default)]
pub struct ShipmentUpdate {
    pub sender_name: Option<String>,
    pub sender_phone: Option<String>,
    pub receiver_name: Option<String>,
    pub receiver_phone: Option<String>,
    pub adda: Option<String>,
    pub items: Option<Vec<NewLineItem>>,
    pub mazdoori: Option<Money>,
    pub bilty_charges: Option<Money>,
    pub reri_charges: Option<Money>,
    pub extra_charges: Option<Money>,
    pub received_fare: Option<Money>,
    pub delivery_status: Option<DeliveryStatus>,
}

/// Application service for the shipment aggregate
pub struct ShipmentService {
    store: Arc<dyn ShipmentStore>,
    sequence: Arc<dyn SerialSequence>,
}

impl ShipmentService {
    pub fn new(store: Arc<dyn ShipmentStore>, sequence: Arc<dyn SerialSequence>) -> Self {
        Self { store, sequence }
    }

    pub fn store(&self) -> Arc<dyn ShipmentStore> {
        Arc::clone(&self.store)
    }

    /// Creates a shipment, minting its bilty number from the day-scoped
    /// sequence and running fare calculation before persisting
    #[instrument(skip(self, input), fields(sender = %input.sender_name))]
    pub async fn create(
        &self,
        input: NewShipment,
        created_by: &str,
    ) -> Result<Shipment, ShipmentError> {
        validate_new_shipment(&input)?;

        let today = Utc::now().date_naive();
        let serial = self.sequence.next(&BiltyNumber::day_scope(today)).await?;
        let bilty_number = BiltyNumber::from_parts(today, serial);

        let mut shipment = Shipment::new(
            bilty_number,
            input.sender_name,
            input.sender_phone,
            input.receiver_name,
            input.receiver_phone,
            input.adda,
            input.currency,
            created_by,
        );
        apply_items(&mut shipment, input.items);

        let currency = shipment.currency;
        let surcharges = &mut shipment.surcharges;
        surcharges.mazdoori = input.mazdoori.unwrap_or_else(|| Money::zero(currency));
        surcharges.bilty_charges = input.bilty_charges.unwrap_or_else(|| Money::zero(currency));
        surcharges.reri_charges = input.reri_charges.unwrap_or_else(|| Money::zero(currency));
        surcharges.extra_charges = input.extra_charges.unwrap_or_else(|| Money::zero(currency));
        shipment.received_fare = input.received_fare.unwrap_or_else(|| Money::zero(currency));

        fare::recalculate(&mut shipment);
        self.store.insert(&shipment).await?;

        info!(bilty = %shipment.bilty_number, "shipment created");
        Ok(shipment)
    }

    pub async fn get(&self, id: ShipmentId) -> Result<Shipment, ShipmentError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| ShipmentError::not_found(id))
    }

    pub async fn list(&self, query: ShipmentQuery) -> Result<Vec<Shipment>, ShipmentError> {
        Ok(self.store.find(query).await?)
    }

    /// Unpaid shipments not yet rolled into a voucher
    pub async fn available_for_voucher(&self) -> Result<Vec<Shipment>, ShipmentError> {
        Ok(self.store.find(ShipmentQuery::available_for_voucher()).await?)
    }

    /// Applies an allow-listed update and re-derives the money fields
    #[instrument(skip(self, update))]
    pub async fn update(
        &self,
        id: ShipmentId,
        update: ShipmentUpdate,
    ) -> Result<Shipment, ShipmentError> {
        let mut shipment = self.get(id).await?;

        if let Some(sender_name) = update.sender_name {
            shipment.sender_name = sender_name;
        }
        if let Some(sender_phone) = update.sender_phone {
            shipment.sender_phone = sender_phone;
        }
        if let Some(receiver_name) = update.receiver_name {
            shipment.receiver_name = receiver_name;
        }
        if let Some(receiver_phone) = update.receiver_phone {
            shipment.receiver_phone = receiver_phone;
        }
        if let Some(adda) = update.adda {
            shipment.adda = adda;
        }
        if let Some(items) = update.items {
            apply_items(&mut shipment, items);
        }
        if let Some(mazdoori) = update.mazdoori {
            shipment.surcharges.mazdoori = mazdoori;
        }
        if let Some(bilty_charges) = update.bilty_charges {
            shipment.surcharges.bilty_charges = bilty_charges;
        }
        if let Some(reri_charges) = update.reri_charges {
            shipment.surcharges.reri_charges = reri_charges;
        }
        if let Some(extra_charges) = update.extra_charges {
            shipment.surcharges.extra_charges = extra_charges;
        }
        if let Some(received_fare) = update.received_fare {
            shipment.received_fare = received_fare;
        }
        if let Some(delivery_status) = update.delivery_status {
            shipment.delivery_status = delivery_status;
        }

        fare::recalculate(&mut shipment);
        shipment.touch();
        self.store.update(&shipment).await?;
        Ok(shipment)
    }

    /// Changes the billing status and runs the settlement branch of the
    /// fare calculator
    #[instrument(skip(self))]
    pub async fn set_payment_status(
        &self,
        id: ShipmentId,
        status: PaymentStatus,
    ) -> Result<Shipment, ShipmentError> {
        let mut shipment = self.get(id).await?;
        shipment.payment_status = status;
        fare::recalculate(&mut shipment);
        shipment.touch();
        self.store.update(&shipment).await?;
        info!(bilty = %shipment.bilty_number, ?status, "payment status changed");
        Ok(shipment)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: ShipmentId) -> Result<(), ShipmentError> {
        match self.store.delete(id).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => Err(ShipmentError::not_found(id)),
            Err(e) => Err(e.into()),
        }
    }
}

fn apply_items(shipment: &mut Shipment, items: Vec<NewLineItem>) {
    shipment.items = items
        .into_iter()
        .map(|item| LineItem::new(item.description, item.quantity, item.unit_fare))
        .collect();
}

fn validate_new_shipment(input: &NewShipment) -> Result<(), ShipmentError> {
    if input.sender_name.trim().is_empty() {
        return Err(ShipmentError::validation("sender name is required"));
    }
    if input.receiver_name.trim().is_empty() {
        return Err(ShipmentError::validation("receiver name is required"));
    }
    for item in &input.items {
        if item.unit_fare.is_negative() {
            return Err(ShipmentError::validation(format!(
                "unit fare for '{}' must not be negative",
                item.description
            )));
        }
        if item.unit_fare.currency() != input.currency {
            return Err(ShipmentError::validation(format!(
                "unit fare for '{}' is not in {}",
                item.description, input.currency
            )));
        }
    }
    Ok(())
}

impl From<ShipmentError> for PortError {
    fn from(e: ShipmentError) -> Self {
        match e {
            ShipmentError::NotFound(id) => PortError::not_found("Shipment", id),
            ShipmentError::Validation(message) => PortError::validation(message),
            ShipmentError::Conflict(message) => PortError::conflict(message),
            ShipmentError::Port(port) => port,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::mock::MemoryShipmentStore;
    use core_kernel::{Currency, InMemorySequence};
    use rust_decimal_macros::dec;

    fn pkr(amount: rust_decimal::Decimal) -> Money {
        Money::new(amount, Currency::PKR)
    }

    fn service() -> ShipmentService {
        ShipmentService::new(
            Arc::new(MemoryShipmentStore::new()),
            Arc::new(InMemorySequence::new()),
        )
    }

    fn new_shipment_input() -> NewShipment {
        NewShipment {
            sender_name: "Ali Traders".to_string(),
            sender_phone: "0300-1234567".to_string(),
            receiver_name: "Karachi Hardware".to_string(),
            receiver_phone: "0321-7654321".to_string(),
            adda: "Lahore Adda".to_string(),
            currency: Currency::PKR,
            items: vec![
                NewLineItem {
                    description: "Cement".to_string(),
                    quantity: 2,
                    unit_fare: pkr(dec!(100)),
                },
                NewLineItem {
                    description: "Pipes".to_string(),
                    quantity: 3,
                    unit_fare: pkr(dec!(50)),
                },
            ],
            mazdoori: Some(pkr(dec!(20))),
            bilty_charges: Some(pkr(dec!(10))),
            reri_charges: None,
            extra_charges: None,
            received_fare: Some(pkr(dec!(100))),
        }
    }

    #[tokio::test]
    async fn test_create_derives_totals_and_number() {
        let service = service();
        let shipment = service.create(new_shipment_input(), "clerk-1").await.unwrap();

        assert_eq!(shipment.total_fare.amount(), dec!(350));
        assert_eq!(shipment.total_charges.amount(), dec!(380));
        assert_eq!(shipment.remaining_fare.amount(), dec!(280));
        assert_eq!(shipment.created_by, "clerk-1");

        let (date, serial) = shipment.bilty_number.parts().unwrap();
        assert_eq!(date, Utc::now().date_naive());
        assert_eq!(serial, 1);
    }

    #[tokio::test]
    async fn test_serials_increment_within_the_day() {
        let service = service();
        let first = service.create(new_shipment_input(), "clerk-1").await.unwrap();
        let second = service.create(new_shipment_input(), "clerk-1").await.unwrap();

        assert_eq!(first.bilty_number.parts().unwrap().1, 1);
        assert_eq!(second.bilty_number.parts().unwrap().1, 2);
    }

    #[tokio::test]
    async fn test_mark_paid_settles() {
        let service = service();
        let shipment = service.create(new_shipment_input(), "clerk-1").await.unwrap();

        let paid = service
            .set_payment_status(shipment.id, PaymentStatus::Paid)
            .await
            .unwrap();
        assert_eq!(paid.remaining_fare.amount(), dec!(0));
        assert_eq!(paid.paid_by_customer.amount(), dec!(280));
    }

    #[tokio::test]
    async fn test_update_is_allow_listed_and_rederives() {
        let service = service();
        let shipment = service.create(new_shipment_input(), "clerk-1").await.unwrap();

        let updated = service
            .update(
                shipment.id,
                ShipmentUpdate {
                    received_fare: Some(pkr(dec!(200))),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.remaining_fare.amount(), dec!(180));
        // Identity and audit fields survive untouched.
        assert_eq!(updated.bilty_number, shipment.bilty_number);
        assert_eq!(updated.created_by, "clerk-1");
    }

    #[tokio::test]
    async fn test_validation_rejects_blank_sender() {
        let service = service();
        let mut input = new_shipment_input();
        input.sender_name = "  ".to_string();

        let err = service.create(input, "clerk-1").await.unwrap_err();
        assert!(matches!(err, ShipmentError::Validation(_)));
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let service = service();
        let err = service.get(ShipmentId::new_v7()).await.unwrap_err();
        assert!(matches!(err, ShipmentError::NotFound(_)));
    }
}
