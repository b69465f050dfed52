//! Shipment ("bilty") aggregate
//!
//! A bilty is the freight receipt issued when goods enter the depot. It
//! carries the line items being shipped, the handling surcharges, and the
//! running settlement state (received / remaining / paid-by-customer).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use core_kernel::{BiltyNumber, Currency, Money, ShipmentId};

/// Billing status of a shipment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    Unpaid,
}

/// Physical delivery status of a shipment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Pending,
    Delivered,
    Returned,
}

/// A line item on a bilty
///
/// `line_total` is a cached value; the fare calculator recomputes it from
/// quantity and unit fare and never trusts the stored figure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub id: Uuid,
    pub description: String,
    /// Item count as entered at the counter; may be zero or negative on
    /// bad input, which the calculator floors to zero
    pub quantity: i64,
    pub unit_fare: Money,
    /// Cached `max(0, quantity) × unit_fare`
    pub line_total: Money,
}

impl LineItem {
    /// Creates a new line item with a freshly computed total
    pub fn new(description: impl Into<String>, quantity: i64, unit_fare: Money) -> Self {
        let mut item = Self {
            id: Uuid::new_v4(),
            description: description.into(),
            quantity,
            unit_fare,
            line_total: Money::zero(unit_fare.currency()),
        };
        item.line_total = item.computed_total();
        item
    }

    /// The authoritative total for this item: `max(0, quantity) × unit_fare`
    pub fn computed_total(&self) -> Money {
        let quantity = self.quantity.max(0);
        self.unit_fare.multiply(quantity.into())
    }
}

/// Handling surcharges added on top of the freight fare
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Surcharges {
    /// Labor / loading charges
    pub mazdoori: Money,
    /// Charge for issuing the bilty itself
    pub bilty_charges: Money,
    /// Cart (reri) / incidental transport charges
    pub reri_charges: Money,
    /// Anything else
    pub extra_charges: Money,
}

impl Surcharges {
    pub fn zero(currency: Currency) -> Self {
        Self {
            mazdoori: Money::zero(currency),
            bilty_charges: Money::zero(currency),
            reri_charges: Money::zero(currency),
            extra_charges: Money::zero(currency),
        }
    }

    /// Sum of all surcharges
    pub fn total(&self) -> Money {
        self.mazdoori + self.bilty_charges + self.reri_charges + self.extra_charges
    }
}

/// The bilty aggregate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shipment {
    pub id: ShipmentId,
    /// Human-readable bilty number, unique (`BLT-YYYYMMDD-N`)
    pub bilty_number: BiltyNumber,
    pub sender_name: String,
    pub sender_phone: String,
    pub receiver_name: String,
    pub receiver_phone: String,
    /// Originating depot
    pub adda: String,
    pub currency: Currency,
    pub items: Vec<LineItem>,
    pub surcharges: Surcharges,
    /// Σ line totals (derived, never caller-supplied)
    pub total_fare: Money,
    /// `total_fare` plus all surcharges
    pub total_charges: Money,
    /// Amount collected up front when the bilty was issued
    pub received_fare: Money,
    /// `total_charges − received_fare` while unpaid; zero once paid.
    /// Overpayment leaves this negative, which is preserved as a credit.
    pub remaining_fare: Money,
    /// Settled amount, captured once when the bilty is marked paid
    pub paid_by_customer: Money,
    pub payment_status: PaymentStatus,
    pub delivery_status: DeliveryStatus,
    /// Set once the bilty has been rolled into a customer voucher
    pub voucher_made: bool,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Shipment {
    /// Creates a new shipment; totals start at zero and are filled in by the
    /// fare calculator before the record is persisted
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        bilty_number: BiltyNumber,
        sender_name: impl Into<String>,
        sender_phone: impl Into<String>,
        receiver_name: impl Into<String>,
        receiver_phone: impl Into<String>,
        adda: impl Into<String>,
        currency: Currency,
        created_by: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ShipmentId::new_v7(),
            bilty_number,
            sender_name: sender_name.into(),
            sender_phone: sender_phone.into(),
            receiver_name: receiver_name.into(),
            receiver_phone: receiver_phone.into(),
            adda: adda.into(),
            currency,
            items: Vec::new(),
            surcharges: Surcharges::zero(currency),
            total_fare: Money::zero(currency),
            total_charges: Money::zero(currency),
            received_fare: Money::zero(currency),
            remaining_fare: Money::zero(currency),
            paid_by_customer: Money::zero(currency),
            payment_status: PaymentStatus::Unpaid,
            delivery_status: DeliveryStatus::Pending,
            voucher_made: false,
            created_by: created_by.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// The calendar date the bilty was issued
    pub fn issue_date(&self) -> NaiveDate {
        self.created_at.date_naive()
    }

    /// True when the shipment can still be rolled into a voucher
    pub fn available_for_voucher(&self) -> bool {
        self.payment_status == PaymentStatus::Unpaid && !self.voucher_made
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::BiltyNumber;
    use rust_decimal_macros::dec;

    fn test_bilty_number() -> BiltyNumber {
        BiltyNumber::from_parts(NaiveDate::from_ymd_opt(2024, 3, 7).unwrap(), 1)
    }

    #[test]
    fn test_line_item_total() {
        let item = LineItem::new("Cement bags", 2, Money::new(dec!(100), Currency::PKR));
        assert_eq!(item.line_total.amount(), dec!(200));
    }

    #[test]
    fn test_negative_quantity_floors_to_zero() {
        let item = LineItem::new("Damaged crate", -3, Money::new(dec!(50), Currency::PKR));
        assert_eq!(item.computed_total().amount(), dec!(0));
    }

    #[test]
    fn test_surcharge_total() {
        let mut s = Surcharges::zero(Currency::PKR);
        s.mazdoori = Money::new(dec!(20), Currency::PKR);
        s.bilty_charges = Money::new(dec!(10), Currency::PKR);
        assert_eq!(s.total().amount(), dec!(30));
    }

    #[test]
    fn test_new_shipment_defaults() {
        let shipment = Shipment::new(
            test_bilty_number(),
            "Ali Traders",
            "0300-1234567",
            "Karachi Hardware",
            "0321-7654321",
            "Lahore Adda",
            Currency::PKR,
            "clerk-1",
        );
        assert_eq!(shipment.payment_status, PaymentStatus::Unpaid);
        assert_eq!(shipment.delivery_status, DeliveryStatus::Pending);
        assert!(!shipment.voucher_made);
        assert!(shipment.available_for_voucher());
        assert!(shipment.total_charges.is_zero());
    }
}
