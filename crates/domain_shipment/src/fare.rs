//! Fare calculation
//!
//! The calculator is the single place where shipment money fields are
//! derived. It is pure of I/O: it mutates the aggregate in memory and
//! reports what changed, and callers decide whether to persist.
//!
//! Derivation rules:
//!
//! - every cached line total is recomputed as `max(0, quantity) × unit_fare`
//! - `total_fare` is the sum of the recomputed line totals
//! - `total_charges = total_fare + mazdoori + bilty_charges + reri_charges
//!   + extra_charges`
//! - paid shipments settle: `remaining_fare` goes to zero and
//!   `paid_by_customer` is captured once as `total_charges − received_fare`
//!   (an already-captured nonzero value is never overwritten)
//! - unpaid shipments carry `remaining_fare = total_charges − received_fare`,
//!   which stays negative on overpayment (the credit is preserved)

use crate::shipment::{PaymentStatus, Shipment};
use core_kernel::Money;

/// What a recalculation changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FareDelta {
    /// True if any stored field differs from its derived value
    pub changed: bool,
    /// Number of line items whose cached total was stale
    pub items_fixed: usize,
}

/// Recomputes all derived money fields on the shipment
pub fn recalculate(shipment: &mut Shipment) -> FareDelta {
    let mut delta = FareDelta::default();
    let currency = shipment.currency;

    let mut total_fare = Money::zero(currency);
    for item in &mut shipment.items {
        let expected = item.computed_total();
        if item.line_total != expected {
            item.line_total = expected;
            delta.items_fixed += 1;
            delta.changed = true;
        }
        total_fare = total_fare + item.line_total;
    }

    let total_charges = total_fare + shipment.surcharges.total();

    if shipment.total_fare != total_fare {
        shipment.total_fare = total_fare;
        delta.changed = true;
    }
    if shipment.total_charges != total_charges {
        shipment.total_charges = total_charges;
        delta.changed = true;
    }

    match shipment.payment_status {
        PaymentStatus::Paid => {
            let zero = Money::zero(currency);
            if shipment.remaining_fare != zero {
                shipment.remaining_fare = zero;
                delta.changed = true;
            }
            // The settled amount is captured exactly once.
            if shipment.paid_by_customer.is_zero() {
                let settled = total_charges - shipment.received_fare;
                if shipment.paid_by_customer != settled {
                    shipment.paid_by_customer = settled;
                    delta.changed = true;
                }
            }
        }
        PaymentStatus::Unpaid => {
            let remaining = total_charges - shipment.received_fare;
            if shipment.remaining_fare != remaining {
                shipment.remaining_fare = remaining;
                delta.changed = true;
            }
        }
    }

    if delta.changed {
        shipment.touch();
    }
    delta
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shipment::{LineItem, Shipment};
    use chrono::NaiveDate;
    use core_kernel::{BiltyNumber, Currency, Money};
    use rust_decimal_macros::dec;

    fn pkr(amount: rust_decimal::Decimal) -> Money {
        Money::new(amount, Currency::PKR)
    }

    fn base_shipment() -> Shipment {
        Shipment::new(
            BiltyNumber::from_parts(NaiveDate::from_ymd_opt(2024, 3, 7).unwrap(), 1),
            "Ali Traders",
            "0300-1234567",
            "Karachi Hardware",
            "0321-7654321",
            "Lahore Adda",
            Currency::PKR,
            "clerk-1",
        )
    }

    #[test]
    fn test_total_fare_from_line_items() {
        // 2 × 100 + 3 × 50 = 350
        let mut shipment = base_shipment();
        shipment.items.push(LineItem::new("Cement", 2, pkr(dec!(100))));
        shipment.items.push(LineItem::new("Pipes", 3, pkr(dec!(50))));

        recalculate(&mut shipment);
        assert_eq!(shipment.total_fare.amount(), dec!(350));
        assert_eq!(shipment.total_charges.amount(), dec!(350));
    }

    #[test]
    fn test_surcharges_and_remaining() {
        // fare 350 + mazdoori 20 + bilty 10 = 380; received 100 leaves 280
        let mut shipment = base_shipment();
        shipment.items.push(LineItem::new("Cement", 2, pkr(dec!(100))));
        shipment.items.push(LineItem::new("Pipes", 3, pkr(dec!(50))));
        shipment.surcharges.mazdoori = pkr(dec!(20));
        shipment.surcharges.bilty_charges = pkr(dec!(10));
        shipment.received_fare = pkr(dec!(100));

        recalculate(&mut shipment);
        assert_eq!(shipment.total_charges.amount(), dec!(380));
        assert_eq!(shipment.remaining_fare.amount(), dec!(280));
    }

    #[test]
    fn test_marking_paid_settles_once() {
        let mut shipment = base_shipment();
        shipment.items.push(LineItem::new("Cement", 2, pkr(dec!(100))));
        shipment.items.push(LineItem::new("Pipes", 3, pkr(dec!(50))));
        shipment.surcharges.mazdoori = pkr(dec!(20));
        shipment.surcharges.bilty_charges = pkr(dec!(10));
        shipment.received_fare = pkr(dec!(100));
        recalculate(&mut shipment);

        shipment.payment_status = PaymentStatus::Paid;
        recalculate(&mut shipment);
        assert_eq!(shipment.remaining_fare.amount(), dec!(0));
        assert_eq!(shipment.paid_by_customer.amount(), dec!(280));

        // A second pass must not overwrite the captured settlement.
        shipment.received_fare = pkr(dec!(150));
        recalculate(&mut shipment);
        assert_eq!(shipment.paid_by_customer.amount(), dec!(280));
    }

    #[test]
    fn test_overpayment_keeps_negative_remaining() {
        let mut shipment = base_shipment();
        shipment.items.push(LineItem::new("Cement", 1, pkr(dec!(100))));
        shipment.received_fare = pkr(dec!(150));

        recalculate(&mut shipment);
        assert_eq!(shipment.remaining_fare.amount(), dec!(-50));
        assert!(shipment.remaining_fare.is_negative());
    }

    #[test]
    fn test_stale_cached_totals_are_repaired() {
        let mut shipment = base_shipment();
        let mut item = LineItem::new("Cement", 2, pkr(dec!(100)));
        item.line_total = pkr(dec!(999));
        shipment.items.push(item);

        let delta = recalculate(&mut shipment);
        assert!(delta.changed);
        assert_eq!(delta.items_fixed, 1);
        assert_eq!(shipment.items[0].line_total.amount(), dec!(200));
        assert_eq!(shipment.total_fare.amount(), dec!(200));
    }

    #[test]
    fn test_recalculation_is_idempotent() {
        let mut shipment = base_shipment();
        shipment.items.push(LineItem::new("Cement", 2, pkr(dec!(100))));
        shipment.surcharges.extra_charges = pkr(dec!(5));
        shipment.received_fare = pkr(dec!(50));

        let first = recalculate(&mut shipment);
        assert!(first.changed);

        let second = recalculate(&mut shipment);
        assert!(!second.changed);
        assert_eq!(second.items_fixed, 0);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::shipment::{LineItem, Shipment};
    use chrono::NaiveDate;
    use core_kernel::{BiltyNumber, Currency, Money};
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    fn shipment_with_items(items: Vec<(i64, i64)>) -> Shipment {
        let mut shipment = Shipment::new(
            BiltyNumber::from_parts(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 1),
            "s",
            "p",
            "r",
            "p2",
            "adda",
            Currency::PKR,
            "test",
        );
        for (quantity, fare) in items {
            shipment.items.push(LineItem::new(
                "item",
                quantity,
                Money::new(Decimal::new(fare, 0), Currency::PKR),
            ));
        }
        shipment
    }

    proptest! {
        #[test]
        fn total_fare_is_sum_of_nonnegative_line_totals(
            items in prop::collection::vec((-100i64..100, 0i64..10_000), 0..8)
        ) {
            let mut shipment = shipment_with_items(items.clone());
            recalculate(&mut shipment);

            let expected: Decimal = items
                .iter()
                .map(|&(q, f)| Decimal::new(q.max(0) * f, 0))
                .sum();
            prop_assert_eq!(shipment.total_fare.amount(), expected);
        }

        #[test]
        fn second_pass_never_changes_anything(
            items in prop::collection::vec((-100i64..100, 0i64..10_000), 0..8),
            received in 0i64..1_000_000
        ) {
            let mut shipment = shipment_with_items(items);
            shipment.received_fare = Money::new(Decimal::new(received, 0), Currency::PKR);

            recalculate(&mut shipment);
            let delta = recalculate(&mut shipment);
            prop_assert!(!delta.changed);
        }
    }
}
