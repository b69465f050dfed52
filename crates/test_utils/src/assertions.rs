//! Custom assertion helpers for domain types

use rust_decimal::Decimal;

use core_kernel::Money;
use domain_shipment::{PaymentStatus, Shipment};

/// Asserts a money value equals the expected amount
#[track_caller]
pub fn assert_amount(money: Money, expected: Decimal) {
    assert_eq!(
        money.amount(),
        expected,
        "expected {} {}, got {}",
        expected,
        money.currency(),
        money
    );
}

/// Asserts every derived field on the shipment is consistent with its inputs
#[track_caller]
pub fn assert_shipment_consistent(shipment: &Shipment) {
    let mut total_fare = Money::zero(shipment.currency);
    for item in &shipment.items {
        assert_eq!(
            item.line_total,
            item.computed_total(),
            "stale line total on '{}'",
            item.description
        );
        total_fare = total_fare + item.line_total;
    }
    assert_eq!(shipment.total_fare, total_fare, "stale total fare");
    assert_eq!(
        shipment.total_charges,
        total_fare + shipment.surcharges.total(),
        "stale total charges"
    );

    match shipment.payment_status {
        PaymentStatus::Paid => {
            assert!(shipment.remaining_fare.is_zero(), "paid bilty still owes");
        }
        PaymentStatus::Unpaid => {
            assert_eq!(
                shipment.remaining_fare,
                shipment.total_charges - shipment.received_fare,
                "stale remaining fare"
            );
        }
    }
}
