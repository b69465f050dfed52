//! Pre-built Test Fixtures
//!
//! Ready-to-use test data for common entities across the freight billing
//! system. Fixtures are consistent and predictable for unit tests; the
//! faker-backed helpers produce varied but realistic counter entries.

use chrono::NaiveDate;
use fake::faker::name::en::Name;
use fake::faker::phone_number::en::PhoneNumber;
use fake::Fake;
use rust_decimal_macros::dec;

use core_kernel::{BiltyNumber, Currency, CustomerId, Money, ShipmentId, VoucherId};

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// Standard fare amount
    pub fn pkr_100() -> Money {
        Money::new(dec!(100), Currency::PKR)
    }

    /// Typical unpaid remainder after a partial advance
    pub fn pkr_280() -> Money {
        Money::new(dec!(280), Currency::PKR)
    }

    /// A zero amount
    pub fn pkr_zero() -> Money {
        Money::zero(Currency::PKR)
    }

    /// Another currency, for mismatch tests
    pub fn usd_100() -> Money {
        Money::new(dec!(100), Currency::USD)
    }
}

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// Standard issue date used across the suite (Mar 7, 2024)
    pub fn issue_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 7).unwrap()
    }
}

/// Fixture for document numbers
pub struct NumberFixtures;

impl NumberFixtures {
    /// A bilty number on the standard issue date
    pub fn bilty(serial: u64) -> BiltyNumber {
        BiltyNumber::from_parts(TemporalFixtures::issue_date(), serial)
    }

    /// A well-formed voucher number
    pub fn voucher_number() -> &'static str {
        "VCH-2024-0307-001"
    }
}

/// Fixture for identifiers
pub struct IdFixtures;

impl IdFixtures {
    pub fn shipment_id() -> ShipmentId {
        ShipmentId::new_v7()
    }

    pub fn customer_id() -> CustomerId {
        CustomerId::new_v7()
    }

    pub fn voucher_id() -> VoucherId {
        VoucherId::new_v7()
    }
}

/// Fixture for counter-entry strings
pub struct PartyFixtures;

impl PartyFixtures {
    /// The sender used by most scenarios
    pub fn sender() -> (&'static str, &'static str) {
        ("Ali Traders", "0300-1234567")
    }

    /// The receiver used by most scenarios
    pub fn receiver() -> (&'static str, &'static str) {
        ("Karachi Hardware", "0321-7654321")
    }

    /// A random but realistic (name, phone) pair
    pub fn random_party() -> (String, String) {
        (Name().fake(), PhoneNumber().fake())
    }
}
