//! Test Data Builders
//!
//! Builder patterns for constructing test aggregates with sensible defaults.
//! Tests specify only the fields they care about; everything else falls back
//! to the standard fixture values.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{Currency, CustomerId, Money, Rate, ShipmentId};
use domain_customer::{BiltyLedgerEntry, Customer};
use domain_shipment::{LineItem, NewLineItem, NewShipment, PaymentStatus, Shipment};
use domain_voucher::{Voucher, VoucherBiltyRef};

use crate::fixtures::{NumberFixtures, PartyFixtures};

/// Builder for intake input (`NewShipment`)
pub struct TestShipmentInputBuilder {
    sender: (String, String),
    receiver: (String, String),
    adda: String,
    currency: Currency,
    items: Vec<NewLineItem>,
    mazdoori: Option<Money>,
    bilty_charges: Option<Money>,
    received_fare: Option<Money>,
}

impl Default for TestShipmentInputBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestShipmentInputBuilder {
    /// Defaults: two line items (350 total), 30 in surcharges, 100 received
    pub fn new() -> Self {
        let (sender_name, sender_phone) = PartyFixtures::sender();
        let (receiver_name, receiver_phone) = PartyFixtures::receiver();
        Self {
            sender: (sender_name.to_string(), sender_phone.to_string()),
            receiver: (receiver_name.to_string(), receiver_phone.to_string()),
            adda: "Lahore Adda".to_string(),
            currency: Currency::PKR,
            items: vec![
                NewLineItem {
                    description: "Cement".to_string(),
                    quantity: 2,
                    unit_fare: Money::new(dec!(100), Currency::PKR),
                },
                NewLineItem {
                    description: "Pipes".to_string(),
                    quantity: 3,
                    unit_fare: Money::new(dec!(50), Currency::PKR),
                },
            ],
            mazdoori: Some(Money::new(dec!(20), Currency::PKR)),
            bilty_charges: Some(Money::new(dec!(10), Currency::PKR)),
            received_fare: Some(Money::new(dec!(100), Currency::PKR)),
        }
    }

    pub fn with_sender(mut self, name: impl Into<String>, phone: impl Into<String>) -> Self {
        self.sender = (name.into(), phone.into());
        self
    }

    pub fn with_items(mut self, items: Vec<(&str, i64, Decimal)>) -> Self {
        let currency = self.currency;
        self.items = items
            .into_iter()
            .map(|(description, quantity, unit_fare)| NewLineItem {
                description: description.to_string(),
                quantity,
                unit_fare: Money::new(unit_fare, currency),
            })
            .collect();
        self
    }

    pub fn with_received_fare(mut self, amount: Decimal) -> Self {
        self.received_fare = Some(Money::new(amount, self.currency));
        self
    }

    pub fn build(self) -> NewShipment {
        NewShipment {
            sender_name: self.sender.0,
            sender_phone: self.sender.1,
            receiver_name: self.receiver.0,
            receiver_phone: self.receiver.1,
            adda: self.adda,
            currency: self.currency,
            items: self.items,
            mazdoori: self.mazdoori,
            bilty_charges: self.bilty_charges,
            reri_charges: None,
            extra_charges: None,
            received_fare: self.received_fare,
        }
    }
}

/// Builder for raw shipment aggregates, e.g. to seed imported records
pub struct TestShipmentBuilder {
    serial: u64,
    items: Vec<LineItem>,
    payment_status: PaymentStatus,
}

impl Default for TestShipmentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestShipmentBuilder {
    pub fn new() -> Self {
        Self {
            serial: 1,
            items: vec![LineItem::new("Cement", 2, Money::new(dec!(100), Currency::PKR))],
            payment_status: PaymentStatus::Unpaid,
        }
    }

    pub fn with_serial(mut self, serial: u64) -> Self {
        self.serial = serial;
        self
    }

    /// Adds an item whose cached line total is deliberately wrong, as left
    /// behind by imports
    pub fn with_stale_item(mut self, quantity: i64, unit_fare: Decimal, cached: Decimal) -> Self {
        let mut item = LineItem::new("Imported", quantity, Money::new(unit_fare, Currency::PKR));
        item.line_total = Money::new(cached, Currency::PKR);
        self.items = vec![item];
        self
    }

    pub fn paid(mut self) -> Self {
        self.payment_status = PaymentStatus::Paid;
        self
    }

    pub fn build(self) -> Shipment {
        let (sender_name, sender_phone) = PartyFixtures::sender();
        let (receiver_name, receiver_phone) = PartyFixtures::receiver();
        let mut shipment = Shipment::new(
            NumberFixtures::bilty(self.serial),
            sender_name,
            sender_phone,
            receiver_name,
            receiver_phone,
            "Lahore Adda",
            Currency::PKR,
            "import",
        );
        shipment.items = self.items;
        shipment.payment_status = self.payment_status;
        shipment
    }
}

/// Builder for customer aggregates with ledger entries
pub struct TestCustomerBuilder {
    name: String,
    phone: String,
    entries: Vec<BiltyLedgerEntry>,
}

impl Default for TestCustomerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestCustomerBuilder {
    pub fn new() -> Self {
        let (name, phone) = PartyFixtures::sender();
        Self {
            name: name.to_string(),
            phone: phone.to_string(),
            entries: Vec::new(),
        }
    }

    pub fn with_entry(mut self, serial: u64, due: Decimal) -> Self {
        self.entries.push(BiltyLedgerEntry::unpaid(
            NumberFixtures::bilty(serial),
            Money::new(due, Currency::PKR),
        ));
        self
    }

    pub fn build(self) -> Customer {
        let mut customer = Customer::new(self.name, self.phone);
        for entry in self.entries {
            // Serials are distinct by construction.
            let _ = customer.add_ledger_entry(entry);
        }
        customer
    }
}

/// Builder for voucher aggregates
pub struct TestVoucherBuilder {
    customer_id: CustomerId,
    bilties: Vec<VoucherBiltyRef>,
    tax_percentage: Decimal,
}

impl Default for TestVoucherBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestVoucherBuilder {
    pub fn new() -> Self {
        Self {
            customer_id: CustomerId::new_v7(),
            bilties: vec![VoucherBiltyRef {
                shipment_id: ShipmentId::new_v7(),
                bilty_number: NumberFixtures::bilty(1),
                amount: Money::new(dec!(280), Currency::PKR),
            }],
            tax_percentage: dec!(0),
        }
    }

    pub fn with_bilty(mut self, serial: u64, amount: Decimal) -> Self {
        self.bilties.push(VoucherBiltyRef {
            shipment_id: ShipmentId::new_v7(),
            bilty_number: NumberFixtures::bilty(serial),
            amount: Money::new(amount, Currency::PKR),
        });
        self
    }

    pub fn with_tax(mut self, percentage: Decimal) -> Self {
        self.tax_percentage = percentage;
        self
    }

    pub fn build(self) -> Voucher {
        Voucher::new(
            NumberFixtures::voucher_number().parse().unwrap(),
            self.customer_id,
            Currency::PKR,
            self.bilties,
            Rate::from_percentage(self.tax_percentage),
            "clerk-1",
        )
    }
}
