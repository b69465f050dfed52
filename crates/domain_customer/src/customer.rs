//! Customer aggregate
//!
//! A customer is identified softly by the (name, phone) pair entered at the
//! counter. Each customer embeds an ordered ledger with one entry per bilty,
//! tracking what is still due and what has been settled.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{BiltyNumber, CustomerId, Money};
use domain_shipment::PaymentStatus;

use crate::error::CustomerError;

/// Customer account status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerStatus {
    Active,
    Inactive,
}

/// One ledger row per bilty
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BiltyLedgerEntry {
    pub bilty_number: BiltyNumber,
    /// Outstanding amount for this bilty
    pub amount_to_be_paid: Money,
    pub payment_status: PaymentStatus,
    /// Settled amount, filled when the entry is marked paid
    pub paid_by_customer: Money,
}

impl BiltyLedgerEntry {
    /// Creates an unpaid entry for the given due amount
    pub fn unpaid(bilty_number: BiltyNumber, amount_to_be_paid: Money) -> Self {
        let currency = amount_to_be_paid.currency();
        Self {
            bilty_number,
            amount_to_be_paid,
            payment_status: PaymentStatus::Unpaid,
            paid_by_customer: Money::zero(currency),
        }
    }
}

/// The customer aggregate with its embedded bilty ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub phone: String,
    pub address: Option<String>,
    pub status: CustomerStatus,
    /// Ordered, one entry per bilty number
    pub ledger: Vec<BiltyLedgerEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: CustomerId::new_v7(),
            name: name.into(),
            phone: phone.into(),
            address: None,
            status: CustomerStatus::Active,
            ledger: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn ledger_entry(&self, bilty_number: &BiltyNumber) -> Option<&BiltyLedgerEntry> {
        self.ledger.iter().find(|e| &e.bilty_number == bilty_number)
    }

    /// Appends a ledger entry; a second entry for the same bilty is a conflict
    pub fn add_ledger_entry(&mut self, entry: BiltyLedgerEntry) -> Result<(), CustomerError> {
        if self.ledger_entry(&entry.bilty_number).is_some() {
            return Err(CustomerError::Conflict(format!(
                "ledger already has an entry for {}",
                entry.bilty_number
            )));
        }
        self.ledger.push(entry);
        self.touch();
        Ok(())
    }

    /// Changes the payment status of one ledger entry
    ///
    /// Marking paid requires a positive due amount and moves it into
    /// `paid_by_customer`; marking back unpaid reverses the move.
    pub fn set_entry_payment_status(
        &mut self,
        bilty_number: &BiltyNumber,
        status: PaymentStatus,
    ) -> Result<&BiltyLedgerEntry, CustomerError> {
        let entry = self
            .ledger
            .iter_mut()
            .find(|e| &e.bilty_number == bilty_number)
            .ok_or_else(|| CustomerError::EntryNotFound(bilty_number.to_string()))?;

        match status {
            PaymentStatus::Paid => {
                if entry.payment_status == PaymentStatus::Paid {
                    return Err(CustomerError::Conflict(format!(
                        "{} is already paid",
                        bilty_number
                    )));
                }
                if !entry.amount_to_be_paid.is_positive() {
                    return Err(CustomerError::Validation(format!(
                        "nothing is due on {}",
                        bilty_number
                    )));
                }
                entry.paid_by_customer = entry.amount_to_be_paid;
                entry.amount_to_be_paid = Money::zero(entry.amount_to_be_paid.currency());
                entry.payment_status = PaymentStatus::Paid;
            }
            PaymentStatus::Unpaid => {
                entry.amount_to_be_paid = entry.paid_by_customer;
                entry.paid_by_customer = Money::zero(entry.paid_by_customer.currency());
                entry.payment_status = PaymentStatus::Unpaid;
            }
        }

        self.touch();
        // Re-borrow immutably for the return value.
        Ok(self
            .ledger
            .iter()
            .find(|e| &e.bilty_number == bilty_number)
            .ok_or_else(|| CustomerError::EntryNotFound(bilty_number.to_string()))?)
    }

    /// Removes the entry for the given bilty
    pub fn remove_ledger_entry(&mut self, bilty_number: &BiltyNumber) -> Result<(), CustomerError> {
        let before = self.ledger.len();
        self.ledger.retain(|e| &e.bilty_number != bilty_number);
        if self.ledger.len() == before {
            return Err(CustomerError::EntryNotFound(bilty_number.to_string()));
        }
        self.touch();
        Ok(())
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    fn pkr(amount: rust_decimal::Decimal) -> Money {
        Money::new(amount, Currency::PKR)
    }

    fn bilty(serial: u64) -> BiltyNumber {
        BiltyNumber::from_parts(NaiveDate::from_ymd_opt(2024, 3, 7).unwrap(), serial)
    }

    #[test]
    fn test_duplicate_ledger_entry_conflicts() {
        let mut customer = Customer::new("Ali Traders", "0300-1234567");
        customer
            .add_ledger_entry(BiltyLedgerEntry::unpaid(bilty(1), pkr(dec!(280))))
            .unwrap();

        let err = customer
            .add_ledger_entry(BiltyLedgerEntry::unpaid(bilty(1), pkr(dec!(100))))
            .unwrap_err();
        assert!(matches!(err, CustomerError::Conflict(_)));
        assert_eq!(customer.ledger.len(), 1);
    }

    #[test]
    fn test_mark_paid_moves_the_due_amount() {
        let mut customer = Customer::new("Ali Traders", "0300-1234567");
        customer
            .add_ledger_entry(BiltyLedgerEntry::unpaid(bilty(1), pkr(dec!(280))))
            .unwrap();

        let entry = customer
            .set_entry_payment_status(&bilty(1), PaymentStatus::Paid)
            .unwrap();
        assert_eq!(entry.payment_status, PaymentStatus::Paid);
        assert_eq!(entry.amount_to_be_paid.amount(), dec!(0));
        assert_eq!(entry.paid_by_customer.amount(), dec!(280));
    }

    #[test]
    fn test_mark_paid_requires_a_positive_due() {
        let mut customer = Customer::new("Ali Traders", "0300-1234567");
        customer
            .add_ledger_entry(BiltyLedgerEntry::unpaid(bilty(1), pkr(dec!(0))))
            .unwrap();

        let err = customer
            .set_entry_payment_status(&bilty(1), PaymentStatus::Paid)
            .unwrap_err();
        assert!(matches!(err, CustomerError::Validation(_)));
    }

    #[test]
    fn test_mark_back_unpaid_reverses_the_move() {
        let mut customer = Customer::new("Ali Traders", "0300-1234567");
        customer
            .add_ledger_entry(BiltyLedgerEntry::unpaid(bilty(1), pkr(dec!(280))))
            .unwrap();
        customer
            .set_entry_payment_status(&bilty(1), PaymentStatus::Paid)
            .unwrap();

        let entry = customer
            .set_entry_payment_status(&bilty(1), PaymentStatus::Unpaid)
            .unwrap();
        assert_eq!(entry.payment_status, PaymentStatus::Unpaid);
        assert_eq!(entry.amount_to_be_paid.amount(), dec!(280));
        assert_eq!(entry.paid_by_customer.amount(), dec!(0));
    }

    #[test]
    fn test_remove_missing_entry() {
        let mut customer = Customer::new("Ali Traders", "0300-1234567");
        let err = customer.remove_ledger_entry(&bilty(9)).unwrap_err();
        assert!(matches!(err, CustomerError::EntryNotFound(_)));
    }
}
