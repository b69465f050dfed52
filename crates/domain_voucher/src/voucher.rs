//! Voucher aggregate
//!
//! A voucher rolls a customer's unpaid bilties into one consolidated invoice
//! and applies the company tax once at creation. The bilty list is immutable
//! after creation; only the payment side moves.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{BiltyNumber, Currency, CustomerId, Money, Rate, ShipmentId, VoucherId, VoucherNumber};

/// Settlement status of a voucher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoucherStatus {
    Paid,
    Unpaid,
    Partial,
}

/// One consolidated bilty on a voucher
///
/// `amount` is the shipment's unpaid remainder at consolidation time, frozen
/// here so later shipment edits do not rewrite issued vouchers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoucherBiltyRef {
    pub shipment_id: ShipmentId,
    pub bilty_number: BiltyNumber,
    pub amount: Money,
}

/// The voucher aggregate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Voucher {
    pub id: VoucherId,
    /// Human-readable voucher number, unique (`VCH-YYYY-MMDD-RRR`)
    pub voucher_number: VoucherNumber,
    pub customer_id: CustomerId,
    pub currency: Currency,
    /// Immutable after creation
    pub bilties: Vec<VoucherBiltyRef>,
    /// Company tax applied once at creation
    pub tax_percentage: Rate,
    /// Σ bilty amounts
    pub subtotal: Money,
    /// `subtotal × tax_percentage`
    pub company_tax: Money,
    /// `subtotal + company_tax`
    pub total_amount: Money,
    pub paid_amount: Money,
    pub status: VoucherStatus,
    /// Set once the voucher has been bound into a trip settlement
    pub trip_made: bool,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Voucher {
    /// Creates a voucher, deriving the tax and total fields
    pub fn new(
        voucher_number: VoucherNumber,
        customer_id: CustomerId,
        currency: Currency,
        bilties: Vec<VoucherBiltyRef>,
        tax_percentage: Rate,
        created_by: impl Into<String>,
    ) -> Self {
        let subtotal = bilties
            .iter()
            .fold(Money::zero(currency), |acc, b| acc + b.amount);
        let company_tax = tax_percentage.apply(&subtotal);
        let total_amount = subtotal + company_tax;
        let now = Utc::now();

        Self {
            id: VoucherId::new_v7(),
            voucher_number,
            customer_id,
            currency,
            bilties,
            tax_percentage,
            subtotal,
            company_tax,
            total_amount,
            paid_amount: Money::zero(currency),
            status: VoucherStatus::Unpaid,
            trip_made: false,
            created_by: created_by.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Outstanding balance: `total_amount − paid_amount`
    pub fn remaining_amount(&self) -> Money {
        self.total_amount - self.paid_amount
    }

    /// Records a payment and re-derives the status
    pub fn record_payment(&mut self, amount: Money) {
        self.paid_amount = self.paid_amount + amount;
        self.status = if self.paid_amount >= self.total_amount {
            VoucherStatus::Paid
        } else if self.paid_amount.is_positive() {
            VoucherStatus::Partial
        } else {
            VoucherStatus::Unpaid
        };
        self.updated_at = Utc::now();
    }

    pub fn available_for_trip(&self) -> bool {
        !self.trip_made
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn pkr(amount: rust_decimal::Decimal) -> Money {
        Money::new(amount, Currency::PKR)
    }

    fn bilty_ref(serial: u64, amount: rust_decimal::Decimal) -> VoucherBiltyRef {
        VoucherBiltyRef {
            shipment_id: ShipmentId::new_v7(),
            bilty_number: BiltyNumber::from_parts(
                NaiveDate::from_ymd_opt(2024, 3, 7).unwrap(),
                serial,
            ),
            amount: pkr(amount),
        }
    }

    fn voucher(bilties: Vec<VoucherBiltyRef>, tax_pct: rust_decimal::Decimal) -> Voucher {
        Voucher::new(
            "VCH-2024-0307-001".parse().unwrap(),
            CustomerId::new_v7(),
            Currency::PKR,
            bilties,
            Rate::from_percentage(tax_pct),
            "clerk-1",
        )
    }

    #[test]
    fn test_tax_math() {
        // 280 + 120 = 400 subtotal, 10% tax = 40, total 440
        let v = voucher(
            vec![bilty_ref(1, dec!(280)), bilty_ref(2, dec!(120))],
            dec!(10),
        );
        assert_eq!(v.subtotal.amount(), dec!(400));
        assert_eq!(v.company_tax.amount(), dec!(40));
        assert_eq!(v.total_amount.amount(), dec!(440));
        assert_eq!(v.remaining_amount().amount(), dec!(440));
    }

    #[test]
    fn test_zero_tax_default() {
        let v = voucher(vec![bilty_ref(1, dec!(280))], dec!(0));
        assert_eq!(v.company_tax.amount(), dec!(0));
        assert_eq!(v.total_amount.amount(), dec!(280));
    }

    #[test]
    fn test_payment_derives_status() {
        let mut v = voucher(
            vec![bilty_ref(1, dec!(280)), bilty_ref(2, dec!(120))],
            dec!(10),
        );
        assert_eq!(v.status, VoucherStatus::Unpaid);

        v.record_payment(pkr(dec!(100)));
        assert_eq!(v.status, VoucherStatus::Partial);
        assert_eq!(v.remaining_amount().amount(), dec!(340));

        v.record_payment(pkr(dec!(340)));
        assert_eq!(v.status, VoucherStatus::Paid);
        assert_eq!(v.remaining_amount().amount(), dec!(0));
    }
}
