//! Voucher DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use core_kernel::{Currency, Money};
use domain_voucher::{ConsolidationItem, NewVoucher, Voucher, VoucherBiltyRef, VoucherStatus};

#[derive(Debug, Serialize, Deserialize)]
pub struct VoucherItemRequest {
    pub shipment_id: Uuid,
    pub amount: Decimal,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateVoucherRequest {
    pub customer_id: Uuid,
    pub currency: Currency,
    #[validate(length(min = 1))]
    pub items: Vec<VoucherItemRequest>,
    pub tax_percentage: Option<Decimal>,
    pub voucher_number: Option<String>,
}

impl CreateVoucherRequest {
    pub fn into_domain(self) -> NewVoucher {
        let currency = self.currency;
        NewVoucher {
            customer_id: self.customer_id.into(),
            currency,
            items: self
                .items
                .into_iter()
                .map(|item| ConsolidationItem {
                    shipment_id: item.shipment_id.into(),
                    amount: Money::new(item.amount, currency),
                })
                .collect(),
            tax_percentage: self.tax_percentage,
            voucher_number: self.voucher_number,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RecordPaymentRequest {
    pub amount: Decimal,
}

/// List filters, all optional
#[derive(Debug, Default, Deserialize)]
pub struct VoucherListParams {
    pub customer_id: Option<Uuid>,
    pub trip_made: Option<bool>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct VoucherBiltyResponse {
    pub shipment_id: Uuid,
    pub bilty_number: String,
    pub amount: Decimal,
}

impl From<VoucherBiltyRef> for VoucherBiltyResponse {
    fn from(r: VoucherBiltyRef) -> Self {
        Self {
            shipment_id: r.shipment_id.into(),
            bilty_number: r.bilty_number.to_string(),
            amount: r.amount.amount(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VoucherResponse {
    pub id: Uuid,
    pub voucher_number: String,
    pub customer_id: Uuid,
    pub currency: Currency,
    pub bilties: Vec<VoucherBiltyResponse>,
    pub tax_percentage: Decimal,
    pub subtotal: Decimal,
    pub company_tax: Decimal,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub remaining_amount: Decimal,
    pub status: VoucherStatus,
    pub trip_made: bool,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Voucher> for VoucherResponse {
    fn from(v: Voucher) -> Self {
        let remaining_amount = v.remaining_amount().amount();
        Self {
            id: v.id.into(),
            voucher_number: v.voucher_number.to_string(),
            customer_id: v.customer_id.into(),
            currency: v.currency,
            bilties: v.bilties.into_iter().map(Into::into).collect(),
            tax_percentage: v.tax_percentage.as_percentage(),
            subtotal: v.subtotal.amount(),
            company_tax: v.company_tax.amount(),
            total_amount: v.total_amount.amount(),
            paid_amount: v.paid_amount.amount(),
            remaining_amount,
            status: v.status,
            trip_made: v.trip_made,
            created_by: v.created_by,
            created_at: v.created_at,
            updated_at: v.updated_at,
        }
    }
}
