//! Shipment DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use core_kernel::{Currency, Money};
use domain_shipment::{
    DeliveryStatus, NewLineItem, NewShipment, PaymentStatus, RepairReport, Shipment,
    ShipmentUpdate,
};

#[derive(Debug, Deserialize, Validate)]
pub struct LineItemRequest {
    #[validate(length(min = 1))]
    pub description: String,
    pub quantity: i64,
    pub unit_fare: Decimal,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateShipmentRequest {
    #[validate(length(min = 1))]
    pub sender_name: String,
    #[validate(length(min = 1))]
    pub sender_phone: String,
    #[validate(length(min = 1))]
    pub receiver_name: String,
    pub receiver_phone: String,
    pub adda: String,
    pub currency: Currency,
    #[validate(nested)]
    pub items: Vec<LineItemRequest>,
    pub mazdoori: Option<Decimal>,
    pub bilty_charges: Option<Decimal>,
    pub reri_charges: Option<Decimal>,
    pub extra_charges: Option<Decimal>,
    pub received_fare: Option<Decimal>,
}

impl CreateShipmentRequest {
    pub fn into_domain(self) -> NewShipment {
        let currency = self.currency;
        let money = |amount: Option<Decimal>| amount.map(|a| Money::new(a, currency));
        NewShipment {
            sender_name: self.sender_name,
            sender_phone: self.sender_phone,
            receiver_name: self.receiver_name,
            receiver_phone: self.receiver_phone,
            adda: self.adda,
            currency,
            items: self
                .items
                .into_iter()
                .map(|item| NewLineItem {
                    description: item.description,
                    quantity: item.quantity,
                    unit_fare: Money::new(item.unit_fare, currency),
                })
                .collect(),
            mazdoori: money(self.mazdoori),
            bilty_charges: money(self.bilty_charges),
            reri_charges: money(self.reri_charges),
            extra_charges: money(self.extra_charges),
            received_fare: money(self.received_fare),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateShipmentRequest {
    pub sender_name: Option<String>,
    pub sender_phone: Option<String>,
    pub receiver_name: Option<String>,
    pub receiver_phone: Option<String>,
    pub adda: Option<String>,
    pub items: Option<Vec<LineItemRequest>>,
    pub mazdoori: Option<Decimal>,
    pub bilty_charges: Option<Decimal>,
    pub reri_charges: Option<Decimal>,
    pub extra_charges: Option<Decimal>,
    pub received_fare: Option<Decimal>,
    pub delivery_status: Option<DeliveryStatus>,
}

impl UpdateShipmentRequest {
    /// Converts to the domain allow-list; `currency` is the shipment's own,
    /// which updates can never change
    pub fn into_domain(self, currency: Currency) -> ShipmentUpdate {
        let money = |amount: Option<Decimal>| amount.map(|a| Money::new(a, currency));
        ShipmentUpdate {
            sender_name: self.sender_name,
            sender_phone: self.sender_phone,
            receiver_name: self.receiver_name,
            receiver_phone: self.receiver_phone,
            adda: self.adda,
            items: self.items.map(|items| {
                items
                    .into_iter()
                    .map(|item| NewLineItem {
                        description: item.description,
                        quantity: item.quantity,
                        unit_fare: Money::new(item.unit_fare, currency),
                    })
                    .collect()
            }),
            mazdoori: money(self.mazdoori),
            bilty_charges: money(self.bilty_charges),
            reri_charges: money(self.reri_charges),
            extra_charges: money(self.extra_charges),
            received_fare: money(self.received_fare),
            delivery_status: self.delivery_status,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SetPaymentStatusRequest {
    pub payment_status: PaymentStatus,
}

/// List filters, all optional
#[derive(Debug, Default, Deserialize)]
pub struct ShipmentListParams {
    pub payment_status: Option<PaymentStatus>,
    pub delivery_status: Option<DeliveryStatus>,
    pub voucher_made: Option<bool>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct LineItemResponse {
    pub id: Uuid,
    pub description: String,
    pub quantity: i64,
    pub unit_fare: Decimal,
    pub line_total: Decimal,
}

#[derive(Debug, Serialize)]
pub struct ShipmentResponse {
    pub id: Uuid,
    pub bilty_number: String,
    pub sender_name: String,
    pub sender_phone: String,
    pub receiver_name: String,
    pub receiver_phone: String,
    pub adda: String,
    pub currency: Currency,
    pub items: Vec<LineItemResponse>,
    pub mazdoori: Decimal,
    pub bilty_charges: Decimal,
    pub reri_charges: Decimal,
    pub extra_charges: Decimal,
    pub total_fare: Decimal,
    pub total_charges: Decimal,
    pub received_fare: Decimal,
    pub remaining_fare: Decimal,
    pub paid_by_customer: Decimal,
    pub payment_status: PaymentStatus,
    pub delivery_status: DeliveryStatus,
    pub voucher_made: bool,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Shipment> for ShipmentResponse {
    fn from(s: Shipment) -> Self {
        Self {
            id: s.id.into(),
            bilty_number: s.bilty_number.to_string(),
            sender_name: s.sender_name,
            sender_phone: s.sender_phone,
            receiver_name: s.receiver_name,
            receiver_phone: s.receiver_phone,
            adda: s.adda,
            currency: s.currency,
            items: s
                .items
                .into_iter()
                .map(|item| LineItemResponse {
                    id: item.id,
                    description: item.description,
                    quantity: item.quantity,
                    unit_fare: item.unit_fare.amount(),
                    line_total: item.line_total.amount(),
                })
                .collect(),
            mazdoori: s.surcharges.mazdoori.amount(),
            bilty_charges: s.surcharges.bilty_charges.amount(),
            reri_charges: s.surcharges.reri_charges.amount(),
            extra_charges: s.surcharges.extra_charges.amount(),
            total_fare: s.total_fare.amount(),
            total_charges: s.total_charges.amount(),
            received_fare: s.received_fare.amount(),
            remaining_fare: s.remaining_fare.amount(),
            paid_by_customer: s.paid_by_customer.amount(),
            payment_status: s.payment_status,
            delivery_status: s.delivery_status,
            voucher_made: s.voucher_made,
            created_by: s.created_by,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RepairFailureResponse {
    pub shipment_id: Uuid,
    pub bilty_number: String,
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct RepairResponse {
    pub scanned: usize,
    pub repaired: usize,
    pub items_fixed: usize,
    pub failures: Vec<RepairFailureResponse>,
}

impl From<RepairReport> for RepairResponse {
    fn from(report: RepairReport) -> Self {
        Self {
            scanned: report.scanned,
            repaired: report.repaired,
            items_fixed: report.items_fixed,
            failures: report
                .failures
                .into_iter()
                .map(|f| RepairFailureResponse {
                    shipment_id: f.shipment_id.into(),
                    bilty_number: f.bilty_number,
                    reason: f.reason,
                })
                .collect(),
        }
    }
}
