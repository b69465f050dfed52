//! Voucher Domain - consolidated customer invoices
//!
//! A voucher rolls a customer's unpaid bilties into one settlement document,
//! applying the company tax once at creation. The consolidator keeps the
//! shipment pool consistent by flagging consumed bilties.

pub mod consolidator;
pub mod error;
pub mod ports;
pub mod voucher;

pub use consolidator::{ConsolidationItem, NewVoucher, VoucherConsolidator};
pub use error::VoucherError;
pub use ports::{VoucherQuery, VoucherStore};
pub use voucher::{Voucher, VoucherBiltyRef, VoucherStatus};
