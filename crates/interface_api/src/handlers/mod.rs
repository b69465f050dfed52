//! Request handlers

pub mod customer;
pub mod health;
pub mod shipment;
pub mod trip;
pub mod voucher;

use crate::auth::{has_permission, Claims};
use crate::error::ApiError;

/// Rejects the request unless the caller carries the permission (or `admin`)
pub(crate) fn authorize(claims: &Claims, permission: &str) -> Result<(), ApiError> {
    if has_permission(claims, permission) {
        Ok(())
    } else {
        Err(ApiError::Forbidden(format!(
            "missing permission: {}",
            permission
        )))
    }
}
