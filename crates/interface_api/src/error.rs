//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use core_kernel::PortError;
use domain_customer::CustomerError;
use domain_shipment::ShipmentError;
use domain_trip::TripError;
use domain_voucher::VoucherError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", "Unauthorized".to_string()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg.clone()),
            ApiError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error", msg.clone()),
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            details: None,
        };

        (status, Json(body)).into_response()
    }
}

impl From<PortError> for ApiError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            PortError::Validation { .. } => ApiError::Validation(err.to_string()),
            PortError::Conflict { .. } => ApiError::Conflict(err.to_string()),
            PortError::Connection { .. } | PortError::Internal { .. } => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}

impl From<ShipmentError> for ApiError {
    fn from(err: ShipmentError) -> Self {
        match err {
            ShipmentError::NotFound(id) => ApiError::NotFound(format!("shipment {}", id)),
            ShipmentError::Validation(msg) => ApiError::Validation(msg),
            ShipmentError::Conflict(msg) => ApiError::Conflict(msg),
            ShipmentError::Port(port) => port.into(),
        }
    }
}

impl From<CustomerError> for ApiError {
    fn from(err: CustomerError) -> Self {
        match err {
            CustomerError::NotFound(id) => ApiError::NotFound(format!("customer {}", id)),
            CustomerError::EntryNotFound(bilty) => {
                ApiError::NotFound(format!("ledger entry {}", bilty))
            }
            CustomerError::Validation(msg) => ApiError::Validation(msg),
            CustomerError::Conflict(msg) => ApiError::Conflict(msg),
            CustomerError::Shipment(inner) => inner.into(),
            CustomerError::Port(port) => port.into(),
        }
    }
}

impl From<VoucherError> for ApiError {
    fn from(err: VoucherError) -> Self {
        match err {
            VoucherError::NotFound(id) => ApiError::NotFound(format!("voucher {}", id)),
            // Referenced in the request body, so the request is at fault.
            VoucherError::ShipmentNotFound(id) => {
                ApiError::Validation(format!("shipment {} does not exist", id))
            }
            VoucherError::Validation(msg) => ApiError::Validation(msg),
            VoucherError::Conflict(msg) => ApiError::Conflict(msg),
            VoucherError::Port(port) => port.into(),
        }
    }
}

impl From<TripError> for ApiError {
    fn from(err: TripError) -> Self {
        match err {
            TripError::NotFound(id) => ApiError::NotFound(format!("trip {}", id)),
            TripError::VoucherNotFound(id) => {
                ApiError::Validation(format!("voucher {} does not exist", id))
            }
            TripError::Validation(msg) => ApiError::Validation(msg),
            TripError::Conflict(msg) => ApiError::Conflict(msg),
            TripError::Port(port) => port.into(),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::Validation(err.to_string())
    }
}
