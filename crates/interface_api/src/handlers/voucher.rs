//! Voucher handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use core_kernel::Money;
use domain_voucher::VoucherQuery;

use super::authorize;
use crate::auth::{permissions, Claims};
use crate::dto::voucher::*;
use crate::error::ApiError;
use crate::AppState;

/// Consolidates shipments into a new voucher
pub async fn create_voucher(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<CreateVoucherRequest>,
) -> Result<(StatusCode, Json<VoucherResponse>), ApiError> {
    authorize(&claims, permissions::VOUCHER_WRITE)?;
    request.validate()?;

    let voucher = state
        .consolidator
        .create(request.into_domain(), &claims.sub)
        .await?;
    Ok((StatusCode::CREATED, Json(voucher.into())))
}

/// Lists vouchers, newest first
pub async fn list_vouchers(
    State(state): State<AppState>,
    Query(params): Query<VoucherListParams>,
) -> Result<Json<Vec<VoucherResponse>>, ApiError> {
    let vouchers = state
        .consolidator
        .list(VoucherQuery {
            customer_id: params.customer_id.map(Into::into),
            trip_made: params.trip_made,
            limit: params.limit,
            offset: params.offset,
        })
        .await?;
    Ok(Json(vouchers.into_iter().map(Into::into).collect()))
}

/// Vouchers not yet bound into a trip settlement
pub async fn available_for_trip(
    State(state): State<AppState>,
) -> Result<Json<Vec<VoucherResponse>>, ApiError> {
    let vouchers = state.consolidator.available_for_trip().await?;
    Ok(Json(vouchers.into_iter().map(Into::into).collect()))
}

/// Gets a voucher by ID
pub async fn get_voucher(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<VoucherResponse>, ApiError> {
    let voucher = state.consolidator.get(id.into()).await?;
    Ok(Json(voucher.into()))
}

/// Records a payment against the voucher
pub async fn record_payment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(request): Json<RecordPaymentRequest>,
) -> Result<Json<VoucherResponse>, ApiError> {
    authorize(&claims, permissions::VOUCHER_WRITE)?;

    // The payment is in the voucher's own currency.
    let voucher = state.consolidator.get(id.into()).await?;
    let amount = Money::new(request.amount, voucher.currency);
    let voucher = state.consolidator.record_payment(id.into(), amount).await?;
    Ok(Json(voucher.into()))
}
