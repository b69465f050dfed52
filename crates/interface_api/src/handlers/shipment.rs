//! Shipment handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use domain_shipment::ShipmentQuery;

use super::authorize;
use crate::auth::{permissions, Claims};
use crate::dto::shipment::*;
use crate::error::ApiError;
use crate::AppState;

/// Creates a shipment; the sender's ledger is seeded in the same operation
pub async fn create_shipment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<CreateShipmentRequest>,
) -> Result<(StatusCode, Json<ShipmentResponse>), ApiError> {
    authorize(&claims, permissions::SHIPMENT_WRITE)?;
    request.validate()?;

    let shipment = state
        .intake
        .create_shipment(request.into_domain(), &claims.sub)
        .await?;
    Ok((StatusCode::CREATED, Json(shipment.into())))
}

/// Lists shipments, newest first
pub async fn list_shipments(
    State(state): State<AppState>,
    Query(params): Query<ShipmentListParams>,
) -> Result<Json<Vec<ShipmentResponse>>, ApiError> {
    let shipments = state
        .shipments
        .list(ShipmentQuery {
            payment_status: params.payment_status,
            delivery_status: params.delivery_status,
            voucher_made: params.voucher_made,
            limit: params.limit,
            offset: params.offset,
        })
        .await?;
    Ok(Json(shipments.into_iter().map(Into::into).collect()))
}

/// Unpaid shipments not yet rolled into a voucher
pub async fn available_for_voucher(
    State(state): State<AppState>,
) -> Result<Json<Vec<ShipmentResponse>>, ApiError> {
    let shipments = state.shipments.available_for_voucher().await?;
    Ok(Json(shipments.into_iter().map(Into::into).collect()))
}

/// Gets a shipment by ID
pub async fn get_shipment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ShipmentResponse>, ApiError> {
    let shipment = state.shipments.get(id.into()).await?;
    Ok(Json(shipment.into()))
}

/// Applies an allow-listed update
pub async fn update_shipment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateShipmentRequest>,
) -> Result<Json<ShipmentResponse>, ApiError> {
    authorize(&claims, permissions::SHIPMENT_WRITE)?;

    // Monetary fields on the wire are amounts in the shipment's own currency.
    let current = state.shipments.get(id.into()).await?;
    let updated = state
        .shipments
        .update(id.into(), request.into_domain(current.currency))
        .await?;
    Ok(Json(updated.into()))
}

/// Flips the billing status and settles (or re-opens) the remaining fare
pub async fn set_payment_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(request): Json<SetPaymentStatusRequest>,
) -> Result<Json<ShipmentResponse>, ApiError> {
    authorize(&claims, permissions::SHIPMENT_WRITE)?;

    let shipment = state
        .shipments
        .set_payment_status(id.into(), request.payment_status)
        .await?;
    Ok(Json(shipment.into()))
}

/// Deletes a shipment
pub async fn delete_shipment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    authorize(&claims, permissions::SHIPMENT_WRITE)?;

    state.shipments.delete(id.into()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Runs one repair pass over all shipments
pub async fn run_repair(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<RepairResponse>, ApiError> {
    authorize(&claims, permissions::SHIPMENT_REPAIR)?;

    let report = state.repair.run().await?;
    Ok(Json(report.into()))
}
