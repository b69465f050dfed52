//! Customer and ledger handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use core_kernel::{BiltyNumber, Money};
use domain_customer::CustomerQuery;

use super::authorize;
use crate::auth::{permissions, Claims};
use crate::dto::customer::*;
use crate::error::ApiError;
use crate::AppState;

/// Creates a customer
pub async fn create_customer(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<CreateCustomerRequest>,
) -> Result<(StatusCode, Json<CustomerResponse>), ApiError> {
    authorize(&claims, permissions::CUSTOMER_WRITE)?;
    request.validate()?;

    let customer = state.customers.create(request.into_domain()).await?;
    Ok((StatusCode::CREATED, Json(customer.into())))
}

/// Lists customers, newest first
pub async fn list_customers(
    State(state): State<AppState>,
    Query(params): Query<CustomerListParams>,
) -> Result<Json<Vec<CustomerResponse>>, ApiError> {
    let customers = state
        .customers
        .list(CustomerQuery {
            name: params.name,
            phone: params.phone,
            limit: params.limit,
            offset: params.offset,
        })
        .await?;
    Ok(Json(customers.into_iter().map(Into::into).collect()))
}

/// Gets a customer by ID
pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CustomerResponse>, ApiError> {
    let customer = state.customers.get(id.into()).await?;
    Ok(Json(customer.into()))
}

/// Applies an allow-listed update
pub async fn update_customer(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateCustomerRequest>,
) -> Result<Json<CustomerResponse>, ApiError> {
    authorize(&claims, permissions::CUSTOMER_WRITE)?;

    let customer = state
        .customers
        .update(id.into(), request.into_domain())
        .await?;
    Ok(Json(customer.into()))
}

/// Deletes a customer
pub async fn delete_customer(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    authorize(&claims, permissions::CUSTOMER_WRITE)?;

    state.customers.delete(id.into()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Appends a ledger entry by hand
pub async fn add_ledger_entry(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(request): Json<AddLedgerEntryRequest>,
) -> Result<(StatusCode, Json<CustomerResponse>), ApiError> {
    authorize(&claims, permissions::CUSTOMER_WRITE)?;

    let bilty_number = parse_bilty(&request.bilty_number)?;
    let amount = Money::new(request.amount_to_be_paid, request.currency);
    let customer = state
        .customers
        .add_bilty(id.into(), bilty_number, amount)
        .await?;
    Ok((StatusCode::CREATED, Json(customer.into())))
}

/// Flips one ledger entry between paid and unpaid
pub async fn set_ledger_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((id, bilty_number)): Path<(Uuid, String)>,
    Json(request): Json<SetLedgerStatusRequest>,
) -> Result<Json<CustomerResponse>, ApiError> {
    authorize(&claims, permissions::CUSTOMER_WRITE)?;

    let bilty_number = parse_bilty(&bilty_number)?;
    let customer = state
        .customers
        .set_bilty_payment_status(id.into(), &bilty_number, request.payment_status)
        .await?;
    Ok(Json(customer.into()))
}

/// Removes one ledger entry
pub async fn remove_ledger_entry(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((id, bilty_number)): Path<(Uuid, String)>,
) -> Result<Json<CustomerResponse>, ApiError> {
    authorize(&claims, permissions::CUSTOMER_WRITE)?;

    let bilty_number = parse_bilty(&bilty_number)?;
    let customer = state
        .customers
        .remove_bilty(id.into(), &bilty_number)
        .await?;
    Ok(Json(customer.into()))
}

fn parse_bilty(raw: &str) -> Result<BiltyNumber, ApiError> {
    raw.parse()
        .map_err(|e: core_kernel::NumberError| ApiError::Validation(e.to_string()))
}
