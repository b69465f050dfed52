//! Trip handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use domain_trip::TripQuery;

use super::authorize;
use crate::auth::{permissions, Claims};
use crate::dto::trip::*;
use crate::error::ApiError;
use crate::AppState;

/// Creates a trip and consumes its vouchers
pub async fn create_trip(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<CreateTripRequest>,
) -> Result<(StatusCode, Json<TripResponse>), ApiError> {
    authorize(&claims, permissions::TRIP_WRITE)?;
    request.validate()?;

    let trip = state.binder.create(request.into_domain(), &claims.sub).await?;
    Ok((StatusCode::CREATED, Json(trip.into())))
}

/// Lists trips, newest first
pub async fn list_trips(
    State(state): State<AppState>,
    Query(params): Query<TripListParams>,
) -> Result<Json<Vec<TripResponse>>, ApiError> {
    let trips = state
        .binder
        .list(TripQuery {
            limit: params.limit,
            offset: params.offset,
        })
        .await?;
    Ok(Json(trips.into_iter().map(Into::into).collect()))
}

/// Gets a trip by ID
pub async fn get_trip(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TripResponse>, ApiError> {
    let trip = state.binder.get(id.into()).await?;
    Ok(Json(trip.into()))
}
