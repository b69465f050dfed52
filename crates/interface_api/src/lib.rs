//! REST API for the freight billing back office
//!
//! Routes live under `/api/v1` behind bearer-token auth; `/health` is public.
//! `AppState` wires the domain services over any set of store ports, so the
//! same router runs against PostgreSQL in the server binary and against the
//! in-memory mocks in the HTTP tests.

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use core_kernel::SerialSequence;
use domain_customer::{CustomerService, CustomerStore, ShipmentIntake};
use domain_shipment::{RepairJob, ShipmentService, ShipmentStore};
use domain_trip::{TripBinder, TripStore};
use domain_voucher::{VoucherConsolidator, VoucherStore};

use crate::config::ApiConfig;
use crate::handlers::{customer, health, shipment, trip, voucher};
use crate::middleware::{audit_middleware, auth_middleware};

/// Application state shared across handlers
///
/// Holds the domain services wired over the store ports. The pool is only
/// present when a real database backs the stores; the readiness probe skips
/// the database check otherwise.
#[derive(Clone)]
pub struct AppState {
    pub shipments: Arc<ShipmentService>,
    pub customers: Arc<CustomerService>,
    pub intake: Arc<ShipmentIntake>,
    pub consolidator: Arc<VoucherConsolidator>,
    pub binder: Arc<TripBinder>,
    pub repair: Arc<RepairJob>,
    pub pool: Option<PgPool>,
    pub config: ApiConfig,
}

impl AppState {
    /// Wires the domain services over the given store ports
    pub fn new(
        shipment_store: Arc<dyn ShipmentStore>,
        customer_store: Arc<dyn CustomerStore>,
        voucher_store: Arc<dyn VoucherStore>,
        trip_store: Arc<dyn TripStore>,
        sequence: Arc<dyn SerialSequence>,
        pool: Option<PgPool>,
        config: ApiConfig,
    ) -> Self {
        let shipments = Arc::new(ShipmentService::new(
            Arc::clone(&shipment_store),
            sequence,
        ));
        let intake = Arc::new(ShipmentIntake::new(
            Arc::clone(&shipments),
            Arc::clone(&customer_store),
        ));
        let customers = Arc::new(CustomerService::new(customer_store));
        let consolidator = Arc::new(VoucherConsolidator::new(
            Arc::clone(&voucher_store),
            Arc::clone(&shipment_store),
        ));
        let binder = Arc::new(TripBinder::new(trip_store, voucher_store));
        let repair = Arc::new(RepairJob::new(shipment_store));

        Self {
            shipments,
            customers,
            intake,
            consolidator,
            binder,
            repair,
            pool,
            config,
        }
    }
}

/// Builds the full router: public health probes plus the versioned API
/// behind the auth and audit layers.
pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let shipment_routes = Router::new()
        .route("/", post(shipment::create_shipment))
        .route("/", get(shipment::list_shipments))
        .route("/available-for-voucher", get(shipment::available_for_voucher))
        .route("/repair", post(shipment::run_repair))
        .route("/:id", get(shipment::get_shipment))
        .route("/:id", put(shipment::update_shipment))
        .route("/:id", delete(shipment::delete_shipment))
        .route("/:id/payment-status", put(shipment::set_payment_status));

    let customer_routes = Router::new()
        .route("/", post(customer::create_customer))
        .route("/", get(customer::list_customers))
        .route("/:id", get(customer::get_customer))
        .route("/:id", put(customer::update_customer))
        .route("/:id", delete(customer::delete_customer))
        .route("/:id/ledger", post(customer::add_ledger_entry))
        .route("/:id/ledger/:bilty_number", put(customer::set_ledger_status))
        .route("/:id/ledger/:bilty_number", delete(customer::remove_ledger_entry));

    let voucher_routes = Router::new()
        .route("/", post(voucher::create_voucher))
        .route("/", get(voucher::list_vouchers))
        .route("/available-for-trip", get(voucher::available_for_trip))
        .route("/:id", get(voucher::get_voucher))
        .route("/:id/payment", put(voucher::record_payment));

    let trip_routes = Router::new()
        .route("/", post(trip::create_trip))
        .route("/", get(trip::list_trips))
        .route("/:id", get(trip::get_trip));

    let api_routes = Router::new()
        .nest("/shipments", shipment_routes)
        .nest("/customers", customer_routes)
        .nest("/vouchers", voucher_routes)
        .nest("/trips", trip_routes)
        .layer(axum_middleware::from_fn(audit_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
