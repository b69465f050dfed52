//! HTTP API tests against in-memory stores

use std::sync::Arc;

use axum_test::TestServer;
use serde_json::{json, Value};

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::InMemorySequence;
use domain_customer::ports::mock::MemoryCustomerStore;
use domain_shipment::ports::mock::MemoryShipmentStore;
use domain_trip::ports::mock::MemoryTripStore;
use domain_voucher::ports::mock::MemoryVoucherStore;
use interface_api::{auth, config::ApiConfig, create_router, AppState};

fn test_server() -> (TestServer, String) {
    let config = ApiConfig::default();
    let token = auth::issue_token(
        "clerk-1",
        vec!["admin".to_string()],
        &config.jwt_secret,
        config.jwt_expiration_secs,
    )
    .unwrap();

    let state = AppState::new(
        Arc::new(MemoryShipmentStore::new()),
        Arc::new(MemoryCustomerStore::new()),
        Arc::new(MemoryVoucherStore::new()),
        Arc::new(MemoryTripStore::new()),
        Arc::new(InMemorySequence::new()),
        None,
        config,
    );

    (TestServer::new(create_router(state)).unwrap(), token)
}

/// Monetary fields come back as decimal strings; compare them numerically
fn amount(value: &Value) -> Decimal {
    value.as_str().unwrap().parse().unwrap()
}

fn shipment_body() -> Value {
    json!({
        "sender_name": "Ali Traders",
        "sender_phone": "0300-1234567",
        "receiver_name": "Karachi Hardware",
        "receiver_phone": "0321-7654321",
        "adda": "Lahore Adda",
        "currency": "PKR",
        "items": [
            { "description": "Cement", "quantity": 2, "unit_fare": "100" },
            { "description": "Pipes", "quantity": 3, "unit_fare": "50" }
        ],
        "mazdoori": "20",
        "bilty_charges": "10",
        "received_fare": "100"
    })
}

#[tokio::test]
async fn test_health_is_public() {
    let (server, _token) = test_server();

    let response = server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "healthy");

    let ready = server.get("/health/ready").await;
    ready.assert_status_ok();
}

#[tokio::test]
async fn test_api_requires_a_token() {
    let (server, _token) = test_server();

    let response = server.get("/api/v1/shipments").await;
    assert_eq!(response.status_code(), 401);
}

#[tokio::test]
async fn test_create_shipment_derives_totals_and_seeds_ledger() {
    let (server, token) = test_server();

    let response = server
        .post("/api/v1/shipments")
        .authorization_bearer(&token)
        .json(&shipment_body())
        .await;
    assert_eq!(response.status_code(), 201);

    let shipment = response.json::<Value>();
    assert_eq!(amount(&shipment["total_fare"]), dec!(350));
    assert_eq!(amount(&shipment["total_charges"]), dec!(380));
    assert_eq!(amount(&shipment["remaining_fare"]), dec!(280));
    assert_eq!(shipment["payment_status"], "unpaid");
    assert_eq!(shipment["created_by"], "clerk-1");
    assert!(shipment["bilty_number"]
        .as_str()
        .unwrap()
        .starts_with("BLT-"));

    // The sender was auto-created with a matching ledger entry.
    let customers = server
        .get("/api/v1/customers")
        .authorization_bearer(&token)
        .add_query_param("name", "Ali Traders")
        .add_query_param("phone", "0300-1234567")
        .await
        .json::<Value>();
    let ledger = &customers[0]["ledger"];
    assert_eq!(ledger[0]["bilty_number"], shipment["bilty_number"]);
    assert_eq!(amount(&ledger[0]["amount_to_be_paid"]), dec!(280));
}

#[tokio::test]
async fn test_mark_paid_settles_the_remaining_fare() {
    let (server, token) = test_server();

    let shipment = server
        .post("/api/v1/shipments")
        .authorization_bearer(&token)
        .json(&shipment_body())
        .await
        .json::<Value>();
    let id = shipment["id"].as_str().unwrap();

    let response = server
        .put(&format!("/api/v1/shipments/{}/payment-status", id))
        .authorization_bearer(&token)
        .json(&json!({ "payment_status": "paid" }))
        .await;
    response.assert_status_ok();

    let paid = response.json::<Value>();
    assert_eq!(paid["payment_status"], "paid");
    assert_eq!(amount(&paid["remaining_fare"]), dec!(0));
    assert_eq!(amount(&paid["paid_by_customer"]), dec!(280));
}

#[tokio::test]
async fn test_blank_sender_is_a_validation_error() {
    let (server, token) = test_server();

    let mut body = shipment_body();
    body["sender_name"] = json!("");

    let response = server
        .post("/api/v1/shipments")
        .authorization_bearer(&token)
        .json(&body)
        .await;
    assert_eq!(response.status_code(), 422);
    assert_eq!(response.json::<Value>()["error"], "validation_error");
}

#[tokio::test]
async fn test_missing_shipment_is_404() {
    let (server, token) = test_server();

    let response = server
        .get("/api/v1/shipments/00000000-0000-0000-0000-000000000000")
        .authorization_bearer(&token)
        .await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_voucher_and_trip_flow() {
    let (server, token) = test_server();

    let shipment = server
        .post("/api/v1/shipments")
        .authorization_bearer(&token)
        .json(&shipment_body())
        .await
        .json::<Value>();
    let shipment_id = shipment["id"].as_str().unwrap();

    let customers = server
        .get("/api/v1/customers")
        .authorization_bearer(&token)
        .await
        .json::<Value>();
    let customer_id = customers[0]["id"].as_str().unwrap();

    // The unpaid shipment is in the consolidation pool.
    let pool = server
        .get("/api/v1/shipments/available-for-voucher")
        .authorization_bearer(&token)
        .await
        .json::<Value>();
    assert_eq!(pool[0]["id"], shipment["id"]);

    // Consolidate it with 10% company tax: 280 + 28 = 308.
    let voucher = server
        .post("/api/v1/vouchers")
        .authorization_bearer(&token)
        .json(&json!({
            "customer_id": customer_id,
            "currency": "PKR",
            "items": [{ "shipment_id": shipment_id, "amount": "280" }],
            "tax_percentage": "10"
        }))
        .await;
    assert_eq!(voucher.status_code(), 201);
    let voucher = voucher.json::<Value>();
    assert_eq!(amount(&voucher["subtotal"]), dec!(280));
    assert_eq!(amount(&voucher["company_tax"]), dec!(28));
    assert_eq!(amount(&voucher["total_amount"]), dec!(308));
    let voucher_id = voucher["id"].as_str().unwrap();

    // The shipment left the pool.
    let pool = server
        .get("/api/v1/shipments/available-for-voucher")
        .authorization_bearer(&token)
        .await
        .json::<Value>();
    assert_eq!(pool.as_array().unwrap().len(), 0);

    // Record a partial payment.
    let paid = server
        .put(&format!("/api/v1/vouchers/{}/payment", voucher_id))
        .authorization_bearer(&token)
        .json(&json!({ "amount": "100" }))
        .await
        .json::<Value>();
    assert_eq!(paid["status"], "partial");

    // Bind the voucher onto a trip.
    let trip = server
        .post("/api/v1/trips")
        .authorization_bearer(&token)
        .json(&json!({
            "driver_name": "Rashid",
            "driver_phone": "0345-1112223",
            "vehicle_number": "LES-1234",
            "origin": "Lahore",
            "destination": "Karachi",
            "voucher_ids": [voucher_id]
        }))
        .await;
    assert_eq!(trip.status_code(), 201);

    // A second trip over the same voucher conflicts.
    let again = server
        .post("/api/v1/trips")
        .authorization_bearer(&token)
        .json(&json!({
            "driver_name": "Imran",
            "driver_phone": "0345-9998887",
            "vehicle_number": "KHI-5678",
            "origin": "Lahore",
            "destination": "Karachi",
            "voucher_ids": [voucher_id]
        }))
        .await;
    assert_eq!(again.status_code(), 409);
}

#[tokio::test]
async fn test_repair_reports_a_clean_pass() {
    let (server, token) = test_server();

    server
        .post("/api/v1/shipments")
        .authorization_bearer(&token)
        .json(&shipment_body())
        .await;

    let report = server
        .post("/api/v1/shipments/repair")
        .authorization_bearer(&token)
        .await
        .json::<Value>();
    assert_eq!(report["scanned"], 1);
    assert_eq!(report["repaired"], 0);
    assert_eq!(report["items_fixed"], 0);
}

#[tokio::test]
async fn test_write_requires_permission() {
    let (server, _token) = test_server();
    let config = ApiConfig::default();
    let read_only = auth::issue_token(
        "viewer-1",
        vec!["shipment:read".to_string()],
        &config.jwt_secret,
        config.jwt_expiration_secs,
    )
    .unwrap();

    let response = server
        .post("/api/v1/shipments")
        .authorization_bearer(&read_only)
        .json(&shipment_body())
        .await;
    assert_eq!(response.status_code(), 403);
}

#[tokio::test]
async fn test_ledger_endpoints_round_trip() {
    let (server, token) = test_server();

    let customer = server
        .post("/api/v1/customers")
        .authorization_bearer(&token)
        .json(&json!({ "name": "Bilal & Sons", "phone": "0333-0001112" }))
        .await
        .json::<Value>();
    let id = customer["id"].as_str().unwrap();

    let with_entry = server
        .post(&format!("/api/v1/customers/{}/ledger", id))
        .authorization_bearer(&token)
        .json(&json!({
            "bilty_number": "BLT-20240307-1",
            "amount_to_be_paid": "280",
            "currency": "PKR"
        }))
        .await;
    assert_eq!(with_entry.status_code(), 201);

    let paid = server
        .put(&format!("/api/v1/customers/{}/ledger/BLT-20240307-1", id))
        .authorization_bearer(&token)
        .json(&json!({ "payment_status": "paid" }))
        .await
        .json::<Value>();
    assert_eq!(paid["ledger"][0]["payment_status"], "paid");
    assert_eq!(amount(&paid["ledger"][0]["paid_by_customer"]), dec!(280));

    let removed = server
        .delete(&format!("/api/v1/customers/{}/ledger/BLT-20240307-1", id))
        .authorization_bearer(&token)
        .await
        .json::<Value>();
    assert_eq!(removed["ledger"].as_array().unwrap().len(), 0);
}
