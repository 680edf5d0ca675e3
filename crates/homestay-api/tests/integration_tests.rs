//! # Integration Tests for homestay-api
//!
//! Drives the fully assembled application: health probes, authentication,
//! the OpenAPI document, a complete stay from room setup through payment
//! as reflected on the dashboard, and the one-live-payment rule.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::NaiveDate;
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tower::ServiceExt;

use homestay_api::state::{AppConfig, AppState};
use homestay_core::FixedClock;

fn june(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
}

/// Helper: build the test app with auth disabled and the clock pinned.
fn test_app() -> axum::Router {
    let state = AppState::new().with_clock(Arc::new(FixedClock::at_date(june(10))));
    homestay_api::app(state)
}

/// Helper: build the test app with auth enabled.
fn test_app_with_auth(token: &str) -> axum::Router {
    let config = AppConfig {
        auth_token: Some(token.to_string()),
        ..AppConfig::default()
    };
    homestay_api::app(AppState::with_config(config, None))
}

async fn body_string(response: axum::http::Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: axum::http::Response<Body>) -> Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}

async fn call(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> axum::http::Response<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    let body = body.map_or_else(Body::empty, |b| Body::from(b.to_string()));
    app.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
}

fn decimal(value: &Value) -> Decimal {
    value.as_str().unwrap().parse().unwrap()
}

// -- Health Probes ------------------------------------------------------------

#[tokio::test]
async fn test_liveness_probe() {
    let response = call(&test_app(), "GET", "/health/liveness", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ok");
}

#[tokio::test]
async fn test_readiness_probe() {
    let response = call(&test_app(), "GET", "/health/readiness", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ready");
}

// -- Authentication -----------------------------------------------------------

#[tokio::test]
async fn test_auth_rejects_missing_token() {
    let app = test_app_with_auth("s3cret");
    let response = call(&app, "GET", "/v1/rooms", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_auth_accepts_valid_token() {
    let app = test_app_with_auth("s3cret");
    let response = app
        .oneshot(
            Request::builder()
                .uri("/v1/rooms")
                .header("authorization", "Bearer s3cret")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_health_probes_skip_auth() {
    let app = test_app_with_auth("s3cret");
    let response = call(&app, "GET", "/health/liveness", None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

// -- OpenAPI ------------------------------------------------------------------

#[tokio::test]
async fn test_openapi_document_is_served() {
    let response = call(&test_app(), "GET", "/openapi.json", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["info"]["title"], "Homestay API");
    assert!(body["paths"]["/v1/bookings/quote"].is_object());
}

// -- Error envelopes ----------------------------------------------------------

#[tokio::test]
async fn test_malformed_json_is_400() {
    let app = test_app();
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/rooms")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_record_is_404() {
    let uri = format!("/v1/bookings/{}", uuid::Uuid::new_v4());
    let response = call(&test_app(), "GET", &uri, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// -- End-to-end stay ----------------------------------------------------------

#[tokio::test]
async fn test_full_stay_reaches_dashboard() {
    let app = test_app();

    let room = body_json(
        call(
            &app,
            "POST",
            "/v1/rooms",
            Some(json!({
                "room_number": "101",
                "room_type": "double",
                "rate_per_night": "3000",
                "max_occupancy": 2,
                "amenities": "wifi, ac",
            })),
        )
        .await,
    )
    .await;
    let room_id = room["id"].as_str().unwrap().to_string();
    assert_eq!(room["status"], "available");

    let guest = body_json(
        call(
            &app,
            "POST",
            "/v1/guests",
            Some(json!({
                "first_name": "Asha",
                "last_name": "Rao",
                "email": "asha@example.com",
                "phone": "+91 98765 43210",
                "id_number": "1234-5678-9012",
                "address": "12 MG Road",
                "city": "Mysuru",
                "state": "Karnataka",
                "date_of_birth": "1990-02-14",
            })),
        )
        .await,
    )
    .await;
    let guest_id = guest["id"].as_str().unwrap().to_string();

    // Quote and booking agree on the amounts.
    let quote = body_json(
        call(
            &app,
            "POST",
            "/v1/bookings/quote",
            Some(json!({"room_id": room_id, "check_in": "2024-06-10", "check_out": "2024-06-13"})),
        )
        .await,
    )
    .await;
    assert_eq!(quote["nights"], 3);
    assert_eq!(decimal(&quote["total"]), Decimal::from(10620));

    let response = call(
        &app,
        "POST",
        "/v1/bookings",
        Some(json!({
            "guest_id": guest_id,
            "room_id": room_id,
            "check_in": "2024-06-10",
            "check_out": "2024-06-13",
            "number_of_guests": 2,
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let booking = body_json(response).await;
    let booking_id = booking["id"].as_str().unwrap().to_string();
    assert_eq!(decimal(&booking["subtotal"]), Decimal::from(9000));
    assert_eq!(decimal(&booking["tax"]), Decimal::from(1620));
    assert_eq!(decimal(&booking["total"]), decimal(&quote["total"]));

    // Overlapping stay in the same room is refused.
    let response = call(
        &app,
        "POST",
        "/v1/bookings",
        Some(json!({
            "guest_id": guest_id,
            "room_id": room_id,
            "check_in": "2024-06-12",
            "check_out": "2024-06-14",
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = call(
        &app,
        "POST",
        &format!("/v1/bookings/{booking_id}/transition"),
        Some(json!({"status": "checked_in"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let payment = body_json(
        call(
            &app,
            "POST",
            "/v1/payments",
            Some(json!({"booking_id": booking_id, "method": "upi"})),
        )
        .await,
    )
    .await;
    let payment_id = payment["id"].as_str().unwrap().to_string();
    assert_eq!(payment["status"], "pending");

    let response = call(
        &app,
        "POST",
        &format!("/v1/payments/{payment_id}/transition"),
        Some(json!({"status": "completed", "transaction_id": "UPI-889911"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let uri = format!("/v1/bookings/{booking_id}");
    let booking = body_json(call(&app, "GET", &uri, None).await).await;
    assert_eq!(booking["status"], "checked_in");
    assert_eq!(booking["payment_status"], "paid");
    assert_eq!(booking["guest_name"], "Asha Rao");
    assert_eq!(booking["room_number"], "101");

    let dashboard = body_json(call(&app, "GET", "/v1/dashboard", None).await).await;
    assert_eq!(dashboard["as_of"], "2024-06-10");
    assert_eq!(dashboard["occupancy"]["occupied"], 1);
    assert_eq!(dashboard["occupancy"]["occupancy_rate"], 100);
    assert_eq!(dashboard["bookings"]["total"], 1);
    assert_eq!(dashboard["bookings"]["active"], 1);
    assert_eq!(dashboard["guests"], 1);
    assert_eq!(decimal(&dashboard["revenue"]["today"]), Decimal::from(10620));
    assert_eq!(decimal(&dashboard["revenue"]["this_month"]), Decimal::from(10620));
    assert_eq!(decimal(&dashboard["revenue"]["pending"]), Decimal::ZERO);
    assert_eq!(dashboard["revenue"]["total_display"], "₹10,620.00");
    assert_eq!(dashboard["recent_bookings"][0]["guest_name"], "Asha Rao");
    assert!(dashboard["requests"]["requests"].as_u64().unwrap() >= 8);
    assert!(dashboard["requests"]["errors"].as_u64().unwrap() >= 1);

    // Checking out frees the room.
    call(
        &app,
        "POST",
        &format!("/v1/bookings/{booking_id}/transition"),
        Some(json!({"status": "checked_out"})),
    )
    .await;
    let occupancy = body_json(call(&app, "GET", "/v1/rooms/occupancy", None).await).await;
    assert_eq!(occupancy["available"], 1);
    assert_eq!(occupancy["occupancy_rate"], 0);
}

#[tokio::test]
async fn test_compliance_flags_reach_dashboard() {
    let app = test_app();
    for (name, expiry) in [
        ("Fire NOC", "2024-06-01"),
        ("Tourism licence", "2024-07-01"),
        ("GST certificate", "2026-01-01"),
    ] {
        let response = call(
            &app,
            "POST",
            "/v1/compliance",
            Some(json!({
                "document_type": "fire_safety",
                "document_name": name,
                "document_url": "https://docs.example.com/doc.pdf",
                "issuing_authority": "District Office",
                "issue_date": "2023-06-01",
                "expiry_date": expiry,
            })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let dashboard = body_json(call(&app, "GET", "/v1/dashboard", None).await).await;
    assert_eq!(dashboard["compliance"]["total"], 3);
    assert_eq!(dashboard["compliance"]["expired"], 1);
    assert_eq!(dashboard["compliance"]["pending_renewal"], 1);
    assert_eq!(dashboard["compliance"]["valid"], 1);
    assert_eq!(dashboard["compliance"]["needs_attention"], 2);
}

// -- Payments against a booking ----------------------------------------------

/// Creates a double room, a guest, and a three-night booking; returns the booking ID.
async fn book_three_nights(app: &axum::Router) -> String {
    let room = body_json(
        call(
            app,
            "POST",
            "/v1/rooms",
            Some(json!({
                "room_number": "201",
                "room_type": "double",
                "rate_per_night": "3000",
                "max_occupancy": 2,
            })),
        )
        .await,
    )
    .await;
    let guest = body_json(
        call(
            app,
            "POST",
            "/v1/guests",
            Some(json!({
                "first_name": "Ravi",
                "last_name": "Menon",
                "email": "ravi@example.com",
                "phone": "9876543210",
                "id_number": "P1234567",
                "address": "4 Beach Road",
                "city": "Kochi",
                "state": "Kerala",
                "id_type": "passport",
                "date_of_birth": "1985-09-30",
            })),
        )
        .await,
    )
    .await;
    let response = call(
        app,
        "POST",
        "/v1/bookings",
        Some(json!({
            "guest_id": guest["id"],
            "room_id": room["id"],
            "check_in": "2024-06-10",
            "check_out": "2024-06-13",
            "number_of_guests": 2,
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_str().unwrap().to_string()
}

async fn pay(app: &axum::Router, booking_id: &str, method: &str) -> axum::http::Response<Body> {
    call(
        app,
        "POST",
        "/v1/payments",
        Some(json!({"booking_id": booking_id, "method": method})),
    )
    .await
}

async fn move_payment(app: &axum::Router, payment_id: &str, status: &str) -> StatusCode {
    call(
        app,
        "POST",
        &format!("/v1/payments/{payment_id}/transition"),
        Some(json!({"status": status})),
    )
    .await
    .status()
}

#[tokio::test]
async fn test_booking_is_paid_once() {
    let app = test_app();
    let booking_id = book_three_nights(&app).await;

    let response = pay(&app, &booking_id, "upi").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let payment_id = body_json(response).await["id"].as_str().unwrap().to_string();

    // A second payment while the first is pending is refused.
    assert_eq!(pay(&app, &booking_id, "cash").await.status(), StatusCode::CONFLICT);

    assert_eq!(move_payment(&app, &payment_id, "completed").await, StatusCode::OK);
    assert_eq!(pay(&app, &booking_id, "cash").await.status(), StatusCode::CONFLICT);

    let summary = body_json(call(&app, "GET", "/v1/payments/summary", None).await).await;
    assert_eq!(summary["count"], 1);
    assert_eq!(summary["completed_count"], 1);
    assert_eq!(decimal(&summary["revenue"]), Decimal::from(10620));

    let dashboard = body_json(call(&app, "GET", "/v1/dashboard", None).await).await;
    assert_eq!(decimal(&dashboard["revenue"]["total"]), Decimal::from(10620));
}

#[tokio::test]
async fn test_failed_payment_makes_way_for_a_new_one() {
    let app = test_app();
    let booking_id = book_three_nights(&app).await;

    let first = body_json(pay(&app, &booking_id, "card").await).await;
    let first_id = first["id"].as_str().unwrap().to_string();
    assert_eq!(move_payment(&app, &first_id, "failed").await, StatusCode::OK);

    let response = pay(&app, &booking_id, "upi").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let second_id = body_json(response).await["id"].as_str().unwrap().to_string();
    assert_eq!(move_payment(&app, &second_id, "completed").await, StatusCode::OK);

    // The failed payment cannot be retried beside the completed one.
    assert_eq!(move_payment(&app, &first_id, "pending").await, StatusCode::CONFLICT);

    assert_eq!(move_payment(&app, &second_id, "refunded").await, StatusCode::OK);
    let uri = format!("/v1/bookings/{booking_id}");
    let booking = body_json(call(&app, "GET", &uri, None).await).await;
    assert_eq!(booking["payment_status"], "refunded");
}

#[tokio::test]
async fn test_cancelled_booking_payment_cannot_complete() {
    let app = test_app();
    let booking_id = book_three_nights(&app).await;

    let payment = body_json(pay(&app, &booking_id, "upi").await).await;
    let payment_id = payment["id"].as_str().unwrap().to_string();

    let response = call(
        &app,
        "POST",
        &format!("/v1/bookings/{booking_id}/transition"),
        Some(json!({"status": "cancelled", "reason": "guest called off"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(move_payment(&app, &payment_id, "completed").await, StatusCode::CONFLICT);

    let uri = format!("/v1/bookings/{booking_id}");
    let booking = body_json(call(&app, "GET", &uri, None).await).await;
    assert_eq!(booking["status"], "cancelled");
    assert_eq!(booking["payment_status"], "pending");

    let summary = body_json(call(&app, "GET", "/v1/payments/summary", None).await).await;
    assert_eq!(decimal(&summary["revenue"]), Decimal::ZERO);
}

// -- Analytics ---------------------------------------------------------------

#[tokio::test]
async fn test_analytics_reports_trend_and_room_mix() {
    let app = test_app();
    let booking_id = book_three_nights(&app).await;
    let payment = body_json(pay(&app, &booking_id, "upi").await).await;
    let payment_id = payment["id"].as_str().unwrap().to_string();
    assert_eq!(move_payment(&app, &payment_id, "completed").await, StatusCode::OK);

    let response = call(&app, "GET", "/v1/analytics?months=3", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let analytics = body_json(response).await;
    assert_eq!(analytics["as_of"], "2024-06-10");
    let months = analytics["revenue_by_month"].as_array().unwrap();
    assert_eq!(months.len(), 3);
    assert_eq!(months[0]["month"], "2024-04");
    assert_eq!(months[2]["month"], "2024-06");
    assert_eq!(decimal(&months[2]["revenue"]), Decimal::from(10620));
    assert_eq!(analytics["window_revenue_display"], "₹10,620.00");
    assert_eq!(analytics["total_bookings"], 1);

    let double = analytics["rooms_by_type"]
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["room_type"] == "double")
        .unwrap()
        .clone();
    assert_eq!(double["rooms"], 1);
}
