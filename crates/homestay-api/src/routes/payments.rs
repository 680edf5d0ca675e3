//! # Payments API
//!
//! Payments taken against bookings. The amount, tax, and total are copied
//! from the booking; an invoice number is generated on creation.
//! Completing a payment marks the booking paid, and refunding it marks the
//! booking refunded.
//!
//! A booking has at most one live payment, pending or completed. Failed and
//! refunded payments stay on record beside it. A failed payment can only be
//! retried while no other payment for the booking is live, and a payment for
//! a cancelled booking cannot be completed.

use std::collections::HashMap;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use homestay_calc::PaymentTotals;
use homestay_core::{
    format_inr, BookingPaymentStatus, BookingStatus, InvoiceNumber, PaymentMethod, PaymentStatus,
};
use homestay_state::{apply, Lifecycle};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::{newest_first, parse_filter, search_needle, ListResponse};
use crate::error::AppError;
use crate::extractors::{contains_ci, extract_validated_json, require_text_if_present, Validate};
use crate::state::{AppState, PaymentRecord};

/// Record a payment for a booking.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePaymentRequest {
    pub booking_id: Uuid,
    #[schema(value_type = String, example = "upi")]
    pub method: PaymentMethod,
    /// Gateway or UPI transaction reference.
    #[serde(default)]
    pub transaction_id: Option<String>,
}

impl Validate for CreatePaymentRequest {
    fn validate(&self) -> Result<(), String> {
        require_text_if_present("transaction_id", self.transaction_id.as_deref())
    }
}

/// Move a payment to a new status.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TransitionPaymentRequest {
    #[schema(value_type = String, example = "completed")]
    pub status: PaymentStatus,
    #[serde(default)]
    pub reason: Option<String>,
    /// Recorded on the payment if given, typically on completion.
    #[serde(default)]
    pub transaction_id: Option<String>,
}

impl Validate for TransitionPaymentRequest {
    fn validate(&self) -> Result<(), String> {
        require_text_if_present("reason", self.reason.as_deref())?;
        require_text_if_present("transaction_id", self.transaction_id.as_deref())
    }
}

/// Payment list filters. Also applied by the summary endpoint.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PaymentListParams {
    /// Substring of the invoice number or transaction ID.
    pub q: Option<String>,
    pub status: Option<String>,
    pub method: Option<String>,
}

/// Revenue and outstanding amounts over a set of payments.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaymentSummary {
    pub count: usize,
    /// Sum of completed payment totals.
    pub revenue: Decimal,
    /// Sum of pending payment totals.
    pub pending: Decimal,
    pub refunded: Decimal,
    pub completed_count: usize,
    pub pending_count: usize,
    pub failed_count: usize,
    pub refunded_count: usize,
    pub revenue_display: String,
    pub pending_display: String,
}

impl PaymentSummary {
    fn from_payments(payments: &[PaymentRecord]) -> Self {
        let totals = PaymentTotals::from_payments(payments.iter().map(|p| (p.status, p.total)));
        Self {
            count: payments.len(),
            revenue: totals.revenue,
            pending: totals.pending,
            refunded: totals.refunded,
            completed_count: totals.completed_count,
            pending_count: totals.pending_count,
            failed_count: totals.failed_count,
            refunded_count: totals.refunded_count,
            revenue_display: format_inr(totals.revenue),
            pending_display: format_inr(totals.pending),
        }
    }
}

/// Build the payments router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/payments", get(list_payments).post(create_payment))
        .route("/v1/payments/summary", get(payment_summary))
        .route("/v1/payments/:id", get(get_payment))
        .route("/v1/payments/:id/transition", post(transition_payment))
}

/// POST /v1/payments: Record a payment against a booking.
#[utoipa::path(
    post,
    path = "/v1/payments",
    request_body = CreatePaymentRequest,
    responses(
        (status = 201, description = "Payment recorded", body = PaymentRecord),
        (status = 409, description = "Booking paid, cancelled, or already holding a live payment", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "payments"
)]
async fn create_payment(
    State(state): State<AppState>,
    body: Result<Json<CreatePaymentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PaymentRecord>), AppError> {
    let req = extract_validated_json(body)?;
    let booking = state.bookings.get(&req.booking_id).ok_or_else(|| {
        AppError::Validation(format!("booking {} does not exist", req.booking_id))
    })?;
    if booking.status == BookingStatus::Cancelled {
        return Err(AppError::Conflict(format!(
            "booking {} is cancelled",
            booking.reference
        )));
    }
    if booking.payment_status == BookingPaymentStatus::Paid {
        return Err(AppError::Conflict(format!(
            "booking {} is already paid",
            booking.reference
        )));
    }

    let now = state.now();
    let record = PaymentRecord {
        id: Uuid::new_v4(),
        booking_id: booking.id,
        amount: booking.subtotal,
        tax: booking.tax,
        total: booking.total,
        method: req.method,
        status: PaymentStatus::initial(),
        transaction_id: req.transaction_id,
        invoice_number: InvoiceNumber::generate(now),
        transition_log: Vec::new(),
        created_at: now,
        updated_at: now,
    };

    state.payments.transact(|payments| {
        if let Some(live) = live_payment(payments, booking.id, None) {
            return Err(AppError::Conflict(format!(
                "booking {} already has a {} payment ({})",
                booking.reference, live.status, live.invoice_number
            )));
        }
        payments.insert(record.id, record.clone());
        Ok(())
    })?;
    state.persist(&record).await?;
    tracing::info!(
        payment_id = %record.id,
        booking_id = %record.booking_id,
        invoice = %record.invoice_number,
        total = %record.total,
        "payment recorded"
    );
    Ok((StatusCode::CREATED, Json(record)))
}

/// Pending and completed payments hold their booking.
fn is_live(status: PaymentStatus) -> bool {
    matches!(status, PaymentStatus::Pending | PaymentStatus::Completed)
}

/// The live payment for `booking_id`, ignoring `except`.
fn live_payment(
    payments: &HashMap<Uuid, PaymentRecord>,
    booking_id: Uuid,
    except: Option<Uuid>,
) -> Option<&PaymentRecord> {
    payments
        .values()
        .find(|p| p.booking_id == booking_id && Some(p.id) != except && is_live(p.status))
}

fn filtered_payments(
    state: &AppState,
    params: &PaymentListParams,
) -> Result<Vec<PaymentRecord>, AppError> {
    let status: Option<PaymentStatus> = parse_filter(params.status.as_deref())?;
    let method: Option<PaymentMethod> = parse_filter(params.method.as_deref())?;
    let needle = search_needle(params.q.as_deref());

    let mut payments: Vec<PaymentRecord> = state
        .payments
        .list()
        .into_iter()
        .filter(|p| status.map_or(true, |s| p.status == s))
        .filter(|p| method.map_or(true, |m| p.method == m))
        .filter(|p| {
            needle.as_deref().map_or(true, |n| {
                contains_ci(p.invoice_number.as_str(), n)
                    || p
                        .transaction_id
                        .as_deref()
                        .is_some_and(|t| contains_ci(t, n))
            })
        })
        .collect();
    newest_first(&mut payments, |p| p.created_at);
    Ok(payments)
}

/// GET /v1/payments: List payments, newest first.
#[utoipa::path(
    get,
    path = "/v1/payments",
    params(PaymentListParams),
    responses(
        (status = 200, description = "Payments", body = PaymentList),
        (status = 422, description = "Unknown filter value", body = crate::error::ErrorBody),
    ),
    tag = "payments"
)]
async fn list_payments(
    State(state): State<AppState>,
    Query(params): Query<PaymentListParams>,
) -> Result<Json<ListResponse<PaymentRecord>>, AppError> {
    Ok(Json(filtered_payments(&state, &params)?.into()))
}

/// GET /v1/payments/summary: Revenue and pending totals over the filtered payments.
#[utoipa::path(
    get,
    path = "/v1/payments/summary",
    params(PaymentListParams),
    responses(
        (status = 200, description = "Payment summary", body = PaymentSummary),
        (status = 422, description = "Unknown filter value", body = crate::error::ErrorBody),
    ),
    tag = "payments"
)]
async fn payment_summary(
    State(state): State<AppState>,
    Query(params): Query<PaymentListParams>,
) -> Result<Json<PaymentSummary>, AppError> {
    let payments = filtered_payments(&state, &params)?;
    Ok(Json(PaymentSummary::from_payments(&payments)))
}

/// GET /v1/payments/:id: Get a payment.
#[utoipa::path(
    get,
    path = "/v1/payments/{id}",
    params(("id" = Uuid, Path, description = "Payment ID")),
    responses(
        (status = 200, description = "Payment found", body = PaymentRecord),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "payments"
)]
async fn get_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PaymentRecord>, AppError> {
    state
        .payments
        .get(&id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("payment {id} not found")))
}

/// POST /v1/payments/:id/transition: Complete, fail, retry, or refund a payment.
#[utoipa::path(
    post,
    path = "/v1/payments/{id}/transition",
    params(("id" = Uuid, Path, description = "Payment ID")),
    request_body = TransitionPaymentRequest,
    responses(
        (status = 200, description = "Payment transitioned", body = PaymentRecord),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 409, description = "Transition not allowed", body = crate::error::ErrorBody),
    ),
    tag = "payments"
)]
async fn transition_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Result<Json<TransitionPaymentRequest>, JsonRejection>,
) -> Result<Json<PaymentRecord>, AppError> {
    let req = extract_validated_json(body)?;
    let now = state.now();
    let to = req.status;

    let updated = state.payments.transact(|payments| -> Result<PaymentRecord, AppError> {
        let booking_id = payments
            .get(&id)
            .map(|p| p.booking_id)
            .ok_or_else(|| AppError::NotFound(format!("payment {id} not found")))?;

        if is_live(to) {
            if let Some(live) = live_payment(payments, booking_id, Some(id)) {
                return Err(AppError::Conflict(format!(
                    "booking {booking_id} already has a {} payment ({})",
                    live.status, live.invoice_number
                )));
            }
        }
        if to == PaymentStatus::Completed {
            if let Some(booking) = state.bookings.get(&booking_id) {
                if booking.status == BookingStatus::Cancelled {
                    return Err(AppError::Conflict(format!(
                        "booking {} is cancelled",
                        booking.reference
                    )));
                }
                if booking.payment_status == BookingPaymentStatus::Paid {
                    return Err(AppError::Conflict(format!(
                        "booking {} is already paid",
                        booking.reference
                    )));
                }
            }
        }

        let payment = payments
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("payment {id} not found")))?;
        apply(
            &mut payment.status,
            &mut payment.transition_log,
            to,
            now,
            req.reason,
        )?;
        if let Some(transaction_id) = req.transaction_id {
            payment.transaction_id = Some(transaction_id);
        }
        payment.updated_at = now;
        Ok(payment.clone())
    })?;
    state.persist(&updated).await?;

    let booking_payment_status = match to {
        PaymentStatus::Completed => Some(BookingPaymentStatus::Paid),
        PaymentStatus::Refunded => Some(BookingPaymentStatus::Refunded),
        _ => None,
    };
    if let Some(payment_status) = booking_payment_status {
        let booking = state.bookings.update(&updated.booking_id, |b| {
            b.payment_status = payment_status;
            b.updated_at = now;
        });
        match booking {
            Some(booking) => state.persist(&booking).await?,
            None => tracing::warn!(
                payment_id = %id,
                booking_id = %updated.booking_id,
                "payment references a missing booking"
            ),
        }
    }

    tracing::info!(payment_id = %id, status = %updated.status, "payment transitioned");
    Ok(Json(updated))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::BookingRecord;
    use axum::body::Body;
    use axum::http::Request;
    use chrono::NaiveDate;
    use homestay_core::BookingReference;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn seed_booking(state: &AppState, total: &str) -> Uuid {
        let now = state.now();
        let total = dec(total);
        let subtotal = total / dec("1.18");
        let booking = BookingRecord {
            id: Uuid::new_v4(),
            reference: BookingReference::generate(now),
            guest_id: Uuid::new_v4(),
            room_id: Uuid::new_v4(),
            check_in: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            check_out: NaiveDate::from_ymd_opt(2024, 1, 18).unwrap(),
            nights: 3,
            number_of_guests: 2,
            rate_per_night: subtotal / Decimal::from(3),
            tax_rate_percent: Decimal::from(18),
            subtotal,
            tax: total - subtotal,
            total,
            status: BookingStatus::Confirmed,
            payment_status: BookingPaymentStatus::Pending,
            special_requests: None,
            transition_log: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        state.bookings.insert(booking.id, booking.clone());
        booking.id
    }

    async fn body_json<T: serde::de::DeserializeOwned>(resp: axum::response::Response) -> T {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn send(
        state: &AppState,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> axum::response::Response {
        let app = router().with_state(state.clone());
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        let body = body.map_or_else(Body::empty, |b| Body::from(b.to_string()));
        app.oneshot(builder.body(body).unwrap()).await.unwrap()
    }

    async fn create(state: &AppState, booking: Uuid, method: &str) -> PaymentRecord {
        let resp = send(
            state,
            "POST",
            "/v1/payments",
            Some(serde_json::json!({"booking_id": booking, "method": method})),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        body_json(resp).await
    }

    async fn transition(state: &AppState, payment: Uuid, status: &str) -> axum::response::Response {
        send(
            state,
            "POST",
            &format!("/v1/payments/{payment}/transition"),
            Some(serde_json::json!({"status": status})),
        )
        .await
    }

    #[tokio::test]
    async fn payment_copies_booking_amounts() {
        let state = AppState::new();
        let booking = seed_booking(&state, "10620");
        let payment = create(&state, booking, "upi").await;
        assert_eq!(payment.total, dec("10620"));
        assert_eq!(payment.amount + payment.tax, payment.total);
        assert_eq!(payment.status, PaymentStatus::Pending);
        assert!(payment.invoice_number.as_str().starts_with("INV"));
    }

    #[tokio::test]
    async fn completion_and_refund_update_the_booking() {
        let state = AppState::new();
        let booking = seed_booking(&state, "10620");
        let payment = create(&state, booking, "card").await;

        let resp = transition(&state, payment.id, "completed").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            state.bookings.get(&booking).unwrap().payment_status,
            BookingPaymentStatus::Paid
        );

        let resp = transition(&state, payment.id, "refunded").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            state.bookings.get(&booking).unwrap().payment_status,
            BookingPaymentStatus::Refunded
        );

        let resp = transition(&state, payment.id, "pending").await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn paid_booking_rejects_second_payment() {
        let state = AppState::new();
        let booking = seed_booking(&state, "3540");
        let payment = create(&state, booking, "cash").await;
        transition(&state, payment.id, "completed").await;

        let resp = send(
            &state,
            "POST",
            "/v1/payments",
            Some(serde_json::json!({"booking_id": booking, "method": "cash"})),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn failed_payment_can_be_retried() {
        let state = AppState::new();
        let booking = seed_booking(&state, "3540");
        let payment = create(&state, booking, "razorpay").await;
        assert_eq!(transition(&state, payment.id, "failed").await.status(), StatusCode::OK);
        assert_eq!(transition(&state, payment.id, "pending").await.status(), StatusCode::OK);
        let resp = transition(&state, payment.id, "completed").await;
        let payment: PaymentRecord = body_json(resp).await;
        assert_eq!(payment.transition_log.len(), 3);
    }

    #[tokio::test]
    async fn unknown_booking_is_422() {
        let state = AppState::new();
        let resp = send(
            &state,
            "POST",
            "/v1/payments",
            Some(serde_json::json!({"booking_id": Uuid::new_v4(), "method": "upi"})),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn summary_sums_completed_and_pending() {
        let state = AppState::new();
        let done = create(&state, seed_booking(&state, "10620"), "upi").await;
        transition(&state, done.id, "completed").await;
        create(&state, seed_booking(&state, "3540"), "cash").await;
        let failed = create(&state, seed_booking(&state, "1000"), "card").await;
        transition(&state, failed.id, "failed").await;

        let resp = send(&state, "GET", "/v1/payments/summary", None).await;
        let summary: PaymentSummary = body_json(resp).await;
        assert_eq!(summary.count, 3);
        assert_eq!(summary.revenue, dec("10620"));
        assert_eq!(summary.pending, dec("3540"));
        assert_eq!(summary.failed_count, 1);
        assert_eq!(summary.revenue_display, "₹10,620.00");

        let resp = send(&state, "GET", "/v1/payments/summary?method=cash", None).await;
        let summary: PaymentSummary = body_json(resp).await;
        assert_eq!(summary.count, 1);
        assert_eq!(summary.revenue, Decimal::ZERO);
        assert_eq!(summary.pending, dec("3540"));
    }

    #[tokio::test]
    async fn list_searches_invoice_and_transaction() {
        let state = AppState::new();
        let booking = seed_booking(&state, "3540");
        let resp = send(
            &state,
            "POST",
            "/v1/payments",
            Some(serde_json::json!({
                "booking_id": booking,
                "method": "upi",
                "transaction_id": "UPI-77AB12",
            })),
        )
        .await;
        let payment: PaymentRecord = body_json(resp).await;

        let resp = send(&state, "GET", "/v1/payments?q=77ab", None).await;
        let list: serde_json::Value = body_json(resp).await;
        assert_eq!(list["count"], 1);

        let uri = format!("/v1/payments?q={}", payment.invoice_number);
        let resp = send(&state, "GET", &uri, None).await;
        let list: serde_json::Value = body_json(resp).await;
        assert_eq!(list["count"], 1);

        let resp = send(&state, "GET", "/v1/payments?method=bitcoin", None).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn second_live_payment_is_conflict() {
        let state = AppState::new();
        let booking = seed_booking(&state, "10620");
        create(&state, booking, "upi").await;

        let resp = send(
            &state,
            "POST",
            "/v1/payments",
            Some(serde_json::json!({"booking_id": booking, "method": "cash"})),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        assert_eq!(state.payments.len(), 1);
    }

    #[tokio::test]
    async fn failed_payment_cannot_be_revived_beside_a_live_one() {
        let state = AppState::new();
        let booking = seed_booking(&state, "10620");
        let first = create(&state, booking, "card").await;
        assert_eq!(transition(&state, first.id, "failed").await.status(), StatusCode::OK);

        let second = create(&state, booking, "upi").await;
        assert_eq!(transition(&state, second.id, "completed").await.status(), StatusCode::OK);
        assert_eq!(
            transition(&state, first.id, "pending").await.status(),
            StatusCode::CONFLICT
        );

        let resp = send(&state, "GET", "/v1/payments/summary", None).await;
        let summary: PaymentSummary = body_json(resp).await;
        assert_eq!(summary.revenue, dec("10620"));
        assert_eq!(summary.completed_count, 1);
    }

    #[tokio::test]
    async fn booking_follows_its_single_settled_payment() {
        let state = AppState::new();
        let booking = seed_booking(&state, "3540");
        let failed = create(&state, booking, "card").await;
        transition(&state, failed.id, "failed").await;
        let settled = create(&state, booking, "cash").await;
        transition(&state, settled.id, "completed").await;
        assert_eq!(
            state.bookings.get(&booking).unwrap().payment_status,
            BookingPaymentStatus::Paid
        );

        assert_eq!(transition(&state, settled.id, "refunded").await.status(), StatusCode::OK);
        assert_eq!(
            state.bookings.get(&booking).unwrap().payment_status,
            BookingPaymentStatus::Refunded
        );
        let live = state
            .payments
            .list()
            .into_iter()
            .filter(|p| p.booking_id == booking && is_live(p.status))
            .count();
        assert_eq!(live, 0);
    }

    #[tokio::test]
    async fn payment_for_cancelled_booking_cannot_complete() {
        let state = AppState::new();
        let booking = seed_booking(&state, "10620");
        let payment = create(&state, booking, "upi").await;
        state
            .bookings
            .update(&booking, |b| b.status = BookingStatus::Cancelled);

        let resp = transition(&state, payment.id, "completed").await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        assert_eq!(state.payments.get(&payment.id).unwrap().status, PaymentStatus::Pending);
        assert_eq!(
            state.bookings.get(&booking).unwrap().payment_status,
            BookingPaymentStatus::Pending
        );

        assert_eq!(transition(&state, payment.id, "failed").await.status(), StatusCode::OK);
    }
}
