//! # Bookings API
//!
//! Quotes, reservations, and the booking lifecycle.
//!
//! Amounts are never accepted from the client: the nightly rate comes from
//! the room, the tax rate from configuration, and subtotal, tax, and total
//! are computed by `homestay_calc::quote_stay`. A booking is rejected when
//! the party exceeds the room's capacity (422), when the room is under
//! maintenance (409), or when it overlaps another active booking of the
//! same room (409). The overlap check and the insert happen under one
//! write lock of the bookings store.
//!
//! Lifecycle side effects on the room:
//!
//! | Transition             | Room status |
//! |------------------------|-------------|
//! | confirmed → checked_in | occupied    |
//! | checked_in → checked_out | available, unless under maintenance |

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use homestay_calc::{check_capacity, quote_stay, StayQuote};
use homestay_core::{
    format_inr, BookingPaymentStatus, BookingReference, BookingStatus, RoomStatus,
};
use homestay_state::{apply, Lifecycle};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::{newest_first, parse_filter, search_needle, ListResponse};
use crate::error::AppError;
use crate::extractors::{
    check_len, contains_ci, extract_validated_json, require_text_if_present, Validate,
};
use crate::state::{AppState, BookingRecord, RoomRecord};

/// Price a prospective stay.
///
/// Either `room_id` (the room's rate is used) or `rate_per_night` must be
/// given. `tax_rate_percent` defaults to the configured GST rate.
#[derive(Debug, Deserialize, ToSchema)]
pub struct QuoteRequest {
    pub room_id: Option<Uuid>,
    pub rate_per_night: Option<Decimal>,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub tax_rate_percent: Option<Decimal>,
    /// Checked against the room's capacity when `room_id` is given.
    pub number_of_guests: Option<u32>,
}

impl Validate for QuoteRequest {
    fn validate(&self) -> Result<(), String> {
        if self.room_id.is_none() && self.rate_per_night.is_none() {
            return Err("either room_id or rate_per_night is required".to_string());
        }
        Ok(())
    }
}

/// A priced stay, with the total formatted for display.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct QuoteResponse {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub nights: u32,
    pub rate_per_night: Decimal,
    pub tax_rate_percent: Decimal,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    /// Total in rupees with Indian digit grouping, e.g. "₹10,620.00".
    pub total_display: String,
}

impl From<StayQuote> for QuoteResponse {
    fn from(quote: StayQuote) -> Self {
        Self {
            check_in: quote.check_in,
            check_out: quote.check_out,
            nights: quote.nights,
            rate_per_night: quote.rate_per_night,
            tax_rate_percent: quote.tax_rate_percent,
            subtotal: quote.cost.subtotal,
            tax: quote.cost.tax,
            total: quote.cost.total,
            total_display: format_inr(quote.cost.total),
        }
    }
}

fn one() -> u32 {
    1
}

/// Reserve a room for a guest.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBookingRequest {
    pub guest_id: Uuid,
    pub room_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    #[serde(default = "one")]
    pub number_of_guests: u32,
    #[serde(default)]
    pub special_requests: Option<String>,
}

impl Validate for CreateBookingRequest {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref requests) = self.special_requests {
            check_len("special_requests", requests)?;
        }
        Ok(())
    }
}

/// Move a booking to a new status.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TransitionBookingRequest {
    #[schema(value_type = String, example = "checked_in")]
    pub status: BookingStatus,
    #[serde(default)]
    pub reason: Option<String>,
}

impl Validate for TransitionBookingRequest {
    fn validate(&self) -> Result<(), String> {
        require_text_if_present("reason", self.reason.as_deref())
    }
}

/// A booking with its guest's name and room number resolved.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BookingView {
    #[serde(flatten)]
    pub booking: BookingRecord,
    /// `None` if the guest record is missing.
    pub guest_name: Option<String>,
    /// `None` if the room record is missing.
    pub room_number: Option<String>,
}

/// Booking list filters.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct BookingListParams {
    /// Substring of the reference, guest name, or room number.
    pub q: Option<String>,
    pub status: Option<String>,
    pub payment_status: Option<String>,
}

/// Build the bookings router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/bookings", get(list_bookings).post(create_booking))
        .route("/v1/bookings/quote", post(quote))
        .route("/v1/bookings/:id", get(get_booking))
        .route("/v1/bookings/:id/transition", post(transition_booking))
}

/// Resolve the guest name and room number for display.
pub(crate) fn to_view(state: &AppState, booking: BookingRecord) -> BookingView {
    let guest_name = state.guests.get(&booking.guest_id).map(|g| g.full_name());
    let room_number = state.rooms.get(&booking.room_id).map(|r| r.room_number);
    BookingView {
        booking,
        guest_name,
        room_number,
    }
}

fn existing_room(state: &AppState, room_id: Uuid) -> Result<RoomRecord, AppError> {
    state
        .rooms
        .get(&room_id)
        .ok_or_else(|| AppError::Validation(format!("room {room_id} does not exist")))
}

/// POST /v1/bookings/quote: Price a stay without reserving it.
#[utoipa::path(
    post,
    path = "/v1/bookings/quote",
    request_body = QuoteRequest,
    responses(
        (status = 200, description = "Stay priced", body = QuoteResponse),
        (status = 422, description = "Invalid dates, rate, or party size", body = crate::error::ErrorBody),
    ),
    tag = "bookings"
)]
async fn quote(
    State(state): State<AppState>,
    body: Result<Json<QuoteRequest>, JsonRejection>,
) -> Result<Json<QuoteResponse>, AppError> {
    let req = extract_validated_json(body)?;

    let rate = match req.room_id {
        Some(room_id) => {
            let room = existing_room(&state, room_id)?;
            if let Some(guests) = req.number_of_guests {
                check_capacity(guests, room.max_occupancy)?;
            }
            room.rate_per_night
        }
        None => req
            .rate_per_night
            .ok_or_else(|| AppError::Validation("rate_per_night is required".to_string()))?,
    };
    let tax_rate = req
        .tax_rate_percent
        .unwrap_or(state.config.gst_rate_percent);

    let quote = quote_stay(rate, req.check_in, req.check_out, tax_rate)?;
    Ok(Json(quote.into()))
}

/// POST /v1/bookings: Reserve a room.
#[utoipa::path(
    post,
    path = "/v1/bookings",
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Booking confirmed", body = BookingRecord),
        (status = 409, description = "Room unavailable for these dates", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "bookings"
)]
async fn create_booking(
    State(state): State<AppState>,
    body: Result<Json<CreateBookingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<BookingRecord>), AppError> {
    let req = extract_validated_json(body)?;

    if !state.guests.contains(&req.guest_id) {
        return Err(AppError::Validation(format!(
            "guest {} does not exist",
            req.guest_id
        )));
    }
    let room = existing_room(&state, req.room_id)?;
    if !room.status.accepts_bookings() {
        return Err(AppError::Conflict(format!(
            "room {} is under maintenance",
            room.room_number
        )));
    }
    check_capacity(req.number_of_guests, room.max_occupancy)?;

    let tax_rate = state.config.gst_rate_percent;
    let quote = quote_stay(room.rate_per_night, req.check_in, req.check_out, tax_rate)?;

    let now = state.now();
    let record = BookingRecord {
        id: Uuid::new_v4(),
        reference: BookingReference::generate(now),
        guest_id: req.guest_id,
        room_id: req.room_id,
        check_in: quote.check_in,
        check_out: quote.check_out,
        nights: quote.nights,
        number_of_guests: req.number_of_guests,
        rate_per_night: quote.rate_per_night,
        tax_rate_percent: quote.tax_rate_percent,
        subtotal: quote.cost.subtotal,
        tax: quote.cost.tax,
        total: quote.cost.total,
        status: BookingStatus::initial(),
        payment_status: BookingPaymentStatus::Pending,
        special_requests: req.special_requests,
        transition_log: Vec::new(),
        created_at: now,
        updated_at: now,
    };

    state.bookings.transact(|bookings| {
        if let Some(clash) = bookings
            .values()
            .find(|b| b.overlaps(record.room_id, record.check_in, record.check_out))
        {
            return Err(AppError::Conflict(format!(
                "room {} is already booked from {} to {} ({})",
                room.room_number, clash.check_in, clash.check_out, clash.reference
            )));
        }
        bookings.insert(record.id, record.clone());
        Ok(())
    })?;

    state.persist(&record).await?;
    tracing::info!(
        booking_id = %record.id,
        reference = %record.reference,
        room_id = %record.room_id,
        nights = record.nights,
        total = %record.total,
        "booking confirmed"
    );
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /v1/bookings: List bookings, newest first.
#[utoipa::path(
    get,
    path = "/v1/bookings",
    params(BookingListParams),
    responses(
        (status = 200, description = "Bookings", body = BookingList),
        (status = 422, description = "Unknown filter value", body = crate::error::ErrorBody),
    ),
    tag = "bookings"
)]
async fn list_bookings(
    State(state): State<AppState>,
    Query(params): Query<BookingListParams>,
) -> Result<Json<ListResponse<BookingView>>, AppError> {
    let status: Option<BookingStatus> = parse_filter(params.status.as_deref())?;
    let payment_status: Option<BookingPaymentStatus> =
        parse_filter(params.payment_status.as_deref())?;
    let needle = search_needle(params.q.as_deref());

    let mut views: Vec<BookingView> = state
        .bookings
        .list()
        .into_iter()
        .filter(|b| status.map_or(true, |s| b.status == s))
        .filter(|b| payment_status.map_or(true, |s| b.payment_status == s))
        .map(|b| to_view(&state, b))
        .filter(|v| needle.as_deref().map_or(true, |n| view_matches(v, n)))
        .collect();
    newest_first(&mut views, |v| v.booking.created_at);

    Ok(Json(views.into()))
}

fn view_matches(view: &BookingView, needle: &str) -> bool {
    contains_ci(view.booking.reference.as_str(), needle)
        || view
            .guest_name
            .as_deref()
            .is_some_and(|name| contains_ci(name, needle))
        || view
            .room_number
            .as_deref()
            .is_some_and(|number| contains_ci(number, needle))
}

/// GET /v1/bookings/:id: Get a booking.
#[utoipa::path(
    get,
    path = "/v1/bookings/{id}",
    params(("id" = Uuid, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking found", body = BookingView),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "bookings"
)]
async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BookingView>, AppError> {
    let booking = state
        .bookings
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("booking {id} not found")))?;
    Ok(Json(to_view(&state, booking)))
}

/// POST /v1/bookings/:id/transition: Check in, check out, or cancel.
#[utoipa::path(
    post,
    path = "/v1/bookings/{id}/transition",
    params(("id" = Uuid, Path, description = "Booking ID")),
    request_body = TransitionBookingRequest,
    responses(
        (status = 200, description = "Booking transitioned", body = BookingRecord),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 409, description = "Transition not allowed", body = crate::error::ErrorBody),
    ),
    tag = "bookings"
)]
async fn transition_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Result<Json<TransitionBookingRequest>, JsonRejection>,
) -> Result<Json<BookingRecord>, AppError> {
    let req = extract_validated_json(body)?;
    let now = state.now();
    let to = req.status;

    let updated = state
        .bookings
        .try_update(&id, |b| {
            apply(&mut b.status, &mut b.transition_log, to, now, req.reason)?;
            b.updated_at = now;
            Ok::<_, AppError>(b.clone())
        })
        .ok_or_else(|| AppError::NotFound(format!("booking {id} not found")))??;
    state.persist(&updated).await?;

    let room_status = match to {
        BookingStatus::CheckedIn => Some(RoomStatus::Occupied),
        BookingStatus::CheckedOut => Some(RoomStatus::Available),
        _ => None,
    };
    if let Some(room_status) = room_status {
        let room = state.rooms.update(&updated.room_id, |room| {
            if room.status != RoomStatus::Maintenance {
                room.status = room_status;
                room.updated_at = now;
            }
        });
        match room {
            Some(room) => state.persist(&room).await?,
            None => tracing::warn!(
                booking_id = %id,
                room_id = %updated.room_id,
                "booking references a missing room"
            ),
        }
    }

    tracing::info!(booking_id = %id, status = %updated.status, "booking transitioned");
    Ok(Json(updated))
}
