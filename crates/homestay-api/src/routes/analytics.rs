//! # Analytics API
//!
//! Trends for the analytics page: completed revenue per calendar month over
//! a trailing window ending with the current month, and the room inventory
//! per room type. Months are bucketed by completion date, the same date the
//! dashboard uses for its today and this-month figures.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{Datelike, NaiveDate};
use homestay_calc::{occupancy_rate, sum_where};
use homestay_core::{format_inr, RoomStatus, RoomType};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::dashboard::completion_date;
use crate::error::AppError;
use crate::state::{AppState, PaymentRecord, RoomRecord};

const DEFAULT_MONTHS: u32 = 6;
const MAX_MONTHS: u32 = 24;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct AnalyticsParams {
    /// Months in the revenue trend, ending with the current month (1 to 24, default 6).
    pub months: Option<u32>,
}

/// Completed revenue for one calendar month.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MonthlyRevenue {
    /// `YYYY-MM`.
    #[schema(example = "2024-06")]
    pub month: String,
    pub revenue: Decimal,
    /// Completed payments in the month.
    pub payments: usize,
    pub revenue_display: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RoomTypeCount {
    #[schema(value_type = String, example = "deluxe")]
    pub room_type: RoomType,
    pub rooms: usize,
    pub occupied: usize,
    /// Whole percent of this type's rooms that are occupied.
    pub occupancy_rate: u8,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AnalyticsResponse {
    pub as_of: NaiveDate,
    /// Oldest month first.
    pub revenue_by_month: Vec<MonthlyRevenue>,
    /// Sum over `revenue_by_month`.
    pub window_revenue: Decimal,
    pub window_revenue_display: String,
    /// Every room type, in vocabulary order, including types with no rooms.
    pub rooms_by_type: Vec<RoomTypeCount>,
    pub total_bookings: usize,
}

/// Build the analytics router.
pub fn router() -> Router<AppState> {
    Router::new().route("/v1/analytics", get(analytics))
}

/// GET /v1/analytics: Monthly revenue trend and rooms per type.
#[utoipa::path(
    get,
    path = "/v1/analytics",
    params(AnalyticsParams),
    responses(
        (status = 200, description = "Analytics figures", body = AnalyticsResponse),
        (status = 422, description = "Month window out of range", body = crate::error::ErrorBody),
    ),
    tag = "analytics"
)]
async fn analytics(
    State(state): State<AppState>,
    Query(params): Query<AnalyticsParams>,
) -> Result<Json<AnalyticsResponse>, AppError> {
    let months = params.months.unwrap_or(DEFAULT_MONTHS);
    if !(1..=MAX_MONTHS).contains(&months) {
        return Err(AppError::Validation(format!(
            "months must be between 1 and {MAX_MONTHS}, got {months}"
        )));
    }

    let today = state.today();
    let revenue_by_month = monthly_revenue(&state.payments.list(), today, months);
    let window_revenue = sum_where(&revenue_by_month, |_| true, |m| m.revenue);

    Ok(Json(AnalyticsResponse {
        as_of: today,
        revenue_by_month,
        window_revenue,
        window_revenue_display: format_inr(window_revenue),
        rooms_by_type: rooms_by_type(&state.rooms.list()),
        total_bookings: state.bookings.len(),
    }))
}

/// `(year, month)` for the `count` months ending with `today`'s, oldest first.
fn trailing_months(today: NaiveDate, count: u32) -> Vec<(i32, u32)> {
    let current = today.year() * 12 + today.month0() as i32;
    (0..count as i32)
        .rev()
        .map(|back| {
            let index = current - back;
            (index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
        })
        .collect()
}

fn monthly_revenue(
    payments: &[PaymentRecord],
    today: NaiveDate,
    count: u32,
) -> Vec<MonthlyRevenue> {
    trailing_months(today, count)
        .into_iter()
        .map(|(year, month)| {
            let in_month = |p: &PaymentRecord| {
                completion_date(p).is_some_and(|d| d.year() == year && d.month() == month)
            };
            let revenue = sum_where(payments, &in_month, |p| p.total);
            MonthlyRevenue {
                month: format!("{year:04}-{month:02}"),
                revenue,
                payments: payments.iter().filter(|p| in_month(*p)).count(),
                revenue_display: format_inr(revenue),
            }
        })
        .collect()
}

fn rooms_by_type(rooms: &[RoomRecord]) -> Vec<RoomTypeCount> {
    RoomType::all()
        .iter()
        .map(|&room_type| {
            let of_type = rooms.iter().filter(|r| r.room_type == room_type);
            RoomTypeCount {
                room_type,
                rooms: of_type.clone().count(),
                occupied: of_type
                    .clone()
                    .filter(|r| r.status == RoomStatus::Occupied)
                    .count(),
                occupancy_rate: occupancy_rate(of_type.map(|r| r.status)),
            }
        })
        .collect()
}
