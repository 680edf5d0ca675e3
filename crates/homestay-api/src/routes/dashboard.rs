//! # Dashboard API
//!
//! Cross-collection figures for the landing page. Everything is computed
//! from the current record set on each request; nothing is cached.

use axum::extract::State;
use axum::routing::get;
use axum::{Extension, Json, Router};
use chrono::{Datelike, NaiveDate};
use homestay_calc::{sum_where, ComplianceTally, PaymentTotals};
use homestay_core::{format_inr, MaintenanceStatus, PaymentStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::bookings::{to_view, BookingView};
use super::compliance::{evaluated_documents, ComplianceListParams, ComplianceSummary};
use super::newest_first;
use super::rooms::{occupancy_breakdown, OccupancyResponse};
use crate::error::AppError;
use crate::middleware::metrics::ApiMetrics;
use crate::state::{AppState, PaymentRecord};

const RECENT_BOOKINGS: usize = 5;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BookingCounts {
    pub total: usize,
    /// Confirmed or checked in.
    pub active: usize,
}

/// Completed-payment revenue over three windows, by completion date.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RevenueFigures {
    pub total: Decimal,
    pub today: Decimal,
    pub this_month: Decimal,
    pub pending: Decimal,
    pub total_display: String,
    pub today_display: String,
    pub this_month_display: String,
    pub pending_display: String,
}

impl RevenueFigures {
    fn from_payments(payments: &[PaymentRecord], today: NaiveDate) -> Self {
        let totals = PaymentTotals::from_payments(payments.iter().map(|p| (p.status, p.total)));
        let today_total = sum_where(
            payments,
            |p| completion_date(p) == Some(today),
            |p| p.total,
        );
        let month_total = sum_where(
            payments,
            |p| {
                completion_date(p)
                    .is_some_and(|d| d.year() == today.year() && d.month() == today.month())
            },
            |p| p.total,
        );
        Self {
            total: totals.revenue,
            today: today_total,
            this_month: month_total,
            pending: totals.pending,
            total_display: format_inr(totals.revenue),
            today_display: format_inr(today_total),
            this_month_display: format_inr(month_total),
            pending_display: format_inr(totals.pending),
        }
    }
}

/// A completed payment's last transition is its completion.
pub(crate) fn completion_date(payment: &PaymentRecord) -> Option<NaiveDate> {
    (payment.status == PaymentStatus::Completed).then(|| payment.updated_at.date_naive())
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MaintenanceCounts {
    /// Pending or in progress.
    pub open: usize,
    pub completed: usize,
}

/// Request counters since the process started.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RequestCounts {
    pub requests: u64,
    pub errors: u64,
}

/// Everything shown on the landing page.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DashboardResponse {
    pub as_of: NaiveDate,
    pub occupancy: OccupancyResponse,
    pub bookings: BookingCounts,
    pub guests: usize,
    pub revenue: RevenueFigures,
    pub compliance: ComplianceSummary,
    pub maintenance: MaintenanceCounts,
    pub recent_bookings: Vec<BookingView>,
    /// Absent when the metrics layer is not installed.
    pub requests: Option<RequestCounts>,
}

/// Build the dashboard router.
pub fn router() -> Router<AppState> {
    Router::new().route("/v1/dashboard", get(dashboard))
}

/// GET /v1/dashboard: Landing-page figures as of today.
#[utoipa::path(
    get,
    path = "/v1/dashboard",
    responses(
        (status = 200, description = "Dashboard figures", body = DashboardResponse),
    ),
    tag = "dashboard"
)]
async fn dashboard(
    State(state): State<AppState>,
    metrics: Option<Extension<ApiMetrics>>,
) -> Result<Json<DashboardResponse>, AppError> {
    let today = state.today();

    let mut bookings = state.bookings.list();
    let active = bookings.iter().filter(|b| b.status.holds_room()).count();
    let booking_counts = BookingCounts {
        total: bookings.len(),
        active,
    };
    newest_first(&mut bookings, |b| b.created_at);
    let recent_bookings = bookings
        .into_iter()
        .take(RECENT_BOOKINGS)
        .map(|b| to_view(&state, b))
        .collect();

    let documents = evaluated_documents(&state, &ComplianceListParams::default(), today)?;
    let tally = ComplianceTally::from_statuses(documents.iter().map(|d| d.status));

    let tickets = state.maintenance.list();
    let completed = tickets
        .iter()
        .filter(|t| t.status == MaintenanceStatus::Completed)
        .count();

    Ok(Json(DashboardResponse {
        as_of: today,
        occupancy: occupancy_breakdown(&state).into(),
        bookings: booking_counts,
        guests: state.guests.len(),
        revenue: RevenueFigures::from_payments(&state.payments.list(), today),
        compliance: ComplianceSummary::from_tally(tally, today),
        maintenance: MaintenanceCounts {
            open: tickets.len() - completed,
            completed,
        },
        recent_bookings,
        requests: metrics.map(|Extension(m)| RequestCounts {
            requests: m.requests(),
            errors: m.errors(),
        }),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::{TimeZone, Utc};
    use homestay_core::{InvoiceNumber, PaymentMethod};
    use http_body_util::BodyExt;
    use tower::ServiceExt;
    use uuid::Uuid;

    fn payment(status: PaymentStatus, total: &str, completed: (i32, u32, u32)) -> PaymentRecord {
        let at = Utc
            .with_ymd_and_hms(completed.0, completed.1, completed.2, 10, 0, 0)
            .unwrap();
        PaymentRecord {
            id: Uuid::new_v4(),
            booking_id: Uuid::new_v4(),
            amount: Decimal::ZERO,
            tax: Decimal::ZERO,
            total: total.parse().unwrap(),
            method: PaymentMethod::Upi,
            status,
            transaction_id: None,
            invoice_number: InvoiceNumber::generate(at),
            transition_log: Vec::new(),
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn revenue_windows_use_completion_date() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let payments = vec![
            payment(PaymentStatus::Completed, "1000", (2024, 6, 15)),
            payment(PaymentStatus::Completed, "2000", (2024, 6, 2)),
            payment(PaymentStatus::Completed, "4000", (2024, 5, 31)),
            payment(PaymentStatus::Pending, "500", (2024, 6, 15)),
            payment(PaymentStatus::Refunded, "800", (2024, 6, 15)),
        ];
        let revenue = RevenueFigures::from_payments(&payments, today);
        assert_eq!(revenue.today, Decimal::from(1000));
        assert_eq!(revenue.this_month, Decimal::from(3000));
        assert_eq!(revenue.total, Decimal::from(7000));
        assert_eq!(revenue.pending, Decimal::from(500));
        assert_eq!(revenue.total_display, "₹7,000.00");
    }

    #[test]
    fn month_window_ignores_other_years() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let payments = vec![payment(PaymentStatus::Completed, "900", (2023, 6, 15))];
        let revenue = RevenueFigures::from_payments(&payments, today);
        assert_eq!(revenue.this_month, Decimal::ZERO);
        assert_eq!(revenue.total, Decimal::from(900));
    }

    #[tokio::test]
    async fn empty_dashboard_reports_zeroes() {
        let app = router().with_state(AppState::new());
        let resp = app
            .oneshot(Request::builder().uri("/v1/dashboard").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["occupancy"]["occupancy_rate"], 0);
        assert_eq!(body["bookings"]["total"], 0);
        assert_eq!(body["compliance"]["total"], 0);
        assert_eq!(body["revenue"]["total"], "0");
        assert!(body["requests"].is_null());
        assert_eq!(body["recent_bookings"].as_array().unwrap().len(), 0);
    }
}
