//! # API Route Modules
//!
//! One module per record collection, plus the dashboard and analytics:
//!
//! - `rooms`: room inventory, status changes, occupancy breakdown.
//! - `guests`: guest profiles.
//! - `bookings`: quotes, reservations with server-computed amounts, and
//!   the booking lifecycle (check-in, check-out, cancellation).
//! - `payments`: payments against bookings, payment lifecycle, revenue summary.
//! - `maintenance`: maintenance tickets and their lifecycle.
//! - `compliance`: regulatory documents with status derived on every read.
//! - `staff`: staff records and payroll summary.
//! - `dashboard`: cross-collection figures for the landing page.
//! - `analytics`: monthly revenue trend and rooms per type.
//!
//! List endpoints share the `{ "count", "results" }` envelope and take
//! their filters as query parameters.

pub mod analytics;
pub mod bookings;
pub mod compliance;
pub mod dashboard;
pub mod guests;
pub mod maintenance;
pub mod payments;
pub mod rooms;
pub mod staff;

use std::str::FromStr;

use chrono::{DateTime, Utc};
use homestay_core::ValidationError;
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::AppError;
use crate::state::{GuestRecord, PaymentRecord, RoomRecord, StaffRecord};

/// Envelope for every list endpoint.
#[derive(Debug, Serialize, ToSchema)]
#[aliases(
    RoomList = ListResponse<RoomRecord>,
    GuestList = ListResponse<GuestRecord>,
    BookingList = ListResponse<bookings::BookingView>,
    PaymentList = ListResponse<PaymentRecord>,
    MaintenanceList = ListResponse<maintenance::MaintenanceView>,
    ComplianceList = ListResponse<compliance::ComplianceDocumentView>,
    StaffList = ListResponse<StaffRecord>
)]
pub struct ListResponse<T> {
    /// Number of results.
    pub count: usize,
    pub results: Vec<T>,
}

impl<T> From<Vec<T>> for ListResponse<T> {
    fn from(results: Vec<T>) -> Self {
        Self {
            count: results.len(),
            results,
        }
    }
}

/// Parse an optional vocabulary filter from a query parameter.
///
/// Blank and `"all"` mean no filter. Unknown values are a 422.
pub(crate) fn parse_filter<T>(value: Option<&str>) -> Result<Option<T>, AppError>
where
    T: FromStr<Err = ValidationError>,
{
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) if v.eq_ignore_ascii_case("all") => Ok(None),
        Some(v) => v.parse().map(Some).map_err(AppError::from),
    }
}

/// Lower-cased search needle, or `None` when the query is blank.
pub(crate) fn search_needle(q: Option<&str>) -> Option<String> {
    q.map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_lowercase)
}

/// Sort newest first by creation time.
pub(crate) fn newest_first<T>(records: &mut [T], created_at: impl Fn(&T) -> DateTime<Utc>) {
    records.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use homestay_core::RoomStatus;

    #[test]
    fn blank_and_all_filters_are_ignored() {
        assert_eq!(parse_filter::<RoomStatus>(None).unwrap(), None);
        assert_eq!(parse_filter::<RoomStatus>(Some(" ")).unwrap(), None);
        assert_eq!(parse_filter::<RoomStatus>(Some("all")).unwrap(), None);
    }

    #[test]
    fn known_filter_parses() {
        assert_eq!(
            parse_filter::<RoomStatus>(Some("maintenance")).unwrap(),
            Some(RoomStatus::Maintenance)
        );
    }

    #[test]
    fn unknown_filter_is_validation_error() {
        let err = parse_filter::<RoomStatus>(Some("haunted")).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn needle_is_trimmed_and_lowercased() {
        assert_eq!(search_needle(Some("  Deluxe ")).as_deref(), Some("deluxe"));
        assert_eq!(search_needle(Some("   ")), None);
        assert_eq!(search_needle(None), None);
    }

    #[test]
    fn list_response_counts_results() {
        let list: ListResponse<u8> = vec![1, 2, 3].into();
        assert_eq!(list.count, 3);
    }
}
