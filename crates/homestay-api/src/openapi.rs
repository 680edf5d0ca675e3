//! # OpenAPI Specification Assembly
//!
//! Collects every utoipa-documented route into one OpenAPI document,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::state::AppState;

/// Adds the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .description(Some(
                            "Static bearer token. Enforced only when AUTH_TOKEN is set.",
                        ))
                        .build(),
                ),
            );
        }
    }
}

/// The assembled API document.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Homestay API",
        description = "Property management for a homestay: rooms, guests, bookings, payments, maintenance, compliance documents, and staff.\n\nAmounts, GST, occupancy, and compliance status are computed by the server. Health probes (`/health/*`) are unauthenticated."
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server"),
    ),
    security(
        ("bearer_auth" = [])
    ),
    paths(
        crate::routes::rooms::create_room,
        crate::routes::rooms::list_rooms,
        crate::routes::rooms::occupancy,
        crate::routes::rooms::get_room,
        crate::routes::rooms::update_room,
        crate::routes::rooms::update_room_status,
        crate::routes::guests::create_guest,
        crate::routes::guests::list_guests,
        crate::routes::guests::get_guest,
        crate::routes::guests::update_guest,
        crate::routes::bookings::quote,
        crate::routes::bookings::create_booking,
        crate::routes::bookings::list_bookings,
        crate::routes::bookings::get_booking,
        crate::routes::bookings::transition_booking,
        crate::routes::payments::create_payment,
        crate::routes::payments::list_payments,
        crate::routes::payments::payment_summary,
        crate::routes::payments::get_payment,
        crate::routes::payments::transition_payment,
        crate::routes::maintenance::create_maintenance,
        crate::routes::maintenance::list_maintenance,
        crate::routes::maintenance::maintenance_summary,
        crate::routes::maintenance::get_maintenance,
        crate::routes::maintenance::update_maintenance,
        crate::routes::maintenance::transition_maintenance,
        crate::routes::compliance::create_document,
        crate::routes::compliance::list_documents,
        crate::routes::compliance::compliance_summary,
        crate::routes::compliance::get_document,
        crate::routes::compliance::update_document,
        crate::routes::staff::create_staff,
        crate::routes::staff::list_staff,
        crate::routes::staff::staff_summary,
        crate::routes::staff::get_staff,
        crate::routes::staff::update_staff,
        crate::routes::dashboard::dashboard,
        crate::routes::analytics::analytics,
    ),
    components(
        schemas(
            // Stored records
            crate::state::RoomRecord,
            crate::state::GuestRecord,
            crate::state::BookingRecord,
            crate::state::PaymentRecord,
            crate::state::MaintenanceRecord,
            crate::state::ComplianceRecord,
            crate::state::StaffRecord,
            // Errors
            crate::error::ErrorBody,
            crate::error::ErrorDetail,
            // List envelopes
            crate::routes::RoomList,
            crate::routes::GuestList,
            crate::routes::BookingList,
            crate::routes::PaymentList,
            crate::routes::MaintenanceList,
            crate::routes::ComplianceList,
            crate::routes::StaffList,
            // Rooms
            crate::routes::rooms::AmenitiesInput,
            crate::routes::rooms::CreateRoomRequest,
            crate::routes::rooms::UpdateRoomRequest,
            crate::routes::rooms::UpdateRoomStatusRequest,
            crate::routes::rooms::OccupancyResponse,
            // Guests
            crate::routes::guests::CreateGuestRequest,
            crate::routes::guests::UpdateGuestRequest,
            // Bookings
            crate::routes::bookings::QuoteRequest,
            crate::routes::bookings::QuoteResponse,
            crate::routes::bookings::CreateBookingRequest,
            crate::routes::bookings::TransitionBookingRequest,
            crate::routes::bookings::BookingView,
            // Payments
            crate::routes::payments::CreatePaymentRequest,
            crate::routes::payments::TransitionPaymentRequest,
            crate::routes::payments::PaymentSummary,
            // Maintenance
            crate::routes::maintenance::CreateMaintenanceRequest,
            crate::routes::maintenance::UpdateMaintenanceRequest,
            crate::routes::maintenance::TransitionMaintenanceRequest,
            crate::routes::maintenance::MaintenanceView,
            crate::routes::maintenance::MaintenanceSummary,
            // Compliance
            crate::routes::compliance::CreateComplianceRequest,
            crate::routes::compliance::UpdateComplianceRequest,
            crate::routes::compliance::ComplianceDocumentView,
            crate::routes::compliance::ComplianceSummary,
            // Staff
            crate::routes::staff::CreateStaffRequest,
            crate::routes::staff::UpdateStaffRequest,
            crate::routes::staff::StaffSummary,
            // Dashboard
            crate::routes::dashboard::DashboardResponse,
            crate::routes::dashboard::BookingCounts,
            crate::routes::dashboard::RevenueFigures,
            crate::routes::dashboard::MaintenanceCounts,
            crate::routes::dashboard::RequestCounts,
            // Analytics
            crate::routes::analytics::AnalyticsResponse,
            crate::routes::analytics::MonthlyRevenue,
            crate::routes::analytics::RoomTypeCount,
        ),
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "rooms", description = "Room inventory, status, and occupancy"),
        (name = "guests", description = "Guest profiles"),
        (name = "bookings", description = "Stay quotes, reservations, check-in and check-out"),
        (name = "payments", description = "Payments against bookings and revenue summary"),
        (name = "maintenance", description = "Maintenance tickets"),
        (name = "compliance", description = "Regulatory documents with derived status"),
        (name = "staff", description = "Staff records and payroll summary"),
        (name = "dashboard", description = "Landing-page figures"),
        (name = "analytics", description = "Revenue trend and room mix"),
    )
)]
pub struct ApiDoc;

/// Serves the document at `/openapi.json`.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
