//! # Domain Vocabularies
//!
//! Every closed set of values in the property-management domain is defined
//! here exactly once: room types, lifecycle statuses, payment methods,
//! maintenance priorities, document types, staff roles, and ID document
//! kinds. Each enum has one wire form (`snake_case`), a `FromStr` impl that
//! rejects unknown strings with [`ValidationError::UnknownVariant`], and an
//! `all()` slice for exhaustive iteration.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Declares a closed vocabulary enum together with its string form,
/// `Display`, `FromStr`, and `all()`.
macro_rules! closed_vocabulary {
    (
        $(#[$meta:meta])*
        pub enum $name:ident ($kind:literal) {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            /// Return the wire representation of this value.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $wire, )+
                }
            }

            /// Return every member of the vocabulary, in declaration order.
            pub fn all() -> &'static [$name] {
                &[ $( Self::$variant, )+ ]
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                Self::all()
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| ValidationError::UnknownVariant {
                        kind: $kind,
                        value: s.to_string(),
                        expected: Self::all()
                            .iter()
                            .map(|v| v.as_str())
                            .collect::<Vec<_>>()
                            .join(", "),
                    })
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Rooms
// ---------------------------------------------------------------------------

closed_vocabulary! {
    /// Category of a room, which drives its rate and capacity.
    pub enum RoomType ("room type") {
        /// Single room.
        Single => "single",
        /// Double room.
        Double => "double",
        /// Deluxe room with premium amenities.
        Deluxe => "deluxe",
        /// Suite.
        Suite => "suite",
    }
}

impl Default for RoomType {
    fn default() -> Self {
        Self::Single
    }
}

closed_vocabulary! {
    /// Current operational status of a room.
    pub enum RoomStatus ("room status") {
        /// Free to be occupied.
        Available => "available",
        /// A guest is checked in.
        Occupied => "occupied",
        /// Out of service for cleaning or repair.
        Maintenance => "maintenance",
    }
}

impl RoomStatus {
    /// Whether new bookings may be taken against a room in this status.
    ///
    /// Occupied rooms remain bookable for future dates; date overlap is
    /// checked separately.
    pub fn accepts_bookings(&self) -> bool {
        !matches!(self, Self::Maintenance)
    }
}

// ---------------------------------------------------------------------------
// Bookings
// ---------------------------------------------------------------------------

closed_vocabulary! {
    /// Lifecycle status of a booking.
    ///
    /// ```text
    /// Confirmed ──▶ CheckedIn ──▶ CheckedOut (terminal)
    ///     │
    ///     └──▶ Cancelled (terminal)
    /// ```
    pub enum BookingStatus ("booking status") {
        /// Reserved, guest has not arrived.
        Confirmed => "confirmed",
        /// Guest is in the room.
        CheckedIn => "checked_in",
        /// Stay is over.
        CheckedOut => "checked_out",
        /// Booking was cancelled before arrival.
        Cancelled => "cancelled",
    }
}

impl BookingStatus {
    /// Whether this booking still holds its room for its date range.
    pub fn holds_room(&self) -> bool {
        matches!(self, Self::Confirmed | Self::CheckedIn)
    }

    /// Whether this state is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::CheckedOut | Self::Cancelled)
    }
}

closed_vocabulary! {
    /// Settlement status of a booking, driven by its payments.
    pub enum BookingPaymentStatus ("booking payment status") {
        /// No completed payment yet.
        Pending => "pending",
        /// A payment for this booking completed.
        Paid => "paid",
        /// The completed payment was refunded.
        Refunded => "refunded",
    }
}

// ---------------------------------------------------------------------------
// Payments
// ---------------------------------------------------------------------------

closed_vocabulary! {
    /// Channel a payment was taken through.
    pub enum PaymentMethod ("payment method") {
        /// Unified Payments Interface transfer.
        Upi => "upi",
        /// Razorpay gateway.
        Razorpay => "razorpay",
        /// Cash at the desk.
        Cash => "cash",
        /// Card terminal.
        Card => "card",
    }
}

closed_vocabulary! {
    /// Lifecycle status of a payment.
    ///
    /// ```text
    /// Pending ──▶ Completed ──▶ Refunded (terminal)
    ///    │  ▲
    ///    ▼  │
    ///   Failed
    /// ```
    pub enum PaymentStatus ("payment status") {
        /// Initiated, not yet settled.
        Pending => "pending",
        /// Money received.
        Completed => "completed",
        /// Gateway or desk reported failure.
        Failed => "failed",
        /// Money returned to the guest.
        Refunded => "refunded",
    }
}

// ---------------------------------------------------------------------------
// Maintenance
// ---------------------------------------------------------------------------

closed_vocabulary! {
    /// Kind of maintenance task.
    pub enum MaintenanceType ("maintenance type") {
        /// Housekeeping.
        Cleaning => "cleaning",
        /// Fixing something broken.
        Repair => "repair",
        /// Scheduled inspection.
        Inspection => "inspection",
        /// General upkeep.
        Maintenance => "maintenance",
    }
}

impl Default for MaintenanceType {
    fn default() -> Self {
        Self::Cleaning
    }
}

closed_vocabulary! {
    /// Lifecycle status of a maintenance ticket.
    pub enum MaintenanceStatus ("maintenance status") {
        /// Logged, not started.
        Pending => "pending",
        /// Work under way.
        InProgress => "in_progress",
        /// Work done.
        Completed => "completed",
    }
}

closed_vocabulary! {
    /// Urgency of a maintenance ticket.
    pub enum MaintenancePriority ("maintenance priority") {
        /// Whenever convenient.
        Low => "low",
        /// Normal scheduling.
        Medium => "medium",
        /// Ahead of normal work.
        High => "high",
        /// Drop everything.
        Urgent => "urgent",
    }
}

impl Default for MaintenancePriority {
    fn default() -> Self {
        Self::Medium
    }
}

// ---------------------------------------------------------------------------
// Compliance
// ---------------------------------------------------------------------------

closed_vocabulary! {
    /// Category of a regulatory document.
    pub enum ComplianceDocumentType ("document type") {
        /// Approved building plan.
        BuildingPlan => "building_plan",
        /// Fire safety certificate.
        FireSafety => "fire_safety",
        /// Health or food licence.
        HealthLicense => "health_license",
        /// Tourism department registration.
        TourismLicense => "tourism_license",
        /// GST registration certificate.
        GstCertificate => "gst_certificate",
        /// Anything else.
        Other => "other",
    }
}

impl Default for ComplianceDocumentType {
    fn default() -> Self {
        Self::TourismLicense
    }
}

closed_vocabulary! {
    /// Derived lifecycle status of a compliance document.
    ///
    /// Never stored; always recomputed from the expiry date, the reminder
    /// lead time, and the current date.
    pub enum ComplianceStatus ("compliance status") {
        /// In force and not yet inside its reminder window.
        Valid => "valid",
        /// Past its expiry date.
        Expired => "expired",
        /// Inside the reminder window before expiry.
        PendingRenewal => "pending_renewal",
    }
}

// ---------------------------------------------------------------------------
// Staff & guests
// ---------------------------------------------------------------------------

closed_vocabulary! {
    /// Job role of a staff member.
    pub enum StaffRole ("staff role") {
        /// Full administrative access.
        Admin => "admin",
        /// Property manager.
        Manager => "manager",
        /// Housekeeping staff.
        Housekeeping => "housekeeping",
        /// Maintenance staff.
        Maintenance => "maintenance",
        /// Front desk.
        Reception => "reception",
    }
}

impl Default for StaffRole {
    fn default() -> Self {
        Self::Reception
    }
}

closed_vocabulary! {
    /// Employment status of a staff member.
    pub enum StaffStatus ("staff status") {
        /// Currently employed.
        Active => "active",
        /// Left or suspended.
        Inactive => "inactive",
    }
}

closed_vocabulary! {
    /// Government ID document presented by a guest at check-in.
    pub enum IdType ("ID type") {
        /// Aadhaar card.
        Aadhar => "aadhar",
        /// Passport.
        Passport => "passport",
        /// Driving licence.
        DrivingLicense => "driving_license",
        /// Voter ID card.
        VoterId => "voter_id",
    }
}

impl Default for IdType {
    fn default() -> Self {
        Self::Aadhar
    }
}

/// Permission strings the dashboard knows how to grant.
///
/// Staff permissions are free-form; this list only drives the defaults
/// offered to operators.
pub const KNOWN_PERMISSIONS: &[&str] = &[
    "manage_rooms",
    "manage_bookings",
    "manage_guests",
    "manage_payments",
    "manage_maintenance",
    "view_analytics",
    "manage_staff",
    "manage_compliance",
];
