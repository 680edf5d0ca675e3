//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor.
//!
//! ## Architecture
//!
//! AppState holds one in-memory [`Store`] per record collection (rooms,
//! guests, bookings, payments, maintenance tickets, compliance documents,
//! staff), the injected [`Clock`], the optional Postgres pool, and the
//! startup configuration. When a pool is present every write goes through
//! to the database and the stores are hydrated from it at startup.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use homestay_calc::DEFAULT_GST_RATE_PERCENT;
use homestay_core::{
    BookingPaymentStatus, BookingReference, BookingStatus, Clock, ComplianceDocumentType,
    DocumentUrl, EmailAddress, IdType, InvoiceNumber, MaintenancePriority, MaintenanceStatus,
    MaintenanceType, PaymentMethod, PaymentStatus, PhoneNumber, RoomStatus, RoomType, StaffRole,
    StaffStatus, SystemClock,
};
use homestay_state::TransitionRecord;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::records::StoredRecord;
use crate::error::AppError;

// -- Generic In-Memory Store --------------------------------------------------

/// Thread-safe, cloneable in-memory key-value store.
///
/// All operations are synchronous (the RwLock is `parking_lot`, not
/// `tokio::sync`) because the lock is never held across `.await` points.
#[derive(Debug)]
pub struct Store<T: Clone + Send + Sync> {
    data: Arc<RwLock<HashMap<Uuid, T>>>,
}

impl<T: Clone + Send + Sync> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

impl<T: Clone + Send + Sync> Store<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert a record, returning the previous value if the key existed.
    pub fn insert(&self, id: Uuid, value: T) -> Option<T> {
        self.data.write().insert(id, value)
    }

    /// Retrieve a record by ID.
    pub fn get(&self, id: &Uuid) -> Option<T> {
        self.data.read().get(id).cloned()
    }

    /// List all records, in no particular order.
    pub fn list(&self) -> Vec<T> {
        self.data.read().values().cloned().collect()
    }

    /// Update a record in place. Returns the updated record, or `None` if not found.
    pub fn update(&self, id: &Uuid, f: impl FnOnce(&mut T)) -> Option<T> {
        let mut guard = self.data.write();
        guard.get_mut(id).map(|entry| {
            f(entry);
            entry.clone()
        })
    }

    /// Atomically read-validate-update a record.
    ///
    /// The closure may inspect the record, reject the change with `Err`, or
    /// mutate it and return `Ok`. Returns `None` if the record doesn't exist.
    pub fn try_update<R, E>(
        &self,
        id: &Uuid,
        f: impl FnOnce(&mut T) -> Result<R, E>,
    ) -> Option<Result<R, E>> {
        self.data.write().get_mut(id).map(f)
    }

    /// Run `f` with the whole collection under a single write lock.
    ///
    /// Used for invariants that span records, such as "no two active
    /// bookings overlap on the same room".
    pub fn transact<R>(&self, f: impl FnOnce(&mut HashMap<Uuid, T>) -> R) -> R {
        f(&mut self.data.write())
    }

    /// Check if a record exists.
    pub fn contains(&self, id: &Uuid) -> bool {
        self.data.read().contains_key(id)
    }

    /// Return the number of records.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone + Send + Sync> Default for Store<T> {
    fn default() -> Self {
        Self::new()
    }
}

// -- Record Types -------------------------------------------------------------

/// A room in the property's inventory.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RoomRecord {
    pub id: Uuid,
    pub room_number: String,
    #[schema(value_type = String, example = "deluxe")]
    pub room_type: RoomType,
    pub rate_per_night: Decimal,
    pub max_occupancy: u32,
    pub amenities: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[schema(value_type = String, example = "available")]
    pub status: RoomStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A guest profile.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GuestRecord {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    #[schema(value_type = String)]
    pub email: EmailAddress,
    #[schema(value_type = String)]
    pub phone: PhoneNumber,
    #[schema(value_type = String, example = "aadhar")]
    pub id_type: IdType,
    pub id_number: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub date_of_birth: NaiveDate,
    pub nationality: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emergency_contact_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub emergency_contact_phone: Option<PhoneNumber>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GuestRecord {
    /// "First Last".
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A reservation of one room by one guest for a date range.
///
/// `subtotal`, `tax`, and `total` are computed by the server from the
/// room's nightly rate; `total == subtotal + tax`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookingRecord {
    pub id: Uuid,
    #[schema(value_type = String, example = "HSB482913K7Q")]
    pub reference: BookingReference,
    pub guest_id: Uuid,
    pub room_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub nights: u32,
    pub number_of_guests: u32,
    pub rate_per_night: Decimal,
    pub tax_rate_percent: Decimal,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    #[schema(value_type = String, example = "confirmed")]
    pub status: BookingStatus,
    #[schema(value_type = String, example = "pending")]
    pub payment_status: BookingPaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_requests: Option<String>,
    #[schema(value_type = Vec<Object>)]
    pub transition_log: Vec<TransitionRecord<BookingStatus>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BookingRecord {
    /// Whether this booking holds `room_id` on any night in `[check_in, check_out)`.
    pub fn overlaps(&self, room_id: Uuid, check_in: NaiveDate, check_out: NaiveDate) -> bool {
        self.room_id == room_id
            && self.status.holds_room()
            && self.check_in < check_out
            && check_in < self.check_out
    }
}

/// A payment taken against a booking.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaymentRecord {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub amount: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    #[schema(value_type = String, example = "upi")]
    pub method: PaymentMethod,
    #[schema(value_type = String, example = "pending")]
    pub status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[schema(value_type = String, example = "INV2024010042")]
    pub invoice_number: InvoiceNumber,
    #[schema(value_type = Vec<Object>)]
    pub transition_log: Vec<TransitionRecord<PaymentStatus>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A maintenance ticket for a room.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MaintenanceRecord {
    pub id: Uuid,
    pub room_id: Uuid,
    #[schema(value_type = String, example = "repair")]
    pub task_type: MaintenanceType,
    pub description: String,
    pub assigned_to: String,
    #[schema(value_type = String, example = "medium")]
    pub priority: MaintenancePriority,
    #[schema(value_type = String, example = "pending")]
    pub status: MaintenanceStatus,
    pub scheduled_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[schema(value_type = Vec<Object>)]
    pub transition_log: Vec<TransitionRecord<MaintenanceStatus>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A regulatory document. Its status is not stored; see
/// [`crate::routes::compliance::ComplianceDocumentView`].
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ComplianceRecord {
    pub id: Uuid,
    #[schema(value_type = String, example = "fire_safety")]
    pub document_type: ComplianceDocumentType,
    pub document_name: String,
    #[schema(value_type = String)]
    pub document_url: DocumentUrl,
    pub issuing_authority: String,
    pub issue_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<NaiveDate>,
    pub reminder_days: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A staff member.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StaffRecord {
    pub id: Uuid,
    pub name: String,
    #[schema(value_type = String)]
    pub email: EmailAddress,
    #[schema(value_type = String)]
    pub phone: PhoneNumber,
    #[schema(value_type = String, example = "reception")]
    pub role: StaffRole,
    pub department: String,
    pub hire_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<Decimal>,
    #[schema(value_type = String, example = "active")]
    pub status: StaffStatus,
    pub permissions: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// -- Configuration --------------------------------------------------------------

/// Application configuration, read once at startup.
#[derive(Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Static bearer token. If `None`, authentication is disabled.
    pub auth_token: Option<String>,
    /// GST rate applied to new bookings, in percent.
    pub gst_rate_percent: Decimal,
}

impl AppConfig {
    /// Read `PORT`, `AUTH_TOKEN`, and `GST_RATE_PERCENT` from the environment.
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    ///
    /// Unset keys fall back to defaults. Set-but-invalid keys are errors.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| format!("PORT {raw:?} is not a valid port: {e}"))?,
            None => defaults.port,
        };

        let auth_token = lookup("AUTH_TOKEN").filter(|t| !t.trim().is_empty());

        let gst_rate_percent = match lookup("GST_RATE_PERCENT") {
            Some(raw) => {
                let rate = raw
                    .trim()
                    .parse::<Decimal>()
                    .map_err(|e| format!("GST_RATE_PERCENT {raw:?} is not a number: {e}"))?;
                if rate.is_sign_negative() && !rate.is_zero() {
                    return Err(format!("GST_RATE_PERCENT must not be negative (got {rate})"));
                }
                rate
            }
            None => defaults.gst_rate_percent,
        };

        Ok(Self {
            port,
            auth_token,
            gst_rate_percent,
        })
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field(
                "auth_token",
                &self.auth_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("gst_rate_percent", &self.gst_rate_percent)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            auth_token: None,
            gst_rate_percent: DEFAULT_GST_RATE_PERCENT,
        }
    }
}

// -- Application State ----------------------------------------------------------

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub rooms: Store<RoomRecord>,
    pub guests: Store<GuestRecord>,
    pub bookings: Store<BookingRecord>,
    pub payments: Store<PaymentRecord>,
    pub maintenance: Store<MaintenanceRecord>,
    pub compliance: Store<ComplianceRecord>,
    pub staff: Store<StaffRecord>,

    /// Source of "now" for timestamps and derived statuses.
    pub clock: Arc<dyn Clock>,

    /// PostgreSQL pool. When `None`, the API runs in-memory only.
    pub db_pool: Option<PgPool>,

    pub config: AppConfig,
}

impl AppState {
    /// In-memory state with default configuration and the system clock.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default(), None)
    }

    /// State with the given configuration and optional database pool.
    pub fn with_config(config: AppConfig, db_pool: Option<PgPool>) -> Self {
        Self {
            rooms: Store::new(),
            guests: Store::new(),
            bookings: Store::new(),
            payments: Store::new(),
            maintenance: Store::new(),
            compliance: Store::new(),
            staff: Store::new(),
            clock: Arc::new(SystemClock),
            db_pool,
            config,
        }
    }

    /// Replace the clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Current instant from the injected clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Current date from the injected clock.
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Write a record through to the database, if one is configured.
    ///
    /// Failure is surfaced to the client because the in-memory record would
    /// be lost on restart.
    pub async fn persist<R: StoredRecord>(&self, record: &R) -> Result<(), AppError> {
        if let Some(pool) = &self.db_pool {
            if let Err(e) = crate::db::records::upsert(pool, record).await {
                tracing::error!(
                    collection = R::COLLECTION.as_str(),
                    id = %record.id(),
                    error = %e,
                    "failed to persist record to database"
                );
                return Err(AppError::Internal(format!(
                    "{} record updated in-memory but database persist failed",
                    R::COLLECTION.as_str()
                )));
            }
        }
        Ok(())
    }

    /// Load every collection from the database into the in-memory stores.
    ///
    /// No-op without a pool.
    pub async fn hydrate_from_db(&self) -> Result<(), String> {
        let pool = match &self.db_pool {
            Some(pool) => pool,
            None => return Ok(()),
        };

        let rooms = hydrate(pool, &self.rooms).await?;
        let guests = hydrate(pool, &self.guests).await?;
        let bookings = hydrate(pool, &self.bookings).await?;
        let payments = hydrate(pool, &self.payments).await?;
        let maintenance = hydrate(pool, &self.maintenance).await?;
        let compliance = hydrate(pool, &self.compliance).await?;
        let staff = hydrate(pool, &self.staff).await?;

        tracing::info!(
            rooms,
            guests,
            bookings,
            payments,
            maintenance,
            compliance,
            staff,
            "Hydrated in-memory stores from database"
        );

        Ok(())
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

async fn hydrate<R: StoredRecord>(pool: &PgPool, store: &Store<R>) -> Result<usize, String> {
    let records = crate::db::records::load_all::<R>(pool)
        .await
        .map_err(|e| format!("failed to load {}: {e}", R::COLLECTION.as_str()))?;
    let count = records.len();
    for record in records {
        store.insert(record.id(), record);
    }
    Ok(count)
}
