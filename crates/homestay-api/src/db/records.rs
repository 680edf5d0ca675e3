//! Record persistence operations.
//!
//! All functions take a `&PgPool` and operate on the `records` table.
//! Each record is stored whole as JSONB under its collection name.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::state::{
    BookingRecord, ComplianceRecord, GuestRecord, MaintenanceRecord, PaymentRecord, RoomRecord,
    StaffRecord,
};

/// Name of the collection a record is stored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Rooms,
    Guests,
    Bookings,
    Payments,
    Maintenance,
    Compliance,
    Staff,
}

impl Collection {
    /// Value of the `collection` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rooms => "rooms",
            Self::Guests => "guests",
            Self::Bookings => "bookings",
            Self::Payments => "payments",
            Self::Maintenance => "maintenance",
            Self::Compliance => "compliance",
            Self::Staff => "staff",
        }
    }
}

/// A record type that can be written to and loaded from the `records` table.
pub trait StoredRecord: Serialize + DeserializeOwned + Clone + Send + Sync + Unpin + 'static {
    /// Collection this type is stored under.
    const COLLECTION: Collection;

    /// Primary key.
    fn id(&self) -> Uuid;

    /// Last modification time.
    fn updated_at(&self) -> DateTime<Utc>;
}

macro_rules! stored_record {
    ($($record:ty => $collection:ident),+ $(,)?) => {
        $(
            impl StoredRecord for $record {
                const COLLECTION: Collection = Collection::$collection;

                fn id(&self) -> Uuid {
                    self.id
                }

                fn updated_at(&self) -> DateTime<Utc> {
                    self.updated_at
                }
            }
        )+
    };
}

stored_record! {
    RoomRecord => Rooms,
    GuestRecord => Guests,
    BookingRecord => Bookings,
    PaymentRecord => Payments,
    MaintenanceRecord => Maintenance,
    ComplianceRecord => Compliance,
    StaffRecord => Staff,
}

/// Insert or replace a record.
pub async fn upsert<R: StoredRecord>(pool: &PgPool, record: &R) -> Result<(), sqlx::Error> {
    let body = serde_json::to_value(record).map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

    sqlx::query(
        "INSERT INTO records (collection, id, body, updated_at)
         VALUES ($1, $2, $3, $4)
         ON CONFLICT (collection, id)
         DO UPDATE SET body = EXCLUDED.body, updated_at = EXCLUDED.updated_at",
    )
    .bind(R::COLLECTION.as_str())
    .bind(record.id())
    .bind(body)
    .bind(record.updated_at())
    .execute(pool)
    .await?;

    Ok(())
}

/// Load every record of a collection, oldest first.
///
/// Rows whose body no longer deserializes are logged and skipped.
pub async fn load_all<R: StoredRecord>(pool: &PgPool) -> Result<Vec<R>, sqlx::Error> {
    let rows = sqlx::query_as::<_, RecordRow>(
        "SELECT id, body FROM records WHERE collection = $1 ORDER BY updated_at",
    )
    .bind(R::COLLECTION.as_str())
    .fetch_all(pool)
    .await?;

    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        if let Some(record) = row.into_record::<R>() {
            records.push(record);
        }
    }
    Ok(records)
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct RecordRow {
    id: Uuid,
    body: serde_json::Value,
}

impl RecordRow {
    fn into_record<R: StoredRecord>(self) -> Option<R> {
        match serde_json::from_value(self.body) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::error!(
                    collection = R::COLLECTION.as_str(),
                    id = %self.id,
                    error = %e,
                    "skipping record with unreadable body during load_all"
                );
                None
            }
        }
    }
}
