//! # Rooms API
//!
//! Room inventory: create, list with filters, read, partial update,
//! manual status changes, and the occupancy breakdown used by the
//! dashboard. Room numbers are unique (case-insensitive).

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use homestay_calc::OccupancyBreakdown;
use homestay_core::{RoomStatus, RoomType};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::{parse_filter, search_needle, ListResponse};
use crate::error::AppError;
use crate::extractors::{
    check_len, contains_ci, extract_json, extract_validated_json, require_text,
    require_text_if_present, Validate,
};
use crate::state::{AppState, RoomRecord};

/// Amenities as a JSON list or a comma-separated string.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum AmenitiesInput {
    List(Vec<String>),
    Csv(String),
}

impl Default for AmenitiesInput {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl AmenitiesInput {
    /// Trimmed, non-empty amenity names in input order.
    pub fn into_list(self) -> Vec<String> {
        let raw: Vec<String> = match self {
            Self::List(items) => items,
            Self::Csv(csv) => csv.split(',').map(str::to_string).collect(),
        };
        raw.into_iter()
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect()
    }
}

/// Create a room.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRoomRequest {
    pub room_number: String,
    #[serde(default)]
    #[schema(value_type = String, example = "double")]
    pub room_type: RoomType,
    pub rate_per_night: Decimal,
    pub max_occupancy: u32,
    #[serde(default)]
    pub amenities: AmenitiesInput,
    #[serde(default)]
    pub description: Option<String>,
}

impl Validate for CreateRoomRequest {
    fn validate(&self) -> Result<(), String> {
        require_text("room_number", &self.room_number)?;
        validate_rate(self.rate_per_night)?;
        validate_occupancy(self.max_occupancy)?;
        if let Some(ref description) = self.description {
            check_len("description", description)?;
        }
        Ok(())
    }
}

/// Partial room update. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateRoomRequest {
    pub room_number: Option<String>,
    #[schema(value_type = Option<String>)]
    pub room_type: Option<RoomType>,
    pub rate_per_night: Option<Decimal>,
    pub max_occupancy: Option<u32>,
    pub amenities: Option<AmenitiesInput>,
    pub description: Option<String>,
}

impl Validate for UpdateRoomRequest {
    fn validate(&self) -> Result<(), String> {
        require_text_if_present("room_number", self.room_number.as_deref())?;
        if let Some(rate) = self.rate_per_night {
            validate_rate(rate)?;
        }
        if let Some(max) = self.max_occupancy {
            validate_occupancy(max)?;
        }
        if let Some(ref description) = self.description {
            check_len("description", description)?;
        }
        Ok(())
    }
}

/// Set a room's status.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRoomStatusRequest {
    #[schema(value_type = String, example = "maintenance")]
    pub status: RoomStatus,
}

fn validate_rate(rate: Decimal) -> Result<(), String> {
    if rate <= Decimal::ZERO {
        return Err("rate_per_night must be positive".to_string());
    }
    Ok(())
}

fn validate_occupancy(max_occupancy: u32) -> Result<(), String> {
    if max_occupancy == 0 {
        return Err("max_occupancy must be at least 1".to_string());
    }
    Ok(())
}

/// Room list filters.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct RoomListParams {
    /// Substring of the room number or room type.
    pub q: Option<String>,
    pub status: Option<String>,
    pub room_type: Option<String>,
}

/// Room counts by status and the occupancy rate.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OccupancyResponse {
    pub total: usize,
    pub occupied: usize,
    pub available: usize,
    pub maintenance: usize,
    /// Whole percent of rooms occupied, 0 when there are no rooms.
    pub occupancy_rate: u8,
}

impl From<OccupancyBreakdown> for OccupancyResponse {
    fn from(breakdown: OccupancyBreakdown) -> Self {
        Self {
            total: breakdown.total,
            occupied: breakdown.occupied,
            available: breakdown.available,
            maintenance: breakdown.maintenance,
            occupancy_rate: breakdown.rate(),
        }
    }
}

/// Build the rooms router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/rooms", get(list_rooms).post(create_room))
        .route("/v1/rooms/occupancy", get(occupancy))
        .route("/v1/rooms/:id", get(get_room).patch(update_room))
        .route("/v1/rooms/:id/status", put(update_room_status))
}

fn same_room_number(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

/// POST /v1/rooms: Create a room.
#[utoipa::path(
    post,
    path = "/v1/rooms",
    request_body = CreateRoomRequest,
    responses(
        (status = 201, description = "Room created", body = RoomRecord),
        (status = 409, description = "Room number already in use", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "rooms"
)]
async fn create_room(
    State(state): State<AppState>,
    body: Result<Json<CreateRoomRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RoomRecord>), AppError> {
    let req = extract_validated_json(body)?;
    let now = state.now();
    let record = RoomRecord {
        id: Uuid::new_v4(),
        room_number: req.room_number.trim().to_string(),
        room_type: req.room_type,
        rate_per_night: req.rate_per_night,
        max_occupancy: req.max_occupancy,
        amenities: req.amenities.into_list(),
        description: req.description,
        status: RoomStatus::Available,
        created_at: now,
        updated_at: now,
    };

    state.rooms.transact(|rooms| {
        if rooms
            .values()
            .any(|r| same_room_number(&r.room_number, &record.room_number))
        {
            return Err(AppError::Conflict(format!(
                "room number {} already exists",
                record.room_number
            )));
        }
        rooms.insert(record.id, record.clone());
        Ok(())
    })?;

    state.persist(&record).await?;
    tracing::info!(room_id = %record.id, room_number = %record.room_number, "room created");
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /v1/rooms: List rooms, sorted by room number.
#[utoipa::path(
    get,
    path = "/v1/rooms",
    params(RoomListParams),
    responses(
        (status = 200, description = "Rooms", body = RoomList),
        (status = 422, description = "Unknown filter value", body = crate::error::ErrorBody),
    ),
    tag = "rooms"
)]
async fn list_rooms(
    State(state): State<AppState>,
    Query(params): Query<RoomListParams>,
) -> Result<Json<ListResponse<RoomRecord>>, AppError> {
    let status: Option<RoomStatus> = parse_filter(params.status.as_deref())?;
    let room_type: Option<RoomType> = parse_filter(params.room_type.as_deref())?;
    let needle = search_needle(params.q.as_deref());

    let mut rooms: Vec<RoomRecord> = state
        .rooms
        .list()
        .into_iter()
        .filter(|r| status.map_or(true, |s| r.status == s))
        .filter(|r| room_type.map_or(true, |t| r.room_type == t))
        .filter(|r| {
            needle.as_deref().map_or(true, |n| {
                contains_ci(&r.room_number, n) || contains_ci(r.room_type.as_str(), n)
            })
        })
        .collect();
    rooms.sort_by(|a, b| a.room_number.cmp(&b.room_number));

    Ok(Json(rooms.into()))
}

/// GET /v1/rooms/:id: Get a room.
#[utoipa::path(
    get,
    path = "/v1/rooms/{id}",
    params(("id" = Uuid, Path, description = "Room ID")),
    responses(
        (status = 200, description = "Room found", body = RoomRecord),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "rooms"
)]
async fn get_room(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RoomRecord>, AppError> {
    state
        .rooms
        .get(&id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("room {id} not found")))
}

/// PATCH /v1/rooms/:id: Update room details.
#[utoipa::path(
    patch,
    path = "/v1/rooms/{id}",
    params(("id" = Uuid, Path, description = "Room ID")),
    request_body = UpdateRoomRequest,
    responses(
        (status = 200, description = "Room updated", body = RoomRecord),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 409, description = "Room number already in use", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "rooms"
)]
async fn update_room(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Result<Json<UpdateRoomRequest>, JsonRejection>,
) -> Result<Json<RoomRecord>, AppError> {
    let req = extract_validated_json(body)?;
    let now = state.now();

    let updated = state.rooms.transact(|rooms| {
        if let Some(ref number) = req.room_number {
            if rooms
                .values()
                .any(|r| r.id != id && same_room_number(&r.room_number, number))
            {
                return Err(AppError::Conflict(format!(
                    "room number {} already exists",
                    number.trim()
                )));
            }
        }
        let room = rooms
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("room {id} not found")))?;
        if let Some(number) = req.room_number {
            room.room_number = number.trim().to_string();
        }
        if let Some(room_type) = req.room_type {
            room.room_type = room_type;
        }
        if let Some(rate) = req.rate_per_night {
            room.rate_per_night = rate;
        }
        if let Some(max) = req.max_occupancy {
            room.max_occupancy = max;
        }
        if let Some(amenities) = req.amenities {
            room.amenities = amenities.into_list();
        }
        if let Some(description) = req.description {
            room.description = Some(description);
        }
        room.updated_at = now;
        Ok(room.clone())
    })?;

    state.persist(&updated).await?;
    Ok(Json(updated))
}

/// PUT /v1/rooms/:id/status: Set a room's status.
#[utoipa::path(
    put,
    path = "/v1/rooms/{id}/status",
    params(("id" = Uuid, Path, description = "Room ID")),
    request_body = UpdateRoomStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = RoomRecord),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 422, description = "Unknown status", body = crate::error::ErrorBody),
    ),
    tag = "rooms"
)]
async fn update_room_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Result<Json<UpdateRoomStatusRequest>, JsonRejection>,
) -> Result<Json<RoomRecord>, AppError> {
    let req = extract_json(body)?;
    let now = state.now();

    let updated = state
        .rooms
        .update(&id, |room| {
            room.status = req.status;
            room.updated_at = now;
        })
        .ok_or_else(|| AppError::NotFound(format!("room {id} not found")))?;

    state.persist(&updated).await?;
    tracing::info!(room_id = %id, status = %updated.status, "room status changed");
    Ok(Json(updated))
}

/// GET /v1/rooms/occupancy: Room counts by status and occupancy rate.
#[utoipa::path(
    get,
    path = "/v1/rooms/occupancy",
    responses(
        (status = 200, description = "Occupancy breakdown", body = OccupancyResponse),
    ),
    tag = "rooms"
)]
async fn occupancy(State(state): State<AppState>) -> Json<OccupancyResponse> {
    Json(occupancy_breakdown(&state).into())
}

/// Occupancy over every room in the store.
pub(crate) fn occupancy_breakdown(state: &AppState) -> OccupancyBreakdown {
    OccupancyBreakdown::from_statuses(state.rooms.list().into_iter().map(|r| r.status))
}
