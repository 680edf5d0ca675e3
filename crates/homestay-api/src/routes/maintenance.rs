//! # Maintenance API
//!
//! Maintenance tickets for rooms. Tickets move pending → in_progress →
//! completed (or straight to completed); completing one stamps
//! `completed_date` with today's date.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use homestay_calc::sum_by_status;
use homestay_core::{
    format_inr, MaintenancePriority, MaintenanceStatus, MaintenanceType,
};
use homestay_state::{apply, Lifecycle};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::{newest_first, parse_filter, search_needle, ListResponse};
use crate::error::AppError;
use crate::extractors::{
    check_len, contains_ci, extract_validated_json, require_text, require_text_if_present,
    Validate,
};
use crate::state::{AppState, MaintenanceRecord};

/// Open a maintenance ticket.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateMaintenanceRequest {
    pub room_id: Uuid,
    #[serde(default)]
    #[schema(value_type = String, example = "repair")]
    pub task_type: MaintenanceType,
    pub description: String,
    pub assigned_to: String,
    #[serde(default)]
    #[schema(value_type = String, example = "high")]
    pub priority: MaintenancePriority,
    pub scheduled_date: NaiveDate,
    #[serde(default)]
    pub cost: Option<Decimal>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Validate for CreateMaintenanceRequest {
    fn validate(&self) -> Result<(), String> {
        require_text("description", &self.description)?;
        require_text("assigned_to", &self.assigned_to)?;
        validate_cost(self.cost)?;
        if let Some(ref notes) = self.notes {
            check_len("notes", notes)?;
        }
        Ok(())
    }
}

/// Partial ticket update. Status changes go through the transition endpoint.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateMaintenanceRequest {
    #[schema(value_type = Option<String>)]
    pub task_type: Option<MaintenanceType>,
    pub description: Option<String>,
    pub assigned_to: Option<String>,
    #[schema(value_type = Option<String>)]
    pub priority: Option<MaintenancePriority>,
    pub scheduled_date: Option<NaiveDate>,
    pub cost: Option<Decimal>,
    pub notes: Option<String>,
}

impl Validate for UpdateMaintenanceRequest {
    fn validate(&self) -> Result<(), String> {
        require_text_if_present("description", self.description.as_deref())?;
        require_text_if_present("assigned_to", self.assigned_to.as_deref())?;
        validate_cost(self.cost)?;
        if let Some(ref notes) = self.notes {
            check_len("notes", notes)?;
        }
        Ok(())
    }
}

fn validate_cost(cost: Option<Decimal>) -> Result<(), String> {
    match cost {
        Some(cost) if cost < Decimal::ZERO => Err("cost must not be negative".to_string()),
        _ => Ok(()),
    }
}

/// Move a ticket to a new status.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TransitionMaintenanceRequest {
    #[schema(value_type = String, example = "completed")]
    pub status: MaintenanceStatus,
    #[serde(default)]
    pub reason: Option<String>,
    /// Final cost, recorded when given.
    #[serde(default)]
    pub cost: Option<Decimal>,
}

impl Validate for TransitionMaintenanceRequest {
    fn validate(&self) -> Result<(), String> {
        require_text_if_present("reason", self.reason.as_deref())?;
        validate_cost(self.cost)
    }
}

/// A ticket with its room number resolved.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MaintenanceView {
    #[serde(flatten)]
    pub ticket: MaintenanceRecord,
    pub room_number: Option<String>,
}

/// Maintenance list filters. Also applied by the summary endpoint.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct MaintenanceListParams {
    /// Substring of the room number, description, or assignee.
    pub q: Option<String>,
    pub status: Option<String>,
    pub task_type: Option<String>,
    pub priority: Option<String>,
}

/// Ticket counts and spend over a set of tickets.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MaintenanceSummary {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    /// Urgent tickets not yet completed.
    pub urgent_open: usize,
    /// Sum of recorded costs on completed tickets.
    pub completed_cost: Decimal,
    pub completed_cost_display: String,
}

impl MaintenanceSummary {
    fn from_tickets(tickets: &[MaintenanceRecord]) -> Self {
        let count = |status: MaintenanceStatus| {
            tickets.iter().filter(|t| t.status == status).count()
        };
        let completed_cost = sum_by_status(
            tickets,
            |t| t.status,
            MaintenanceStatus::Completed,
            |t| t.cost.unwrap_or(Decimal::ZERO),
        );
        Self {
            total: tickets.len(),
            pending: count(MaintenanceStatus::Pending),
            in_progress: count(MaintenanceStatus::InProgress),
            completed: count(MaintenanceStatus::Completed),
            urgent_open: tickets
                .iter()
                .filter(|t| {
                    t.priority == MaintenancePriority::Urgent
                        && t.status != MaintenanceStatus::Completed
                })
                .count(),
            completed_cost,
            completed_cost_display: format_inr(completed_cost),
        }
    }
}

/// Build the maintenance router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/maintenance",
            get(list_maintenance).post(create_maintenance),
        )
        .route("/v1/maintenance/summary", get(maintenance_summary))
        .route(
            "/v1/maintenance/:id",
            get(get_maintenance).patch(update_maintenance),
        )
        .route("/v1/maintenance/:id/transition", post(transition_maintenance))
}

fn to_view(state: &AppState, ticket: MaintenanceRecord) -> MaintenanceView {
    let room_number = state.rooms.get(&ticket.room_id).map(|r| r.room_number);
    MaintenanceView {
        ticket,
        room_number,
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("maintenance ticket {id} not found"))
}

/// POST /v1/maintenance: Open a ticket.
#[utoipa::path(
    post,
    path = "/v1/maintenance",
    request_body = CreateMaintenanceRequest,
    responses(
        (status = 201, description = "Ticket opened", body = MaintenanceRecord),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "maintenance"
)]
async fn create_maintenance(
    State(state): State<AppState>,
    body: Result<Json<CreateMaintenanceRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MaintenanceRecord>), AppError> {
    let req = extract_validated_json(body)?;
    if !state.rooms.contains(&req.room_id) {
        return Err(AppError::Validation(format!(
            "room {} does not exist",
            req.room_id
        )));
    }

    let now = state.now();
    let record = MaintenanceRecord {
        id: Uuid::new_v4(),
        room_id: req.room_id,
        task_type: req.task_type,
        description: req.description.trim().to_string(),
        assigned_to: req.assigned_to.trim().to_string(),
        priority: req.priority,
        status: MaintenanceStatus::initial(),
        scheduled_date: req.scheduled_date,
        completed_date: None,
        cost: req.cost,
        notes: req.notes,
        transition_log: Vec::new(),
        created_at: now,
        updated_at: now,
    };

    state.maintenance.insert(record.id, record.clone());
    state.persist(&record).await?;
    tracing::info!(
        ticket_id = %record.id,
        room_id = %record.room_id,
        priority = %record.priority,
        "maintenance ticket opened"
    );
    Ok((StatusCode::CREATED, Json(record)))
}

fn filtered_tickets(
    state: &AppState,
    params: &MaintenanceListParams,
) -> Result<Vec<MaintenanceView>, AppError> {
    let status: Option<MaintenanceStatus> = parse_filter(params.status.as_deref())?;
    let task_type: Option<MaintenanceType> = parse_filter(params.task_type.as_deref())?;
    let priority: Option<MaintenancePriority> = parse_filter(params.priority.as_deref())?;
    let needle = search_needle(params.q.as_deref());

    let mut views: Vec<MaintenanceView> = state
        .maintenance
        .list()
        .into_iter()
        .filter(|t| status.map_or(true, |s| t.status == s))
        .filter(|t| task_type.map_or(true, |k| t.task_type == k))
        .filter(|t| priority.map_or(true, |p| t.priority == p))
        .map(|t| to_view(state, t))
        .filter(|v| {
            needle.as_deref().map_or(true, |n| {
                contains_ci(&v.ticket.description, n)
                    || contains_ci(&v.ticket.assigned_to, n)
                    || v.room_number.as_deref().is_some_and(|r| contains_ci(r, n))
            })
        })
        .collect();
    newest_first(&mut views, |v| v.ticket.created_at);
    Ok(views)
}

/// GET /v1/maintenance: List tickets, newest first.
#[utoipa::path(
    get,
    path = "/v1/maintenance",
    params(MaintenanceListParams),
    responses(
        (status = 200, description = "Tickets", body = MaintenanceList),
        (status = 422, description = "Unknown filter value", body = crate::error::ErrorBody),
    ),
    tag = "maintenance"
)]
async fn list_maintenance(
    State(state): State<AppState>,
    Query(params): Query<MaintenanceListParams>,
) -> Result<Json<ListResponse<MaintenanceView>>, AppError> {
    Ok(Json(filtered_tickets(&state, &params)?.into()))
}

/// GET /v1/maintenance/summary: Counts and completed spend over the filtered tickets.
#[utoipa::path(
    get,
    path = "/v1/maintenance/summary",
    params(MaintenanceListParams),
    responses(
        (status = 200, description = "Maintenance summary", body = MaintenanceSummary),
        (status = 422, description = "Unknown filter value", body = crate::error::ErrorBody),
    ),
    tag = "maintenance"
)]
async fn maintenance_summary(
    State(state): State<AppState>,
    Query(params): Query<MaintenanceListParams>,
) -> Result<Json<MaintenanceSummary>, AppError> {
    let tickets: Vec<MaintenanceRecord> = filtered_tickets(&state, &params)?
        .into_iter()
        .map(|v| v.ticket)
        .collect();
    Ok(Json(MaintenanceSummary::from_tickets(&tickets)))
}

/// GET /v1/maintenance/:id: Get a ticket.
#[utoipa::path(
    get,
    path = "/v1/maintenance/{id}",
    params(("id" = Uuid, Path, description = "Ticket ID")),
    responses(
        (status = 200, description = "Ticket found", body = MaintenanceView),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "maintenance"
)]
async fn get_maintenance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MaintenanceView>, AppError> {
    let ticket = state.maintenance.get(&id).ok_or_else(|| not_found(id))?;
    Ok(Json(to_view(&state, ticket)))
}

/// PATCH /v1/maintenance/:id: Update ticket details.
#[utoipa::path(
    patch,
    path = "/v1/maintenance/{id}",
    params(("id" = Uuid, Path, description = "Ticket ID")),
    request_body = UpdateMaintenanceRequest,
    responses(
        (status = 200, description = "Ticket updated", body = MaintenanceRecord),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "maintenance"
)]
async fn update_maintenance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Result<Json<UpdateMaintenanceRequest>, JsonRejection>,
) -> Result<Json<MaintenanceRecord>, AppError> {
    let req = extract_validated_json(body)?;
    let now = state.now();

    let updated = state
        .maintenance
        .update(&id, |t| {
            if let Some(v) = req.task_type {
                t.task_type = v;
            }
            if let Some(v) = req.description {
                t.description = v.trim().to_string();
            }
            if let Some(v) = req.assigned_to {
                t.assigned_to = v.trim().to_string();
            }
            if let Some(v) = req.priority {
                t.priority = v;
            }
            if let Some(v) = req.scheduled_date {
                t.scheduled_date = v;
            }
            if let Some(v) = req.cost {
                t.cost = Some(v);
            }
            if let Some(v) = req.notes {
                t.notes = Some(v);
            }
            t.updated_at = now;
        })
        .ok_or_else(|| not_found(id))?;

    state.persist(&updated).await?;
    Ok(Json(updated))
}

/// POST /v1/maintenance/:id/transition: Start or complete a ticket.
#[utoipa::path(
    post,
    path = "/v1/maintenance/{id}/transition",
    params(("id" = Uuid, Path, description = "Ticket ID")),
    request_body = TransitionMaintenanceRequest,
    responses(
        (status = 200, description = "Ticket transitioned", body = MaintenanceRecord),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 409, description = "Transition not allowed", body = crate::error::ErrorBody),
    ),
    tag = "maintenance"
)]
async fn transition_maintenance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Result<Json<TransitionMaintenanceRequest>, JsonRejection>,
) -> Result<Json<MaintenanceRecord>, AppError> {
    let req = extract_validated_json(body)?;
    let now = state.now();
    let today = state.today();
    let to = req.status;

    let updated = state
        .maintenance
        .try_update(&id, |t| {
            apply(&mut t.status, &mut t.transition_log, to, now, req.reason)?;
            if to == MaintenanceStatus::Completed {
                t.completed_date = Some(today);
            }
            if let Some(cost) = req.cost {
                t.cost = Some(cost);
            }
            t.updated_at = now;
            Ok::<_, AppError>(t.clone())
        })
        .ok_or_else(|| not_found(id))??;

    state.persist(&updated).await?;
    tracing::info!(ticket_id = %id, status = %updated.status, "maintenance ticket transitioned");
    Ok(Json(updated))
}
