//! # Staff API
//!
//! Staff records and the payroll summary. Permissions are free-form
//! strings; names outside `KNOWN_PERMISSIONS` are accepted but logged.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDate;
use homestay_calc::sum_by_status;
use homestay_core::{
    format_inr, EmailAddress, PhoneNumber, StaffRole, StaffStatus, KNOWN_PERMISSIONS,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::{parse_filter, search_needle, ListResponse};
use crate::error::AppError;
use crate::extractors::{
    contains_ci, extract_validated_json, require_text, require_text_if_present, Validate,
};
use crate::state::{AppState, StaffRecord};

fn default_staff_status() -> StaffStatus {
    StaffStatus::Active
}

/// Add a staff member.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateStaffRequest {
    pub name: String,
    #[schema(value_type = String, example = "meena@example.com")]
    pub email: EmailAddress,
    #[schema(value_type = String, example = "9876543210")]
    pub phone: PhoneNumber,
    #[serde(default)]
    #[schema(value_type = String, example = "housekeeping")]
    pub role: StaffRole,
    pub department: String,
    pub hire_date: NaiveDate,
    #[serde(default)]
    pub salary: Option<Decimal>,
    #[serde(default = "default_staff_status")]
    #[schema(value_type = String, example = "active")]
    pub status: StaffStatus,
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl Validate for CreateStaffRequest {
    fn validate(&self) -> Result<(), String> {
        require_text("name", &self.name)?;
        require_text("department", &self.department)?;
        validate_salary(self.salary)
    }
}

/// Partial staff update. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateStaffRequest {
    pub name: Option<String>,
    #[schema(value_type = Option<String>)]
    pub email: Option<EmailAddress>,
    #[schema(value_type = Option<String>)]
    pub phone: Option<PhoneNumber>,
    #[schema(value_type = Option<String>)]
    pub role: Option<StaffRole>,
    pub department: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub salary: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub status: Option<StaffStatus>,
    pub permissions: Option<Vec<String>>,
}

impl Validate for UpdateStaffRequest {
    fn validate(&self) -> Result<(), String> {
        require_text_if_present("name", self.name.as_deref())?;
        require_text_if_present("department", self.department.as_deref())?;
        validate_salary(self.salary)
    }
}

fn validate_salary(salary: Option<Decimal>) -> Result<(), String> {
    match salary {
        Some(s) if s < Decimal::ZERO => Err("salary must not be negative".to_string()),
        _ => Ok(()),
    }
}

/// Trim, drop blanks and duplicates, and log names outside the known set.
fn normalize_permissions(permissions: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(permissions.len());
    for permission in permissions {
        let permission = permission.trim().to_string();
        if permission.is_empty() || out.contains(&permission) {
            continue;
        }
        if !KNOWN_PERMISSIONS.contains(&permission.as_str()) {
            tracing::debug!(permission = %permission, "unrecognised staff permission");
        }
        out.push(permission);
    }
    out
}

/// Staff list filters. Also applied by the summary endpoint.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct StaffListParams {
    /// Substring of the name, email, or department.
    pub q: Option<String>,
    pub role: Option<String>,
    pub status: Option<String>,
}

/// Headcount and payroll over a set of staff.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StaffSummary {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    /// Monthly salaries of active staff.
    pub active_salary_total: Decimal,
    pub active_salary_display: String,
}

impl StaffSummary {
    fn from_staff(staff: &[StaffRecord]) -> Self {
        let active = staff
            .iter()
            .filter(|s| s.status == StaffStatus::Active)
            .count();
        let active_salary_total = sum_by_status(
            staff,
            |s| s.status,
            StaffStatus::Active,
            |s| s.salary.unwrap_or(Decimal::ZERO),
        );
        Self {
            total: staff.len(),
            active,
            inactive: staff.len() - active,
            active_salary_total,
            active_salary_display: format_inr(active_salary_total),
        }
    }
}

/// Build the staff router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/staff", get(list_staff).post(create_staff))
        .route("/v1/staff/summary", get(staff_summary))
        .route("/v1/staff/:id", get(get_staff).patch(update_staff))
}

/// POST /v1/staff: Add a staff member.
#[utoipa::path(
    post,
    path = "/v1/staff",
    request_body = CreateStaffRequest,
    responses(
        (status = 201, description = "Staff member added", body = StaffRecord),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "staff"
)]
async fn create_staff(
    State(state): State<AppState>,
    body: Result<Json<CreateStaffRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<StaffRecord>), AppError> {
    let req = extract_validated_json(body)?;
    let now = state.now();
    let record = StaffRecord {
        id: Uuid::new_v4(),
        name: req.name.trim().to_string(),
        email: req.email,
        phone: req.phone,
        role: req.role,
        department: req.department.trim().to_string(),
        hire_date: req.hire_date,
        salary: req.salary,
        status: req.status,
        permissions: normalize_permissions(req.permissions),
        created_at: now,
        updated_at: now,
    };

    state.staff.insert(record.id, record.clone());
    state.persist(&record).await?;
    tracing::info!(staff_id = %record.id, role = %record.role, "staff member added");
    Ok((StatusCode::CREATED, Json(record)))
}

fn filtered_staff(
    state: &AppState,
    params: &StaffListParams,
) -> Result<Vec<StaffRecord>, AppError> {
    let role: Option<StaffRole> = parse_filter(params.role.as_deref())?;
    let status: Option<StaffStatus> = parse_filter(params.status.as_deref())?;
    let needle = search_needle(params.q.as_deref());

    let mut staff: Vec<StaffRecord> = state
        .staff
        .list()
        .into_iter()
        .filter(|s| role.map_or(true, |r| s.role == r))
        .filter(|s| status.map_or(true, |st| s.status == st))
        .filter(|s| {
            needle.as_deref().map_or(true, |n| {
                contains_ci(&s.name, n)
                    || contains_ci(s.email.as_str(), n)
                    || contains_ci(&s.department, n)
            })
        })
        .collect();
    staff.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    Ok(staff)
}

/// GET /v1/staff: List staff, sorted by name.
#[utoipa::path(
    get,
    path = "/v1/staff",
    params(StaffListParams),
    responses(
        (status = 200, description = "Staff", body = StaffList),
        (status = 422, description = "Unknown filter value", body = crate::error::ErrorBody),
    ),
    tag = "staff"
)]
async fn list_staff(
    State(state): State<AppState>,
    Query(params): Query<StaffListParams>,
) -> Result<Json<ListResponse<StaffRecord>>, AppError> {
    Ok(Json(filtered_staff(&state, &params)?.into()))
}

/// GET /v1/staff/summary: Headcount and active payroll over the filtered staff.
#[utoipa::path(
    get,
    path = "/v1/staff/summary",
    params(StaffListParams),
    responses(
        (status = 200, description = "Staff summary", body = StaffSummary),
        (status = 422, description = "Unknown filter value", body = crate::error::ErrorBody),
    ),
    tag = "staff"
)]
async fn staff_summary(
    State(state): State<AppState>,
    Query(params): Query<StaffListParams>,
) -> Result<Json<StaffSummary>, AppError> {
    let staff = filtered_staff(&state, &params)?;
    Ok(Json(StaffSummary::from_staff(&staff)))
}

/// GET /v1/staff/:id: Get a staff member.
#[utoipa::path(
    get,
    path = "/v1/staff/{id}",
    params(("id" = Uuid, Path, description = "Staff ID")),
    responses(
        (status = 200, description = "Staff member found", body = StaffRecord),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "staff"
)]
async fn get_staff(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StaffRecord>, AppError> {
    state
        .staff
        .get(&id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("staff member {id} not found")))
}

/// PATCH /v1/staff/:id: Update a staff member.
#[utoipa::path(
    patch,
    path = "/v1/staff/{id}",
    params(("id" = Uuid, Path, description = "Staff ID")),
    request_body = UpdateStaffRequest,
    responses(
        (status = 200, description = "Staff member updated", body = StaffRecord),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "staff"
)]
async fn update_staff(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Result<Json<UpdateStaffRequest>, JsonRejection>,
) -> Result<Json<StaffRecord>, AppError> {
    let req = extract_validated_json(body)?;
    let now = state.now();

    let updated = state
        .staff
        .update(&id, |s| {
            if let Some(v) = req.name {
                s.name = v.trim().to_string();
            }
            if let Some(v) = req.email {
                s.email = v;
            }
            if let Some(v) = req.phone {
                s.phone = v;
            }
            if let Some(v) = req.role {
                s.role = v;
            }
            if let Some(v) = req.department {
                s.department = v.trim().to_string();
            }
            if let Some(v) = req.hire_date {
                s.hire_date = v;
            }
            if let Some(v) = req.salary {
                s.salary = Some(v);
            }
            if let Some(v) = req.status {
                s.status = v;
            }
            if let Some(v) = req.permissions {
                s.permissions = normalize_permissions(v);
            }
            s.updated_at = now;
        })
        .ok_or_else(|| AppError::NotFound(format!("staff member {id} not found")))?;

    state.persist(&updated).await?;
    Ok(Json(updated))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn body_json<T: serde::de::DeserializeOwned>(resp: axum::response::Response) -> T {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn send(
        state: &AppState,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> axum::response::Response {
        let app = router().with_state(state.clone());
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        let body = body.map_or_else(Body::empty, |b| Body::from(b.to_string()));
        app.oneshot(builder.body(body).unwrap()).await.unwrap()
    }

    fn staff_body(name: &str, salary: &str, status: &str) -> serde_json::Value {
        serde_json::json!({
            "name": name,
            "email": format!("{}@example.com", name.to_lowercase()),
            "phone": "9876543210",
            "role": "housekeeping",
            "department": "Rooms",
            "hire_date": "2022-04-01",
            "salary": salary,
            "status": status,
            "permissions": ["manage_rooms", " manage_rooms ", "", "night_audit"],
        })
    }

    #[test]
    fn permissions_are_trimmed_and_deduplicated() {
        let perms = normalize_permissions(vec![
            " view_analytics".into(),
            "view_analytics".into(),
            "".into(),
            "custom".into(),
        ]);
        assert_eq!(perms, vec!["view_analytics", "custom"]);
    }

    #[tokio::test]
    async fn create_staff_keeps_unknown_permissions() {
        let state = AppState::new();
        let body = staff_body("Meena", "18000", "active");
        let resp = send(&state, "POST", "/v1/staff", Some(body)).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let staff: StaffRecord = body_json(resp).await;
        assert_eq!(staff.permissions, vec!["manage_rooms", "night_audit"]);
        assert_eq!(staff.role, StaffRole::Housekeeping);
    }

    #[tokio::test]
    async fn negative_salary_is_422() {
        let state = AppState::new();
        let body = staff_body("Meena", "-1", "active");
        let resp = send(&state, "POST", "/v1/staff", Some(body)).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn summary_totals_active_salaries() {
        let state = AppState::new();
        send(&state, "POST", "/v1/staff", Some(staff_body("Meena", "18000", "active"))).await;
        send(&state, "POST", "/v1/staff", Some(staff_body("Ravi", "22000.50", "active"))).await;
        send(&state, "POST", "/v1/staff", Some(staff_body("Old", "50000", "inactive"))).await;

        let resp = send(&state, "GET", "/v1/staff/summary", None).await;
        let summary: StaffSummary = body_json(resp).await;
        assert_eq!(summary.total, 3);
        assert_eq!(summary.active, 2);
        assert_eq!(summary.inactive, 1);
        assert_eq!(summary.active_salary_total, "40000.50".parse::<Decimal>().unwrap());
        assert_eq!(summary.active_salary_display, "₹40,000.50");
    }

    #[tokio::test]
    async fn list_sorts_by_name_and_filters() {
        let state = AppState::new();
        send(&state, "POST", "/v1/staff", Some(staff_body("Ravi", "1", "active"))).await;
        send(&state, "POST", "/v1/staff", Some(staff_body("Meena", "1", "inactive"))).await;

        let resp = send(&state, "GET", "/v1/staff", None).await;
        let list: serde_json::Value = body_json(resp).await;
        assert_eq!(list["results"][0]["name"], "Meena");

        let resp = send(&state, "GET", "/v1/staff?status=active", None).await;
        let list: serde_json::Value = body_json(resp).await;
        assert_eq!(list["count"], 1);
        assert_eq!(list["results"][0]["name"], "Ravi");

        let resp = send(&state, "GET", "/v1/staff?role=chef", None).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn patch_deactivates() {
        let state = AppState::new();
        let resp = send(&state, "POST", "/v1/staff", Some(staff_body("Ravi", "1", "active"))).await;
        let staff: StaffRecord = body_json(resp).await;
        let resp = send(
            &state,
            "PATCH",
            &format!("/v1/staff/{}", staff.id),
            Some(serde_json::json!({"status": "inactive"})),
        )
        .await;
        let updated: StaffRecord = body_json(resp).await;
        assert_eq!(updated.status, StaffStatus::Inactive);
        assert_eq!(updated.name, "Ravi");
    }
}
