//! # Guests API
//!
//! Guest profiles. Email and phone are validated on deserialization, so a
//! malformed address or a short phone number is a 422 before the handler
//! runs.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDate;
use homestay_core::{EmailAddress, IdType, PhoneNumber};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::{search_needle, ListResponse};
use crate::error::AppError;
use crate::extractors::{
    contains_ci, extract_validated_json, require_text, require_text_if_present, Validate,
};
use crate::state::{AppState, GuestRecord};

fn default_country() -> String {
    "India".to_string()
}

fn default_nationality() -> String {
    "Indian".to_string()
}

/// Register a guest.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateGuestRequest {
    pub first_name: String,
    pub last_name: String,
    #[schema(value_type = String, example = "asha@example.com")]
    pub email: EmailAddress,
    #[schema(value_type = String, example = "+91 98765 43210")]
    pub phone: PhoneNumber,
    #[serde(default)]
    #[schema(value_type = String, example = "aadhar")]
    pub id_type: IdType,
    pub id_number: String,
    pub address: String,
    pub city: String,
    pub state: String,
    #[serde(default = "default_country")]
    pub country: String,
    pub date_of_birth: NaiveDate,
    #[serde(default = "default_nationality")]
    pub nationality: String,
    #[serde(default)]
    pub emergency_contact_name: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub emergency_contact_phone: Option<PhoneNumber>,
}

impl Validate for CreateGuestRequest {
    fn validate(&self) -> Result<(), String> {
        require_text("first_name", &self.first_name)?;
        require_text("last_name", &self.last_name)?;
        require_text("id_number", &self.id_number)?;
        require_text("address", &self.address)?;
        require_text("city", &self.city)?;
        require_text("state", &self.state)?;
        require_text("country", &self.country)?;
        require_text("nationality", &self.nationality)?;
        require_text_if_present(
            "emergency_contact_name",
            self.emergency_contact_name.as_deref(),
        )?;
        Ok(())
    }
}

/// Partial guest update. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateGuestRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[schema(value_type = Option<String>)]
    pub email: Option<EmailAddress>,
    #[schema(value_type = Option<String>)]
    pub phone: Option<PhoneNumber>,
    #[schema(value_type = Option<String>)]
    pub id_type: Option<IdType>,
    pub id_number: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub nationality: Option<String>,
    pub emergency_contact_name: Option<String>,
    #[schema(value_type = Option<String>)]
    pub emergency_contact_phone: Option<PhoneNumber>,
}

impl Validate for UpdateGuestRequest {
    fn validate(&self) -> Result<(), String> {
        for (field, value) in [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("id_number", &self.id_number),
            ("address", &self.address),
            ("city", &self.city),
            ("state", &self.state),
            ("country", &self.country),
            ("nationality", &self.nationality),
            ("emergency_contact_name", &self.emergency_contact_name),
        ] {
            require_text_if_present(field, value.as_deref())?;
        }
        Ok(())
    }
}

/// Guest list filters.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct GuestListParams {
    /// Substring of first name, last name, email, or phone.
    pub q: Option<String>,
}

/// Build the guests router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/guests", get(list_guests).post(create_guest))
        .route("/v1/guests/:id", get(get_guest).patch(update_guest))
}

fn check_date_of_birth(date_of_birth: NaiveDate, today: NaiveDate) -> Result<(), AppError> {
    if date_of_birth > today {
        return Err(AppError::Validation(format!(
            "date_of_birth {date_of_birth} is in the future"
        )));
    }
    Ok(())
}

/// POST /v1/guests: Register a guest.
#[utoipa::path(
    post,
    path = "/v1/guests",
    request_body = CreateGuestRequest,
    responses(
        (status = 201, description = "Guest created", body = GuestRecord),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "guests"
)]
async fn create_guest(
    State(state): State<AppState>,
    body: Result<Json<CreateGuestRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<GuestRecord>), AppError> {
    let req = extract_validated_json(body)?;
    check_date_of_birth(req.date_of_birth, state.today())?;

    let now = state.now();
    let record = GuestRecord {
        id: Uuid::new_v4(),
        first_name: req.first_name.trim().to_string(),
        last_name: req.last_name.trim().to_string(),
        email: req.email,
        phone: req.phone,
        id_type: req.id_type,
        id_number: req.id_number.trim().to_string(),
        address: req.address,
        city: req.city,
        state: req.state,
        country: req.country,
        date_of_birth: req.date_of_birth,
        nationality: req.nationality,
        emergency_contact_name: req.emergency_contact_name,
        emergency_contact_phone: req.emergency_contact_phone,
        created_at: now,
        updated_at: now,
    };

    state.guests.insert(record.id, record.clone());
    state.persist(&record).await?;
    tracing::info!(guest_id = %record.id, "guest registered");
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /v1/guests: List guests, sorted by first name.
#[utoipa::path(
    get,
    path = "/v1/guests",
    params(GuestListParams),
    responses((status = 200, description = "Guests", body = GuestList)),
    tag = "guests"
)]
async fn list_guests(
    State(state): State<AppState>,
    Query(params): Query<GuestListParams>,
) -> Json<ListResponse<GuestRecord>> {
    let needle = search_needle(params.q.as_deref());
    let mut guests: Vec<GuestRecord> = state
        .guests
        .list()
        .into_iter()
        .filter(|g| needle.as_deref().map_or(true, |n| guest_matches(g, n)))
        .collect();
    guests.sort_by(|a, b| {
        a.first_name
            .to_lowercase()
            .cmp(&b.first_name.to_lowercase())
            .then_with(|| a.last_name.cmp(&b.last_name))
    });
    Json(guests.into())
}

fn guest_matches(guest: &GuestRecord, needle: &str) -> bool {
    contains_ci(&guest.first_name, needle)
        || contains_ci(&guest.last_name, needle)
        || contains_ci(guest.email.as_str(), needle)
        || guest.phone.as_str().contains(needle)
}

/// GET /v1/guests/:id: Get a guest.
#[utoipa::path(
    get,
    path = "/v1/guests/{id}",
    params(("id" = Uuid, Path, description = "Guest ID")),
    responses(
        (status = 200, description = "Guest found", body = GuestRecord),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "guests"
)]
async fn get_guest(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GuestRecord>, AppError> {
    state
        .guests
        .get(&id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("guest {id} not found")))
}

/// PATCH /v1/guests/:id: Update a guest profile.
#[utoipa::path(
    patch,
    path = "/v1/guests/{id}",
    params(("id" = Uuid, Path, description = "Guest ID")),
    request_body = UpdateGuestRequest,
    responses(
        (status = 200, description = "Guest updated", body = GuestRecord),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "guests"
)]
async fn update_guest(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Result<Json<UpdateGuestRequest>, JsonRejection>,
) -> Result<Json<GuestRecord>, AppError> {
    let req = extract_validated_json(body)?;
    if let Some(dob) = req.date_of_birth {
        check_date_of_birth(dob, state.today())?;
    }
    let now = state.now();

    let updated = state
        .guests
        .update(&id, |g| {
            if let Some(v) = req.first_name {
                g.first_name = v.trim().to_string();
            }
            if let Some(v) = req.last_name {
                g.last_name = v.trim().to_string();
            }
            if let Some(v) = req.email {
                g.email = v;
            }
            if let Some(v) = req.phone {
                g.phone = v;
            }
            if let Some(v) = req.id_type {
                g.id_type = v;
            }
            if let Some(v) = req.id_number {
                g.id_number = v.trim().to_string();
            }
            if let Some(v) = req.address {
                g.address = v;
            }
            if let Some(v) = req.city {
                g.city = v;
            }
            if let Some(v) = req.state {
                g.state = v;
            }
            if let Some(v) = req.country {
                g.country = v;
            }
            if let Some(v) = req.date_of_birth {
                g.date_of_birth = v;
            }
            if let Some(v) = req.nationality {
                g.nationality = v;
            }
            if let Some(v) = req.emergency_contact_name {
                g.emergency_contact_name = Some(v);
            }
            if let Some(v) = req.emergency_contact_phone {
                g.emergency_contact_phone = Some(v);
            }
            g.updated_at = now;
        })
        .ok_or_else(|| AppError::NotFound(format!("guest {id} not found")))?;

    state.persist(&updated).await?;
    Ok(Json(updated))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_app() -> Router<()> {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let clock = homestay_core::FixedClock::at_date(today);
        router().with_state(AppState::new().with_clock(Arc::new(clock)))
    }

    async fn body_json<T: serde::de::DeserializeOwned>(resp: axum::response::Response) -> T {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn send(
        app: &Router<()>,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> axum::response::Response {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        let body = body.map_or_else(Body::empty, |b| Body::from(b.to_string()));
        app.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
    }

    fn guest_body(first: &str, email: &str) -> serde_json::Value {
        serde_json::json!({
            "first_name": first,
            "last_name": "Sharma",
            "email": email,
            "phone": "+91 98765 43210",
            "id_number": "1234 5678 9012",
            "address": "12 MG Road",
            "city": "Shimla",
            "state": "Himachal Pradesh",
            "date_of_birth": "1990-04-12",
        })
    }

    #[tokio::test]
    async fn create_guest_applies_defaults() {
        let app = test_app();
        let body = guest_body("Asha", "asha@example.com");
        let resp = send(&app, "POST", "/v1/guests", Some(body)).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let guest: GuestRecord = body_json(resp).await;
        assert_eq!(guest.country, "India");
        assert_eq!(guest.nationality, "Indian");
        assert_eq!(guest.id_type, IdType::Aadhar);
        assert_eq!(guest.full_name(), "Asha Sharma");
    }

    #[tokio::test]
    async fn invalid_email_is_422() {
        let app = test_app();
        let resp = send(&app, "POST", "/v1/guests", Some(guest_body("Asha", "not-an-email"))).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn short_phone_is_422() {
        let app = test_app();
        let mut body = guest_body("Asha", "asha@example.com");
        body["phone"] = "12345".into();
        let resp = send(&app, "POST", "/v1/guests", Some(body)).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn future_date_of_birth_is_422() {
        let app = test_app();
        let mut body = guest_body("Asha", "asha@example.com");
        body["date_of_birth"] = "2030-01-01".into();
        let resp = send(&app, "POST", "/v1/guests", Some(body)).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn missing_date_of_birth_is_422() {
        let app = test_app();
        let mut body = guest_body("Asha", "asha@example.com");
        body.as_object_mut().unwrap().remove("date_of_birth");
        let resp = send(&app, "POST", "/v1/guests", Some(body)).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn list_searches_and_sorts_by_first_name() {
        let app = test_app();
        send(&app, "POST", "/v1/guests", Some(guest_body("Vikram", "vik@example.com"))).await;
        send(&app, "POST", "/v1/guests", Some(guest_body("Asha", "asha@example.com"))).await;

        let resp = send(&app, "GET", "/v1/guests", None).await;
        let list: serde_json::Value = body_json(resp).await;
        assert_eq!(list["count"], 2);
        assert_eq!(list["results"][0]["first_name"], "Asha");

        let resp = send(&app, "GET", "/v1/guests?q=VIK", None).await;
        let list: serde_json::Value = body_json(resp).await;
        assert_eq!(list["count"], 1);
        assert_eq!(list["results"][0]["first_name"], "Vikram");

        let resp = send(&app, "GET", "/v1/guests?q=98765", None).await;
        let list: serde_json::Value = body_json(resp).await;
        assert_eq!(list["count"], 2);
    }

    #[tokio::test]
    async fn patch_updates_email() {
        let app = test_app();
        let body = guest_body("Asha", "asha@example.com");
        let resp = send(&app, "POST", "/v1/guests", Some(body)).await;
        let guest: GuestRecord = body_json(resp).await;

        let resp = send(
            &app,
            "PATCH",
            &format!("/v1/guests/{}", guest.id),
            Some(serde_json::json!({"email": "asha.s@example.in"})),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let updated: GuestRecord = body_json(resp).await;
        assert_eq!(updated.email.as_str(), "asha.s@example.in");
        assert_eq!(updated.first_name, "Asha");
    }

    #[tokio::test]
    async fn patch_missing_guest_is_404() {
        let app = test_app();
        let resp = send(
            &app,
            "PATCH",
            &format!("/v1/guests/{}", Uuid::new_v4()),
            Some(serde_json::json!({"city": "Manali"})),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
