//! # Compliance Documents API
//!
//! Licences and certificates the property must keep current. A document's
//! status (valid, pending_renewal, expired) is never stored: every read
//! derives it from the expiry date, the reminder window, and today's date,
//! with "today" captured once per request so a list is evaluated against
//! a single date.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDate;
use homestay_calc::{ComplianceTally, DocumentValidity, DEFAULT_REMINDER_DAYS};
use homestay_core::{ComplianceDocumentType, ComplianceStatus, DocumentUrl};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::{newest_first, parse_filter, search_needle, ListResponse};
use crate::error::AppError;
use crate::extractors::{
    contains_ci, extract_validated_json, require_text, require_text_if_present, Validate,
};
use crate::state::{AppState, ComplianceRecord};

fn default_reminder_days() -> u32 {
    DEFAULT_REMINDER_DAYS
}

/// Register a compliance document.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateComplianceRequest {
    #[serde(default)]
    #[schema(value_type = String, example = "fire_safety")]
    pub document_type: ComplianceDocumentType,
    pub document_name: String,
    #[schema(value_type = String, example = "https://docs.example.com/fire-noc.pdf")]
    pub document_url: DocumentUrl,
    pub issuing_authority: String,
    pub issue_date: NaiveDate,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
    /// Days before expiry at which the document needs renewal.
    #[serde(default = "default_reminder_days")]
    pub reminder_days: u32,
}

impl Validate for CreateComplianceRequest {
    fn validate(&self) -> Result<(), String> {
        require_text("document_name", &self.document_name)?;
        require_text("issuing_authority", &self.issuing_authority)?;
        validate_reminder_days(self.reminder_days)
    }
}

/// Partial document update. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateComplianceRequest {
    #[schema(value_type = Option<String>)]
    pub document_type: Option<ComplianceDocumentType>,
    pub document_name: Option<String>,
    #[schema(value_type = Option<String>)]
    pub document_url: Option<DocumentUrl>,
    pub issuing_authority: Option<String>,
    pub issue_date: Option<NaiveDate>,
    /// Set after a renewal.
    pub expiry_date: Option<NaiveDate>,
    pub reminder_days: Option<u32>,
}

impl Validate for UpdateComplianceRequest {
    fn validate(&self) -> Result<(), String> {
        require_text_if_present("document_name", self.document_name.as_deref())?;
        require_text_if_present("issuing_authority", self.issuing_authority.as_deref())?;
        self.reminder_days.map_or(Ok(()), validate_reminder_days)
    }
}

fn validate_reminder_days(days: u32) -> Result<(), String> {
    if days == 0 {
        return Err("reminder_days must be at least 1".to_string());
    }
    Ok(())
}

/// A document with its status as of today.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ComplianceDocumentView {
    #[serde(flatten)]
    pub document: ComplianceRecord,
    #[schema(value_type = String, example = "pending_renewal")]
    pub status: ComplianceStatus,
    /// Negative once expired; absent for documents that never expire.
    pub days_until_expiry: Option<i64>,
    /// First day the document counts as due for renewal.
    pub renewal_due_on: Option<NaiveDate>,
}

impl ComplianceDocumentView {
    /// Derive the status of `document` as of `today`.
    pub fn evaluate(document: ComplianceRecord, today: NaiveDate) -> Self {
        let validity = validity_of(&document);
        Self {
            status: validity.status_on(today),
            days_until_expiry: validity.days_until_expiry(today),
            renewal_due_on: validity.renewal_due_on(),
            document,
        }
    }
}

fn validity_of(document: &ComplianceRecord) -> DocumentValidity {
    DocumentValidity {
        issue_date: document.issue_date,
        expiry_date: document.expiry_date,
        reminder_days: document.reminder_days,
    }
}

/// Compliance list filters. Also applied by the summary endpoint.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ComplianceListParams {
    /// Substring of the document name, type, or issuing authority.
    pub q: Option<String>,
    /// Derived status to match.
    pub status: Option<String>,
    pub document_type: Option<String>,
}

/// Document counts per derived status.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ComplianceSummary {
    pub total: usize,
    pub valid: usize,
    pub expired: usize,
    pub pending_renewal: usize,
    /// Expired plus pending renewal.
    pub needs_attention: usize,
    /// Date the statuses were evaluated against.
    pub as_of: NaiveDate,
}

impl ComplianceSummary {
    pub(crate) fn from_tally(tally: ComplianceTally, as_of: NaiveDate) -> Self {
        Self {
            total: tally.total,
            valid: tally.valid,
            expired: tally.expired,
            pending_renewal: tally.pending_renewal,
            needs_attention: tally.needs_attention(),
            as_of,
        }
    }
}

/// Build the compliance router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/compliance",
            get(list_documents).post(create_document),
        )
        .route("/v1/compliance/summary", get(compliance_summary))
        .route(
            "/v1/compliance/:id",
            get(get_document).patch(update_document),
        )
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("compliance document {id} not found"))
}

/// POST /v1/compliance: Register a document.
#[utoipa::path(
    post,
    path = "/v1/compliance",
    request_body = CreateComplianceRequest,
    responses(
        (status = 201, description = "Document registered", body = ComplianceDocumentView),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "compliance"
)]
async fn create_document(
    State(state): State<AppState>,
    body: Result<Json<CreateComplianceRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ComplianceDocumentView>), AppError> {
    let req = extract_validated_json(body)?;
    DocumentValidity::new(req.issue_date, req.expiry_date, req.reminder_days)?;

    let now = state.now();
    let record = ComplianceRecord {
        id: Uuid::new_v4(),
        document_type: req.document_type,
        document_name: req.document_name.trim().to_string(),
        document_url: req.document_url,
        issuing_authority: req.issuing_authority.trim().to_string(),
        issue_date: req.issue_date,
        expiry_date: req.expiry_date,
        reminder_days: req.reminder_days,
        created_at: now,
        updated_at: now,
    };

    state.compliance.insert(record.id, record.clone());
    state.persist(&record).await?;
    let view = ComplianceDocumentView::evaluate(record, state.today());
    tracing::info!(
        document_id = %view.document.id,
        document_type = %view.document.document_type,
        status = %view.status,
        "compliance document registered"
    );
    Ok((StatusCode::CREATED, Json(view)))
}

/// Documents matching `params`, evaluated against `today`.
pub(crate) fn evaluated_documents(
    state: &AppState,
    params: &ComplianceListParams,
    today: NaiveDate,
) -> Result<Vec<ComplianceDocumentView>, AppError> {
    let status: Option<ComplianceStatus> = parse_filter(params.status.as_deref())?;
    let document_type: Option<ComplianceDocumentType> =
        parse_filter(params.document_type.as_deref())?;
    let needle = search_needle(params.q.as_deref());

    let mut views: Vec<ComplianceDocumentView> = state
        .compliance
        .list()
        .into_iter()
        .filter(|d| document_type.map_or(true, |t| d.document_type == t))
        .filter(|d| {
            needle.as_deref().map_or(true, |n| {
                contains_ci(&d.document_name, n)
                    || contains_ci(d.document_type.as_str(), n)
                    || contains_ci(&d.issuing_authority, n)
            })
        })
        .map(|d| ComplianceDocumentView::evaluate(d, today))
        .filter(|v| status.map_or(true, |s| v.status == s))
        .collect();
    newest_first(&mut views, |v| v.document.created_at);
    Ok(views)
}

/// GET /v1/compliance: List documents with derived status, newest first.
#[utoipa::path(
    get,
    path = "/v1/compliance",
    params(ComplianceListParams),
    responses(
        (status = 200, description = "Documents", body = ComplianceList),
        (status = 422, description = "Unknown filter value", body = crate::error::ErrorBody),
    ),
    tag = "compliance"
)]
async fn list_documents(
    State(state): State<AppState>,
    Query(params): Query<ComplianceListParams>,
) -> Result<Json<ListResponse<ComplianceDocumentView>>, AppError> {
    let today = state.today();
    Ok(Json(evaluated_documents(&state, &params, today)?.into()))
}

/// GET /v1/compliance/summary: Status counts over the filtered documents.
#[utoipa::path(
    get,
    path = "/v1/compliance/summary",
    params(ComplianceListParams),
    responses(
        (status = 200, description = "Compliance summary", body = ComplianceSummary),
        (status = 422, description = "Unknown filter value", body = crate::error::ErrorBody),
    ),
    tag = "compliance"
)]
async fn compliance_summary(
    State(state): State<AppState>,
    Query(params): Query<ComplianceListParams>,
) -> Result<Json<ComplianceSummary>, AppError> {
    let today = state.today();
    let views = evaluated_documents(&state, &params, today)?;
    let tally = ComplianceTally::from_statuses(views.iter().map(|v| v.status));
    Ok(Json(ComplianceSummary::from_tally(tally, today)))
}

/// GET /v1/compliance/:id: Get a document with its current status.
#[utoipa::path(
    get,
    path = "/v1/compliance/{id}",
    params(("id" = Uuid, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Document found", body = ComplianceDocumentView),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "compliance"
)]
async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ComplianceDocumentView>, AppError> {
    let document = state.compliance.get(&id).ok_or_else(|| not_found(id))?;
    Ok(Json(ComplianceDocumentView::evaluate(document, state.today())))
}

/// PATCH /v1/compliance/:id: Update a document, e.g. after renewal.
#[utoipa::path(
    patch,
    path = "/v1/compliance/{id}",
    params(("id" = Uuid, Path, description = "Document ID")),
    request_body = UpdateComplianceRequest,
    responses(
        (status = 200, description = "Document updated", body = ComplianceDocumentView),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "compliance"
)]
async fn update_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Result<Json<UpdateComplianceRequest>, JsonRejection>,
) -> Result<Json<ComplianceDocumentView>, AppError> {
    let req = extract_validated_json(body)?;
    let now = state.now();

    let updated = state
        .compliance
        .try_update(&id, |d| {
            let issue_date = req.issue_date.unwrap_or(d.issue_date);
            let expiry_date = req.expiry_date.or(d.expiry_date);
            let reminder_days = req.reminder_days.unwrap_or(d.reminder_days);
            DocumentValidity::new(issue_date, expiry_date, reminder_days)?;

            if let Some(v) = req.document_type {
                d.document_type = v;
            }
            if let Some(v) = req.document_name {
                d.document_name = v.trim().to_string();
            }
            if let Some(v) = req.document_url {
                d.document_url = v;
            }
            if let Some(v) = req.issuing_authority {
                d.issuing_authority = v.trim().to_string();
            }
            d.issue_date = issue_date;
            d.expiry_date = expiry_date;
            d.reminder_days = reminder_days;
            d.updated_at = now;
            Ok::<_, AppError>(d.clone())
        })
        .ok_or_else(|| not_found(id))??;

    state.persist(&updated).await?;
    Ok(Json(ComplianceDocumentView::evaluate(updated, state.today())))
}
