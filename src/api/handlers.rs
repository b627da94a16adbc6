use crate::api::AppState;
use crate::error::{AppError, Result};
use crate::metrics;
use crate::ml::ClassificationResult;
use crate::models::{Complaint, ComplaintStatus, TimelineEntry};
use crate::state::ComplaintFilter;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Health check endpoint
pub async fn health_check() -> Result<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Prometheus metrics exposition
pub async fn metrics_handler() -> Result<String> {
    metrics::gather()
}

fn run_classification(state: &AppState, text: &str) -> Result<ClassificationResult> {
    let timer = metrics::CLASSIFICATION_DURATION_SECONDS.start_timer();
    let result = state.classifier.classify(text);
    timer.observe_duration();

    metrics::CLASSIFICATIONS_TOTAL
        .with_label_values(&[metrics::outcome_label(&result)])
        .inc();

    result
}

/// Classify complaint text without persisting anything
pub async fn classify(
    State(state): State<AppState>,
    Json(request): Json<ClassifyRequest>,
) -> Result<Json<ClassifyResponse>> {
    request.validate()?;

    let result = run_classification(&state, &request.complaint)?;

    Ok(Json(ClassifyResponse {
        complaint: request.complaint,
        ministries: result.ministries,
        departments: result.departments,
        ministry_confidence: result.ministry_confidence,
        department_confidence: result.department_confidence,
        confidence: result.confidence,
    }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct ClassifyRequest {
    #[validate(length(min = 1, message = "complaint text required"))]
    pub complaint: String,
}

#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    pub complaint: String,
    pub ministries: Vec<String>,
    pub departments: Vec<String>,
    pub ministry_confidence: f64,
    pub department_confidence: f64,
    pub confidence: u32,
}

/// Register a complaint: classify it, persist it with an audit timeline, and
/// return the human-facing reference.
pub async fn submit_complaint(
    State(state): State<AppState>,
    Json(request): Json<SubmitComplaintRequest>,
) -> Result<(StatusCode, Json<SubmitComplaintResponse>)> {
    request.validate()?;

    let mut complaint = Complaint::new(request.title, request.complaint);

    let result = run_classification(&state, &complaint.text)?;
    complaint.apply_classification(&result);

    state.store.save_complaint(&complaint).await?;

    if let Some(ministry) = complaint.category.as_deref() {
        metrics::COMPLAINTS_SUBMITTED_TOTAL
            .with_label_values(&[ministry])
            .inc();
    }

    tracing::info!(
        reference = %complaint.reference,
        category = ?complaint.category,
        confidence = ?complaint.confidence,
        "Complaint registered"
    );

    Ok((
        StatusCode::CREATED,
        Json(SubmitComplaintResponse {
            complaint_ref: complaint.reference.clone(),
            id: complaint.id,
            ministries: complaint.ministries,
            departments: complaint.departments,
            confidence: result.confidence,
            status: complaint.status,
        }),
    ))
}

#[derive(Debug, Deserialize, Validate)]
pub struct SubmitComplaintRequest {
    #[validate(length(min = 1, max = 500))]
    pub title: String,
    #[validate(length(min = 1, message = "complaint text required"))]
    pub complaint: String,
}

#[derive(Debug, Serialize)]
pub struct SubmitComplaintResponse {
    pub complaint_ref: String,
    pub id: Uuid,
    pub ministries: Vec<String>,
    pub departments: Vec<String>,
    pub confidence: u32,
    pub status: ComplaintStatus,
}

/// Get a complaint by ID or by reference
pub async fn get_complaint(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Complaint>> {
    let complaint = match Uuid::parse_str(&id) {
        Ok(uuid) => state.store.get_complaint(&uuid).await?,
        Err(_) => state.store.get_by_reference(&id).await?,
    };

    complaint
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Complaint {} not found", id)))
}

/// List complaints
pub async fn list_complaints(
    State(state): State<AppState>,
    Query(params): Query<ListComplaintsQuery>,
) -> Result<Json<ListComplaintsResponse>> {
    let statuses = match params.status {
        Some(raw) => vec![ComplaintStatus::from_str(&raw)
            .map_err(|_| AppError::Validation(format!("Unknown status '{}'", raw)))?],
        None => Vec::new(),
    };

    let filter = ComplaintFilter {
        statuses,
        ministry: params.ministry,
        open_only: params.open_only.unwrap_or(false),
    };

    let page = params.page.unwrap_or(0);
    let page_size = params.page_size.unwrap_or(20).min(100); // Max 100 per page

    let complaints = state.store.list_complaints(&filter, page, page_size).await?;
    let total = state.store.count_complaints(&filter).await?;

    Ok(Json(ListComplaintsResponse {
        complaints,
        total,
        page,
        page_size,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ListComplaintsQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub status: Option<String>,
    pub ministry: Option<String>,
    pub open_only: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct ListComplaintsResponse {
    pub complaints: Vec<Complaint>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

/// Get a complaint's audit timeline
pub async fn get_timeline(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<TimelineEntry>>> {
    let complaint = state
        .store
        .get_complaint(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Complaint {} not found", id)))?;

    Ok(Json(complaint.timeline))
}

/// Update a complaint's status
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Complaint>> {
    let mut complaint = state
        .store
        .get_complaint(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Complaint {} not found", id)))?;

    complaint.update_status(
        request.status,
        request.actor.unwrap_or_else(|| "api".to_string()),
        request.note.unwrap_or_default(),
    );

    state.store.update_complaint(&complaint).await?;

    Ok(Json(complaint))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: ComplaintStatus,
    pub actor: Option<String>,
    pub note: Option<String>,
}
