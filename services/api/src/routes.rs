use crate::infra::{as_of_or_today, deserialize_optional_date, AppState};
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use care_portal::error::discipline_status;
use care_portal::workflows::discipline::{
    CorrectiveActionId, CorrectiveActionInput, CorrectiveActionRepository,
    CorrectiveActionService, DisciplineError, EmployeeDirectory, EmployeeId, Severity,
    SignatureArtifact, ViolationCategory, ViolationSelection,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::warn;

type SharedService<R, E> = Arc<CorrectiveActionService<R, E>>;

#[derive(Debug, Serialize)]
pub(crate) struct SeverityGroup {
    pub(crate) severity: Severity,
    pub(crate) label: &'static str,
    pub(crate) categories: Vec<ViolationCategory>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct AsOfQuery {
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) as_of: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PreviewRequest {
    #[serde(flatten)]
    pub(crate) selection: ViolationSelection,
    #[serde(default)]
    pub(crate) as_of: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateCorrectiveActionRequest {
    pub(crate) issued_by_id: EmployeeId,
    #[serde(flatten)]
    pub(crate) input: CorrectiveActionInput,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AcknowledgeRequest {
    pub(crate) employee_signature: SignatureArtifact,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DisputeRequest {
    pub(crate) comment: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VoidRequest {
    pub(crate) reason: String,
    pub(crate) voided_by_id: EmployeeId,
}

pub(crate) fn discipline_router<R, E>(service: SharedService<R, E>) -> Router
where
    R: CorrectiveActionRepository + 'static,
    E: EmployeeDirectory + 'static,
{
    Router::new()
        .route(
            "/api/v1/discipline/categories",
            get(categories_handler::<R, E>),
        )
        .route(
            "/api/v1/discipline/employees/:employee_id/points",
            get(points_handler::<R, E>),
        )
        .route(
            "/api/v1/discipline/employees/:employee_id/corrective-actions",
            get(history_handler::<R, E>),
        )
        .route("/api/v1/discipline/preview", post(preview_handler::<R, E>))
        .route(
            "/api/v1/discipline/corrective-actions",
            post(create_handler::<R, E>),
        )
        .route(
            "/api/v1/discipline/corrective-actions/:id",
            get(fetch_handler::<R, E>),
        )
        .route(
            "/api/v1/discipline/corrective-actions/:id/acknowledge",
            post(acknowledge_handler::<R, E>),
        )
        .route(
            "/api/v1/discipline/corrective-actions/:id/dispute",
            post(dispute_handler::<R, E>),
        )
        .route(
            "/api/v1/discipline/corrective-actions/:id/void",
            post(void_handler::<R, E>),
        )
        .with_state(service)
}

pub(crate) fn with_discipline_routes<R, E>(service: SharedService<R, E>) -> Router
where
    R: CorrectiveActionRepository + 'static,
    E: EmployeeDirectory + 'static,
{
    discipline_router(service)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

fn error_response(error: DisciplineError) -> Response {
    let status = discipline_status(&error);
    if status.is_server_error() {
        warn!(%error, retryable = error.is_retryable(), "discipline request failed");
    }
    (status, Json(json!({ "error": error.to_string() }))).into_response()
}

fn respond<T: Serialize>(status: StatusCode, result: Result<T, DisciplineError>) -> Response {
    match result {
        Ok(body) => (status, Json(body)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn categories_handler<R, E>(
    State(service): State<SharedService<R, E>>,
) -> Response
where
    R: CorrectiveActionRepository + 'static,
    E: EmployeeDirectory + 'static,
{
    let groups: Vec<SeverityGroup> = service
        .list_active_grouped_by_severity()
        .into_iter()
        .map(|(severity, categories)| SeverityGroup {
            severity,
            label: severity.label(),
            categories,
        })
        .collect();
    (StatusCode::OK, Json(groups)).into_response()
}

pub(crate) async fn points_handler<R, E>(
    State(service): State<SharedService<R, E>>,
    Path(employee_id): Path<String>,
    Query(query): Query<AsOfQuery>,
) -> Response
where
    R: CorrectiveActionRepository + 'static,
    E: EmployeeDirectory + 'static,
{
    let as_of = as_of_or_today(query.as_of);
    respond(
        StatusCode::OK,
        service.point_state(&EmployeeId(employee_id), as_of),
    )
}

pub(crate) async fn history_handler<R, E>(
    State(service): State<SharedService<R, E>>,
    Path(employee_id): Path<String>,
) -> Response
where
    R: CorrectiveActionRepository + 'static,
    E: EmployeeDirectory + 'static,
{
    let views = service
        .history(&EmployeeId(employee_id))
        .map(|actions| actions.iter().map(|action| action.summary_view()).collect::<Vec<_>>());
    respond(StatusCode::OK, views)
}

pub(crate) async fn preview_handler<R, E>(
    State(service): State<SharedService<R, E>>,
    Json(request): Json<PreviewRequest>,
) -> Response
where
    R: CorrectiveActionRepository + 'static,
    E: EmployeeDirectory + 'static,
{
    let as_of = as_of_or_today(request.as_of);
    respond(StatusCode::OK, service.preview(&request.selection, as_of))
}

pub(crate) async fn create_handler<R, E>(
    State(service): State<SharedService<R, E>>,
    Json(request): Json<CreateCorrectiveActionRequest>,
) -> Response
where
    R: CorrectiveActionRepository + 'static,
    E: EmployeeDirectory + 'static,
{
    respond(
        StatusCode::CREATED,
        service.create_corrective_action(request.input, request.issued_by_id),
    )
}

pub(crate) async fn fetch_handler<R, E>(
    State(service): State<SharedService<R, E>>,
    Path(id): Path<String>,
) -> Response
where
    R: CorrectiveActionRepository + 'static,
    E: EmployeeDirectory + 'static,
{
    respond(StatusCode::OK, service.get(&CorrectiveActionId(id)))
}

pub(crate) async fn acknowledge_handler<R, E>(
    State(service): State<SharedService<R, E>>,
    Path(id): Path<String>,
    Json(request): Json<AcknowledgeRequest>,
) -> Response
where
    R: CorrectiveActionRepository + 'static,
    E: EmployeeDirectory + 'static,
{
    respond(
        StatusCode::OK,
        service.acknowledge(
            &CorrectiveActionId(id),
            request.employee_signature,
            Utc::now(),
        ),
    )
}

pub(crate) async fn dispute_handler<R, E>(
    State(service): State<SharedService<R, E>>,
    Path(id): Path<String>,
    Json(request): Json<DisputeRequest>,
) -> Response
where
    R: CorrectiveActionRepository + 'static,
    E: EmployeeDirectory + 'static,
{
    respond(
        StatusCode::OK,
        service.dispute(&CorrectiveActionId(id), request.comment, Utc::now()),
    )
}

pub(crate) async fn void_handler<R, E>(
    State(service): State<SharedService<R, E>>,
    Path(id): Path<String>,
    Json(request): Json<VoidRequest>,
) -> Response
where
    R: CorrectiveActionRepository + 'static,
    E: EmployeeDirectory + 'static,
{
    respond(
        StatusCode::OK,
        service.void(
            &CorrectiveActionId(id),
            request.reason,
            request.voided_by_id,
            Utc::now(),
        ),
    )
}
