use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use printgate_auth::{BearerToken, Operation, OptionalBearerToken, Session};
use printgate_queue::{PrintJob, ResourceStatus};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::server::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
}

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "ok" }))
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<Session>> {
    let Json(req) = payload?;
    let session = state
        .auth
        .access
        .authenticate(&req.username, &req.password)
        .await?;
    Ok(Json(session))
}

pub async fn logout(
    State(state): State<AppState>,
    OptionalBearerToken(token): OptionalBearerToken,
) -> StatusCode {
    if let Some(token) = token {
        state.auth.access.logout(&token);
    }
    StatusCode::NO_CONTENT
}

// ---------------------------------------------------------------------------
// Queues
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub filename: String,
}

#[derive(Debug, Serialize)]
pub struct QueueListing {
    pub printer: String,
    pub jobs: Vec<PrintJob>,
}

pub async fn submit(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<SubmitRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<PrintJob>)> {
    let principal = state.auth.authorize(&token, Operation::Submit).await?;
    let Path(printer) = path?;
    let Json(req) = payload?;
    if req.filename.trim().is_empty() {
        return Err(ApiError::bad_request("filename must not be empty"));
    }

    let job = state.queue.submit(&printer, &req.filename)?;
    tracing::debug!(username = %principal.username, printer = %printer, job_id = job.id, "Submitted");
    Ok((StatusCode::CREATED, Json(job)))
}

pub async fn list_queue(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<QueueListing>> {
    state.auth.authorize(&token, Operation::ListQueue).await?;
    let Path(printer) = path?;
    let jobs = state.queue.list(&printer)?;
    Ok(Json(QueueListing { printer, jobs }))
}

pub async fn promote(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    path: Result<Path<(String, u64)>, PathRejection>,
) -> ApiResult<StatusCode> {
    state.auth.authorize(&token, Operation::Promote).await?;
    let Path((printer, job_id)) = path?;
    state.queue.promote(&printer, job_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn status(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<ResourceStatus>> {
    state.auth.authorize(&token, Operation::Status).await?;
    let Path(printer) = path?;
    Ok(Json(state.queue.status(&printer)))
}

// ---------------------------------------------------------------------------
// Service lifecycle
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct ServiceResponse {
    pub running: bool,
}

pub async fn start(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> ApiResult<Json<ServiceResponse>> {
    let principal = state.auth.authorize(&token, Operation::Start).await?;
    state.queue.start();
    tracing::info!(username = %principal.username, "Print service started");
    Ok(Json(ServiceResponse { running: true }))
}

pub async fn stop(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> ApiResult<Json<ServiceResponse>> {
    let principal = state.auth.authorize(&token, Operation::Stop).await?;
    state.queue.stop();
    tracing::info!(username = %principal.username, "Print service stopped");
    Ok(Json(ServiceResponse { running: false }))
}

pub async fn restart(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> ApiResult<Json<ServiceResponse>> {
    let principal = state.auth.authorize(&token, Operation::Restart).await?;
    state.queue.restart();
    tracing::info!(username = %principal.username, "Print service restarted");
    Ok(Json(ServiceResponse {
        running: state.queue.is_running(),
    }))
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct ConfigEntry {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct SetConfigRequest {
    pub value: String,
}

pub async fn read_config(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<ConfigEntry>> {
    state.auth.authorize(&token, Operation::ReadConfig).await?;
    let Path(key) = path?;
    let value = state.queue.read_config(&key)?;
    Ok(Json(ConfigEntry { key, value }))
}

pub async fn set_config(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<SetConfigRequest>, JsonRejection>,
) -> ApiResult<Json<ConfigEntry>> {
    state.auth.authorize(&token, Operation::SetConfig).await?;
    let Path(key) = path?;
    let Json(req) = payload?;
    state.queue.set_config(&key, &req.value);
    Ok(Json(ConfigEntry {
        key,
        value: req.value,
    }))
}
