//! Job application routes for workers and the companies reviewing them.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::rbac::{RequireCompany, RequireWorker};
use crate::models::job_application::{
    ApplicationFilters, ApplicationSummary, CreateApplication, DecisionRequest, JobApplication,
};
use crate::models::pagination::{PagedResult, Pagination};
use crate::services::job as job_service;
use crate::services::job_application as application_service;
use crate::AppState;

/// POST /api/v1/jobs/{id}/applications: apply to an open job (worker).
pub async fn apply(
    State(state): State<AppState>,
    RequireWorker(worker): RequireWorker,
    Path(job_id): Path<Uuid>,
    Json(body): Json<CreateApplication>,
) -> Result<Json<ApiResponse<JobApplication>>, AppError> {
    let application = application_service::apply(&state.db, worker.id, job_id, &body).await?;
    Ok(ApiResponse::success(application))
}

/// GET /api/v1/applications/mine: the worker's applications.
pub async fn mine(
    State(state): State<AppState>,
    RequireWorker(worker): RequireWorker,
    Query(pagination): Query<Pagination>,
    Query(filters): Query<ApplicationFilters>,
) -> Result<Json<ApiResponse<PagedResult<ApplicationSummary>>>, AppError> {
    let result =
        application_service::list_for_worker(&state.db, worker.id, &filters, &pagination).await?;
    Ok(ApiResponse::success(result))
}

/// GET /api/v1/jobs/{id}/applications: applications for one of the company's jobs.
pub async fn for_job(
    State(state): State<AppState>,
    RequireCompany(company): RequireCompany,
    Path(job_id): Path<Uuid>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<ApiResponse<PagedResult<ApplicationSummary>>>, AppError> {
    job_service::find_owned(&state.db, job_id, company.id).await?;
    let result = application_service::list_for_job(&state.db, job_id, &pagination).await?;
    Ok(ApiResponse::success(result))
}

/// POST /api/v1/applications/{id}/withdraw: withdraw a pending application (worker).
pub async fn withdraw(
    State(state): State<AppState>,
    RequireWorker(worker): RequireWorker,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<JobApplication>>, AppError> {
    let application = application_service::withdraw(&state.db, worker.id, id).await?;
    Ok(ApiResponse::success(application))
}

/// POST /api/v1/applications/{id}/decision: accept or reject (company).
pub async fn decide(
    State(state): State<AppState>,
    RequireCompany(company): RequireCompany,
    Path(id): Path<Uuid>,
    Json(body): Json<DecisionRequest>,
) -> Result<Json<ApiResponse<JobApplication>>, AppError> {
    let application =
        application_service::decide(&state.db, company.id, id, body.decision).await?;
    Ok(ApiResponse::success(application))
}
