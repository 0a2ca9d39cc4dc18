//! Job routes: posting, browsing, and lifecycle transitions.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::CurrentUser;
use crate::middleware::rbac::RequireCompany;
use crate::models::job::{CreateJob, Job, JobStatusUpdate, JobSummary};
use crate::models::pagination::{PagedResult, Pagination};
use crate::services::job::{self as job_service, JobFilters};
use crate::services::lifecycle::{self, TransitionActor, TransitionResult};
use crate::AppState;

/// POST /api/v1/jobs: post a job (company).
pub async fn create(
    State(state): State<AppState>,
    RequireCompany(company): RequireCompany,
    Json(body): Json<CreateJob>,
) -> Result<Json<ApiResponse<Job>>, AppError> {
    let job = job_service::create(&state.db, company.id, &body).await?;
    Ok(ApiResponse::success(job))
}

/// GET /api/v1/jobs: browse jobs (open by default).
pub async fn list(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(pagination): Query<Pagination>,
    Query(filters): Query<JobFilters>,
) -> Result<Json<ApiResponse<PagedResult<JobSummary>>>, AppError> {
    let result = job_service::list(&state.db, &filters, &pagination).await?;
    Ok(ApiResponse::success(result))
}

/// GET /api/v1/jobs/mine: jobs posted by (company) or assigned to (worker) the caller.
pub async fn mine(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(pagination): Query<Pagination>,
) -> Result<Json<ApiResponse<PagedResult<JobSummary>>>, AppError> {
    let result = job_service::list_for_party(&state.db, user.id, user.role, &pagination).await?;
    Ok(ApiResponse::success(result))
}

/// GET /api/v1/jobs/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Job>>, AppError> {
    let job = job_service::find_by_id(&state.db, id).await?;
    Ok(ApiResponse::success(job))
}

/// PATCH /api/v1/jobs/{id}/status: move a job through its lifecycle.
pub async fn update_status(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(body): Json<JobStatusUpdate>,
) -> Result<Json<ApiResponse<TransitionResult>>, AppError> {
    let actor = TransitionActor {
        id: user.id,
        role: user.role,
    };
    let result = lifecycle::transition(&state.db, id, body.status, &actor).await?;
    Ok(ApiResponse::success(result))
}
