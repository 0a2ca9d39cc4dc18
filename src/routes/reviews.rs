//! Review routes.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::rbac::RequireCompany;
use crate::models::pagination::{PagedResult, Pagination};
use crate::models::review::{CreateReview, Review};
use crate::services::review as review_service;
use crate::AppState;

/// POST /api/v1/jobs/{id}/review: review the worker of a completed job (company).
pub async fn create(
    State(state): State<AppState>,
    RequireCompany(company): RequireCompany,
    Path(job_id): Path<Uuid>,
    Json(body): Json<CreateReview>,
) -> Result<Json<ApiResponse<Review>>, AppError> {
    let review = review_service::create(&state.db, company.id, job_id, &body).await?;
    Ok(ApiResponse::success(review))
}

/// GET /api/v1/workers/{id}/reviews: public review list for a worker.
pub async fn for_worker(
    State(state): State<AppState>,
    Path(worker_id): Path<Uuid>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<ApiResponse<PagedResult<Review>>>, AppError> {
    let result = review_service::list_for_worker(&state.db, worker_id, &pagination).await?;
    Ok(ApiResponse::success(result))
}
