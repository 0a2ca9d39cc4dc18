//! Worker profile routes.

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::rbac::RequireWorker;
use crate::models::worker_profile::{UpdateProfile, WorkerProfile};
use crate::services::profile as profile_service;
use crate::AppState;

/// GET /api/v1/profile: the worker's own profile, created on first access.
pub async fn get_own(
    State(state): State<AppState>,
    RequireWorker(worker): RequireWorker,
) -> Result<Json<ApiResponse<WorkerProfile>>, AppError> {
    let profile = profile_service::get_or_create(&state.db, worker.id).await?;
    Ok(ApiResponse::success(profile))
}

/// PUT /api/v1/profile
pub async fn update_own(
    State(state): State<AppState>,
    RequireWorker(worker): RequireWorker,
    Json(body): Json<UpdateProfile>,
) -> Result<Json<ApiResponse<WorkerProfile>>, AppError> {
    let profile = profile_service::update(&state.db, worker.id, &body).await?;
    Ok(ApiResponse::success(profile))
}

/// GET /api/v1/workers/{id}/profile: public view of a worker profile.
pub async fn get_public(
    State(state): State<AppState>,
    Path(worker_id): Path<Uuid>,
) -> Result<Json<ApiResponse<WorkerProfile>>, AppError> {
    let profile = profile_service::find_by_worker(&state.db, worker_id).await?;
    Ok(ApiResponse::success(profile))
}
