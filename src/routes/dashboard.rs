//! Dashboard routes: the worker's aggregated overview.

use axum::{extract::State, Json};
use chrono::Utc;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::rbac::RequireWorker;
use crate::services::dashboard::{self, WorkerDashboard};
use crate::AppState;

/// GET /api/v1/dashboard/worker: the authenticated worker's dashboard.
pub async fn worker(
    State(state): State<AppState>,
    RequireWorker(worker): RequireWorker,
) -> Result<Json<ApiResponse<WorkerDashboard>>, AppError> {
    let snapshot = dashboard::get_worker_dashboard(&state.db, worker.id, Utc::now()).await?;
    Ok(ApiResponse::success(snapshot))
}
