//! Admin moderation routes.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::rbac::RequireAdmin;
use crate::models::user::{SetUserActive, UserResponse, UserRole};
use crate::services::auth as auth_service;
use crate::services::dashboard::{self, WorkerDashboard};
use crate::AppState;

/// PATCH /api/v1/admin/users/{id}/active: activate or deactivate an account.
pub async fn set_active(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<Uuid>,
    Json(body): Json<SetUserActive>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    if id == admin.id && !body.is_active {
        return Err(AppError::Validation(
            "Admins cannot deactivate themselves".to_string(),
        ));
    }
    let user = auth_service::set_active(&state.db, id, body.is_active).await?;
    Ok(ApiResponse::success(UserResponse::from(user)))
}

/// GET /api/v1/admin/workers/{id}/dashboard: any worker's dashboard.
pub async fn worker_dashboard(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(worker_id): Path<Uuid>,
) -> Result<Json<ApiResponse<WorkerDashboard>>, AppError> {
    auth_service::find_user_with_role(&state.db, worker_id, UserRole::Worker).await?;
    let snapshot = dashboard::get_worker_dashboard(&state.db, worker_id, Utc::now()).await?;
    Ok(ApiResponse::success(snapshot))
}
