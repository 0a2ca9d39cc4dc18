//! Role-based access control extractors for Axum handlers.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::errors::AppError;
use crate::middleware::auth::CurrentUser;
use crate::models::user::UserRole;
use crate::AppState;

/// Authenticate, then require `role`.
async fn require_role(
    parts: &mut Parts,
    state: &AppState,
    role: UserRole,
) -> Result<CurrentUser, AppError> {
    let user = CurrentUser::from_request_parts(parts, state).await?;
    if user.role != role {
        return Err(AppError::Forbidden(format!("{role:?} access required")));
    }
    Ok(user)
}

/// Extractor that requires the worker role.
#[derive(Debug, Clone)]
pub struct RequireWorker(pub CurrentUser);

impl FromRequestParts<AppState> for RequireWorker {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_role(parts, state, UserRole::Worker)
            .await
            .map(RequireWorker)
    }
}

/// Extractor that requires the company role.
#[derive(Debug, Clone)]
pub struct RequireCompany(pub CurrentUser);

impl FromRequestParts<AppState> for RequireCompany {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_role(parts, state, UserRole::Company)
            .await
            .map(RequireCompany)
    }
}

/// Extractor that requires the admin role.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_role(parts, state, UserRole::Admin)
            .await
            .map(RequireAdmin)
    }
}
