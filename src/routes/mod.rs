//! Route definitions for the gigboard API.

pub mod admin;
pub mod applications;
pub mod auth;
pub mod dashboard;
pub mod health;
pub mod jobs;
pub mod profile;
pub mod reviews;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, patch, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::AppState;

/// Build the full application router with its middleware stack.
pub fn router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/users", post(auth::create_user))
        .route("/auth/me", get(auth::me));

    let job_routes = Router::new()
        .route("/jobs", get(jobs::list).post(jobs::create))
        .route("/jobs/mine", get(jobs::mine))
        .route("/jobs/{id}", get(jobs::get_by_id))
        .route("/jobs/{id}/status", patch(jobs::update_status))
        .route(
            "/jobs/{id}/applications",
            get(applications::for_job).post(applications::apply),
        )
        .route("/jobs/{id}/review", post(reviews::create));

    let application_routes = Router::new()
        .route("/applications/mine", get(applications::mine))
        .route("/applications/{id}/withdraw", post(applications::withdraw))
        .route("/applications/{id}/decision", post(applications::decide));

    let worker_routes = Router::new()
        .route("/profile", get(profile::get_own).put(profile::update_own))
        .route("/workers/{id}/profile", get(profile::get_public))
        .route("/workers/{id}/reviews", get(reviews::for_worker))
        .route("/dashboard/worker", get(dashboard::worker));

    let admin_routes = Router::new()
        .route("/admin/users/{id}/active", patch(admin::set_active))
        .route("/admin/workers/{id}/dashboard", get(admin::worker_dashboard));

    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config.frontend_url))
        .layer(CompressionLayer::new())
        .layer(DefaultBodyLimit::max(state.config.max_body_bytes));

    Router::new()
        .route("/health/live", get(health::live))
        .route("/health/ready", get(health::ready))
        .nest(
            "/api/v1",
            auth_routes
                .merge(job_routes)
                .merge(application_routes)
                .merge(worker_routes)
                .merge(admin_routes),
        )
        .layer(middleware)
        .with_state(state)
}

fn cors_layer(frontend_url: &str) -> CorsLayer {
    let origin = match frontend_url.parse::<HeaderValue>() {
        Ok(origin) => AllowOrigin::exact(origin),
        Err(e) => {
            tracing::warn!(frontend_url, error = %e, "Invalid FRONTEND_URL, allowing any origin");
            AllowOrigin::any()
        }
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
