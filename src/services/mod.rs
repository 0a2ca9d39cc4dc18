//! Business logic services.

pub mod auth;
pub mod dashboard;
pub mod job;
pub mod job_application;
pub mod lifecycle;
pub mod metrics;
pub mod profile;
pub mod review;
