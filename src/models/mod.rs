//! Database models and DTOs for all domain entities.

pub mod job;
pub mod job_application;
pub mod pagination;
pub mod review;
pub mod user;
pub mod worker_profile;
