//! Worker profile: public summary plus rating aggregates kept in sync by reviews.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WorkerProfile {
    pub id: Uuid,
    pub worker_id: Uuid,
    pub display_name: String,
    pub bio: Option<String>,
    pub skills: serde_json::Value,
    pub average_rating: f64,
    pub review_count: i32,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProfile {
    #[validate(length(min = 1, max = 200))]
    pub display_name: Option<String>,
    #[validate(length(max = 5000))]
    pub bio: Option<String>,
    pub skills: Option<Vec<String>>,
    pub is_available: Option<bool>,
}
