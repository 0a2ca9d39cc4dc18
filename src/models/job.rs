//! Job postings and their lifecycle status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "job_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Open,
    Assigned,
    InProgress,
    Submitted,
    RevisionRequested,
    Completed,
    Cancelled,
}

impl JobStatus {
    /// Work is underway: a worker holds the job and it is not finished.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            Self::Assigned | Self::InProgress | Self::Submitted | Self::RevisionRequested
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Job {
    pub id: Uuid,
    pub company_id: Uuid,
    pub title: String,
    pub description: String,
    pub salary: f64,
    pub status: JobStatus,
    pub assigned_worker_id: Option<Uuid>,
    pub deadline: Option<DateTime<Utc>>,
    pub assigned_date: Option<DateTime<Utc>>,
    pub completed_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Lightweight job row for list views.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobSummary {
    pub id: Uuid,
    pub company_id: Uuid,
    pub company_name: String,
    pub title: String,
    pub salary: f64,
    pub status: JobStatus,
    pub deadline: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateJob {
    #[validate(length(min = 3, max = 200))]
    pub title: String,
    #[validate(length(max = 20000))]
    #[serde(default)]
    pub description: String,
    #[validate(range(exclusive_min = 0.0))]
    pub salary: f64,
    pub deadline: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobStatusUpdate {
    pub status: JobStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&JobStatus::RevisionRequested).unwrap(),
            "\"revision_requested\""
        );
        let parsed: JobStatus = serde_json::from_str("\"in_progress\"").unwrap();
        assert_eq!(parsed, JobStatus::InProgress);
    }

    #[test]
    fn active_and_terminal_are_disjoint() {
        let all = [
            JobStatus::Open,
            JobStatus::Assigned,
            JobStatus::InProgress,
            JobStatus::Submitted,
            JobStatus::RevisionRequested,
            JobStatus::Completed,
            JobStatus::Cancelled,
        ];
        for status in all {
            assert!(!(status.is_active() && status.is_terminal()), "{status:?}");
        }
        assert!(!JobStatus::Open.is_active());
        assert!(JobStatus::Submitted.is_active());
    }

    #[test]
    fn create_job_rejects_non_positive_salary() {
        let job = CreateJob {
            title: "Logo design".to_string(),
            description: String::new(),
            salary: 0.0,
            deadline: None,
        };
        assert!(job.validate().is_err());

        let job = CreateJob { salary: 250.0, ..job };
        assert!(job.validate().is_ok());
    }
}
