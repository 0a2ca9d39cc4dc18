//! Job lifecycle state machine with party-checked transitions.
//!
//! Validates that status changes follow the allowed graph and that the actor
//! is the party entitled to make them: the assigned worker moves work
//! forward, the owning company signs it off, admins may cancel.

use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::job::{Job, JobStatus};
use crate::models::user::UserRole;

/// Actor performing a transition.
#[derive(Debug, Clone)]
pub struct TransitionActor {
    pub id: Uuid,
    pub role: UserRole,
}

/// Result of a successful transition.
#[derive(Debug, Serialize)]
pub struct TransitionResult {
    pub job_id: Uuid,
    pub previous_status: JobStatus,
    pub new_status: JobStatus,
}

/// Check whether a status transition is valid per the state machine graph.
pub fn is_valid_transition(from: JobStatus, to: JobStatus) -> bool {
    match (from, to) {
        (JobStatus::Open, JobStatus::Assigned)
        | (JobStatus::Assigned, JobStatus::InProgress)
        | (JobStatus::InProgress, JobStatus::Submitted)
        | (JobStatus::Submitted, JobStatus::Completed)
        | (JobStatus::Submitted, JobStatus::RevisionRequested)
        | (JobStatus::RevisionRequested, JobStatus::Submitted) => true,
        (from, JobStatus::Cancelled) => !from.is_terminal(),
        _ => false,
    }
}

/// Whether `actor` is the party allowed to move `job` into `to`.
pub fn may_perform(actor: &TransitionActor, job: &Job, to: JobStatus) -> bool {
    let is_owner = actor.role == UserRole::Company && job.company_id == actor.id;
    let is_assignee = actor.role == UserRole::Worker && job.assigned_worker_id == Some(actor.id);

    match to {
        JobStatus::InProgress | JobStatus::Submitted => is_assignee,
        JobStatus::Completed | JobStatus::RevisionRequested => is_owner,
        JobStatus::Cancelled => is_owner || actor.role == UserRole::Admin,
        // Assignment goes through application acceptance; nothing re-opens a job.
        JobStatus::Open | JobStatus::Assigned => false,
    }
}

/// Validate all preconditions for a transition.
pub fn validate_transition(
    job: &Job,
    to: JobStatus,
    actor: &TransitionActor,
) -> Result<(), AppError> {
    if to == JobStatus::Assigned {
        return Err(AppError::InvalidTransition(
            "Jobs are assigned by accepting an application".to_string(),
        ));
    }

    if !is_valid_transition(job.status, to) {
        return Err(AppError::InvalidTransition(format!(
            "Cannot transition from {:?} to {to:?}",
            job.status
        )));
    }

    if !may_perform(actor, job, to) {
        return Err(AppError::Forbidden(format!(
            "{:?} {} cannot move this job to {to:?}",
            actor.role, actor.id
        )));
    }

    Ok(())
}

/// Execute a status transition, stamping `completed_date` on completion.
pub async fn transition(
    pool: &PgPool,
    job_id: Uuid,
    to: JobStatus,
    actor: &TransitionActor,
) -> Result<TransitionResult, AppError> {
    let mut tx = pool.begin().await?;

    let job = sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = $1 FOR UPDATE")
        .bind(job_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("job {job_id}")))?;

    validate_transition(&job, to, actor)?;

    sqlx::query(
        r#"
        UPDATE jobs SET
            status = $2,
            completed_date = CASE WHEN $2 = 'completed'::job_status THEN NOW() ELSE completed_date END,
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(job_id)
    .bind(to)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(
        job_id = %job_id,
        actor_id = %actor.id,
        from = ?job.status,
        to = ?to,
        "Job status changed"
    );

    Ok(TransitionResult {
        job_id,
        previous_status: job.status,
        new_status: to,
    })
}
