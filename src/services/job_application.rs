//! Job application service: applying, withdrawing, and company decisions.

use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;
use crate::models::job::{Job, JobStatus};
use crate::models::job_application::{
    ApplicationFilters, ApplicationStatus, ApplicationSummary, CreateApplication, Decision,
    JobApplication,
};
use crate::models::pagination::{PagedResult, Pagination};

const SUMMARY_SELECT: &str = "SELECT a.id, a.job_id, j.title AS job_title, a.worker_id, \
     u.display_name AS worker_name, a.status, a.created_at \
     FROM job_applications a \
     INNER JOIN jobs j ON j.id = a.job_id \
     INNER JOIN users u ON u.id = a.worker_id";

/// Apply to an open job. One application per worker and job.
pub async fn apply(
    pool: &PgPool,
    worker_id: Uuid,
    job_id: Uuid,
    input: &CreateApplication,
) -> Result<JobApplication, AppError> {
    input.validate()?;

    let status = sqlx::query_scalar::<_, JobStatus>("SELECT status FROM jobs WHERE id = $1")
        .bind(job_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("job {job_id}")))?;

    if status != JobStatus::Open {
        return Err(AppError::Validation(format!(
            "Job is not open for applications (status {status:?})"
        )));
    }

    let application = sqlx::query_as::<_, JobApplication>(
        r#"
        INSERT INTO job_applications (job_id, worker_id, cover_letter)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(job_id)
    .bind(worker_id)
    .bind(&input.cover_letter)
    .fetch_one(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::Conflict("Already applied to this job".to_string())
        }
        _ => AppError::Database(e),
    })?;

    tracing::info!(application_id = %application.id, job_id = %job_id, worker_id = %worker_id, "Application submitted");
    Ok(application)
}

/// Withdraw one of the worker's own pending applications.
pub async fn withdraw(
    pool: &PgPool,
    worker_id: Uuid,
    application_id: Uuid,
) -> Result<JobApplication, AppError> {
    let application = find_by_id(pool, application_id).await?;
    if application.worker_id != worker_id {
        return Err(AppError::Forbidden(
            "Application belongs to another worker".to_string(),
        ));
    }
    if application.status != ApplicationStatus::Pending {
        return Err(AppError::InvalidTransition(format!(
            "Only pending applications can be withdrawn (status {:?})",
            application.status
        )));
    }

    set_status(pool, application_id, ApplicationStatus::Withdrawn).await
}

/// Accept or reject a pending application on one of the company's jobs.
///
/// Acceptance assigns the job to the applicant and rejects every other
/// pending application for that job, all in one transaction.
///
/// Locks are taken job first, then application, so concurrent decisions on
/// one job queue on the job row instead of deadlocking.
pub async fn decide(
    pool: &PgPool,
    company_id: Uuid,
    application_id: Uuid,
    decision: Decision,
) -> Result<JobApplication, AppError> {
    let mut tx = pool.begin().await?;

    let job_id = sqlx::query_scalar::<_, Uuid>("SELECT job_id FROM job_applications WHERE id = $1")
        .bind(application_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("application {application_id}")))?;

    let job = sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = $1 FOR UPDATE")
        .bind(job_id)
        .fetch_one(&mut *tx)
        .await?;

    let application = sqlx::query_as::<_, JobApplication>(
        "SELECT * FROM job_applications WHERE id = $1 FOR UPDATE",
    )
    .bind(application_id)
    .fetch_one(&mut *tx)
    .await?;

    if job.company_id != company_id {
        return Err(AppError::Forbidden("Job belongs to another company".to_string()));
    }
    if application.status != ApplicationStatus::Pending {
        return Err(AppError::InvalidTransition(format!(
            "Application already {:?}",
            application.status
        )));
    }

    let new_status = match decision {
        Decision::Reject => ApplicationStatus::Rejected,
        Decision::Accept => {
            if job.status != JobStatus::Open {
                return Err(AppError::InvalidTransition(format!(
                    "Job is no longer open (status {:?})",
                    job.status
                )));
            }

            sqlx::query(
                r#"
                UPDATE jobs SET
                    status = 'assigned',
                    assigned_worker_id = $2,
                    assigned_date = NOW(),
                    updated_at = NOW()
                WHERE id = $1
                "#,
            )
            .bind(job.id)
            .bind(application.worker_id)
            .execute(&mut *tx)
            .await?;

            sqlx::query(
                r#"
                UPDATE job_applications SET status = 'rejected', updated_at = NOW()
                WHERE job_id = $1 AND id <> $2 AND status = 'pending'
                "#,
            )
            .bind(job.id)
            .bind(application.id)
            .execute(&mut *tx)
            .await?;

            ApplicationStatus::Accepted
        }
    };

    let updated = sqlx::query_as::<_, JobApplication>(
        "UPDATE job_applications SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(application.id)
    .bind(new_status)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(
        application_id = %application.id,
        job_id = %job.id,
        decision = ?decision,
        "Application decided"
    );
    Ok(updated)
}

/// Find an application by ID.
pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<JobApplication, AppError> {
    sqlx::query_as::<_, JobApplication>("SELECT * FROM job_applications WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("application {id}")))
}

/// The worker's own applications, newest first.
pub async fn list_for_worker(
    pool: &PgPool,
    worker_id: Uuid,
    filters: &ApplicationFilters,
    pagination: &Pagination,
) -> Result<PagedResult<ApplicationSummary>, AppError> {
    let total = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM job_applications WHERE worker_id = $1 AND ($2::application_status IS NULL OR status = $2)",
    )
    .bind(worker_id)
    .bind(filters.status)
    .fetch_one(pool)
    .await?;

    let items = sqlx::query_as::<_, ApplicationSummary>(&format!(
        "{SUMMARY_SELECT} WHERE a.worker_id = $1 AND ($2::application_status IS NULL OR a.status = $2) \
         ORDER BY a.created_at DESC LIMIT $3 OFFSET $4"
    ))
    .bind(worker_id)
    .bind(filters.status)
    .bind(pagination.limit())
    .bind(pagination.offset())
    .fetch_all(pool)
    .await?;

    Ok(PagedResult::new(items, total, pagination))
}

/// Applications received for one of the company's jobs.
pub async fn list_for_job(
    pool: &PgPool,
    job_id: Uuid,
    pagination: &Pagination,
) -> Result<PagedResult<ApplicationSummary>, AppError> {
    let total = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM job_applications WHERE job_id = $1",
    )
    .bind(job_id)
    .fetch_one(pool)
    .await?;

    let items = sqlx::query_as::<_, ApplicationSummary>(&format!(
        "{SUMMARY_SELECT} WHERE a.job_id = $1 ORDER BY a.created_at ASC LIMIT $2 OFFSET $3"
    ))
    .bind(job_id)
    .bind(pagination.limit())
    .bind(pagination.offset())
    .fetch_all(pool)
    .await?;

    Ok(PagedResult::new(items, total, pagination))
}

async fn set_status(
    pool: &PgPool,
    id: Uuid,
    status: ApplicationStatus,
) -> Result<JobApplication, AppError> {
    let application = sqlx::query_as::<_, JobApplication>(
        "UPDATE job_applications SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(status)
    .fetch_one(pool)
    .await?;
    Ok(application)
}
