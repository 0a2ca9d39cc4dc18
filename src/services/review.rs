//! Review service: companies rate workers on completed jobs.

use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;
use crate::models::job::{Job, JobStatus};
use crate::models::pagination::{PagedResult, Pagination};
use crate::models::review::{CreateReview, Review};
use crate::services::profile;

/// Review the worker who completed `job_id`.
///
/// The insert and the worker's rating refresh share one transaction.
pub async fn create(
    pool: &PgPool,
    company_id: Uuid,
    job_id: Uuid,
    input: &CreateReview,
) -> Result<Review, AppError> {
    input.validate()?;

    let mut tx = pool.begin().await?;

    let job = sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = $1")
        .bind(job_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("job {job_id}")))?;

    if job.company_id != company_id {
        return Err(AppError::Forbidden("Job belongs to another company".to_string()));
    }
    if job.status != JobStatus::Completed {
        return Err(AppError::Validation(
            "Only completed jobs can be reviewed".to_string(),
        ));
    }
    let worker_id = job
        .assigned_worker_id
        .ok_or_else(|| AppError::Validation("Job has no assigned worker".to_string()))?;

    let review = sqlx::query_as::<_, Review>(
        r#"
        INSERT INTO reviews (worker_id, company_id, job_id, rating, comment)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(worker_id)
    .bind(company_id)
    .bind(job_id)
    .bind(input.rating)
    .bind(&input.comment)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::Conflict("Job has already been reviewed".to_string())
        }
        _ => AppError::Database(e),
    })?;

    profile::refresh_rating(&mut *tx, worker_id).await?;

    tx.commit().await?;

    tracing::info!(review_id = %review.id, worker_id = %worker_id, rating = review.rating, "Review recorded");
    Ok(review)
}

/// Reviews received by a worker, newest first.
pub async fn list_for_worker(
    pool: &PgPool,
    worker_id: Uuid,
    pagination: &Pagination,
) -> Result<PagedResult<Review>, AppError> {
    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM reviews WHERE worker_id = $1")
        .bind(worker_id)
        .fetch_one(pool)
        .await?;

    let items = sqlx::query_as::<_, Review>(
        "SELECT * FROM reviews WHERE worker_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3",
    )
    .bind(worker_id)
    .bind(pagination.limit())
    .bind(pagination.offset())
    .fetch_all(pool)
    .await?;

    Ok(PagedResult::new(items, total, pagination))
}
