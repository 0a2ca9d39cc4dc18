//! Job service: posting, browsing, and per-party listings.

use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;
use crate::models::job::{CreateJob, Job, JobStatus, JobSummary};
use crate::models::pagination::{PagedResult, Pagination};
use crate::models::user::UserRole;

/// Filters for browsing jobs. Without a status filter only open jobs are listed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobFilters {
    pub status: Option<JobStatus>,
    pub search: Option<String>,
    pub min_salary: Option<f64>,
    pub max_salary: Option<f64>,
}

const SUMMARY_COLUMNS: &str = "j.id, j.company_id, u.display_name AS company_name, j.title, \
     j.salary, j.status, j.deadline, j.created_at";

/// Post a new open job on behalf of a company.
pub async fn create(pool: &PgPool, company_id: Uuid, input: &CreateJob) -> Result<Job, AppError> {
    input.validate()?;

    let job = sqlx::query_as::<_, Job>(
        r#"
        INSERT INTO jobs (company_id, title, description, salary, deadline)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(company_id)
    .bind(input.title.trim())
    .bind(&input.description)
    .bind(input.salary)
    .bind(input.deadline)
    .fetch_one(pool)
    .await?;

    tracing::info!(job_id = %job.id, company_id = %company_id, "Job posted");
    Ok(job)
}

/// Find a job by ID.
pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Job, AppError> {
    sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("job {id}")))
}

/// Find a job and require that `company_id` owns it.
pub async fn find_owned(pool: &PgPool, id: Uuid, company_id: Uuid) -> Result<Job, AppError> {
    let job = find_by_id(pool, id).await?;
    if job.company_id != company_id {
        return Err(AppError::Forbidden("Job belongs to another company".to_string()));
    }
    Ok(job)
}

/// Browse jobs with filters and pagination.
pub async fn list(
    pool: &PgPool,
    filters: &JobFilters,
    pagination: &Pagination,
) -> Result<PagedResult<JobSummary>, AppError> {
    if let (Some(min), Some(max)) = (filters.min_salary, filters.max_salary) {
        if min > max {
            return Err(AppError::Validation(
                "min_salary must not exceed max_salary".to_string(),
            ));
        }
    }

    let mut conditions: Vec<String> = vec!["j.status = $1".to_string()];
    let mut param_index = 1u32;

    // Build dynamic WHERE clauses
    if filters.search.is_some() {
        param_index += 1;
        conditions.push(format!(
            "(j.title ILIKE ${param_index} OR j.description ILIKE ${param_index})"
        ));
    }
    if filters.min_salary.is_some() {
        param_index += 1;
        conditions.push(format!("j.salary >= ${param_index}"));
    }
    if filters.max_salary.is_some() {
        param_index += 1;
        conditions.push(format!("j.salary <= ${param_index}"));
    }

    let where_clause = format!("WHERE {}", conditions.join(" AND "));

    let count_sql = format!("SELECT COUNT(*) FROM jobs j {where_clause}");
    let data_sql = format!(
        "SELECT {SUMMARY_COLUMNS} FROM jobs j INNER JOIN users u ON u.id = j.company_id \
         {where_clause} ORDER BY j.created_at DESC LIMIT {} OFFSET {}",
        pagination.limit(),
        pagination.offset(),
    );

    let status = filters.status.unwrap_or(JobStatus::Open);
    let search = filters.search.as_ref().map(|s| format!("%{}%", s.trim()));

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql).bind(status);
    let mut data_query = sqlx::query_as::<_, JobSummary>(&data_sql).bind(status);
    if let Some(ref pattern) = search {
        count_query = count_query.bind(pattern);
        data_query = data_query.bind(pattern);
    }
    if let Some(min) = filters.min_salary {
        count_query = count_query.bind(min);
        data_query = data_query.bind(min);
    }
    if let Some(max) = filters.max_salary {
        count_query = count_query.bind(max);
        data_query = data_query.bind(max);
    }

    let total = count_query.fetch_one(pool).await?;
    let items = data_query.fetch_all(pool).await?;

    Ok(PagedResult::new(items, total, pagination))
}

/// Jobs relevant to the caller: posted by a company, or assigned to a worker.
pub async fn list_for_party(
    pool: &PgPool,
    user_id: Uuid,
    role: UserRole,
    pagination: &Pagination,
) -> Result<PagedResult<JobSummary>, AppError> {
    let column = match role {
        UserRole::Company => "j.company_id",
        UserRole::Worker => "j.assigned_worker_id",
        UserRole::Admin => {
            return Err(AppError::Validation(
                "Admins have no jobs of their own; use GET /jobs".to_string(),
            ))
        }
    };

    let total = sqlx::query_scalar::<_, i64>(&format!(
        "SELECT COUNT(*) FROM jobs j WHERE {column} = $1"
    ))
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    let items = sqlx::query_as::<_, JobSummary>(&format!(
        "SELECT {SUMMARY_COLUMNS} FROM jobs j INNER JOIN users u ON u.id = j.company_id \
         WHERE {column} = $1 ORDER BY j.created_at DESC LIMIT $2 OFFSET $3"
    ))
    .bind(user_id)
    .bind(pagination.limit())
    .bind(pagination.offset())
    .fetch_all(pool)
    .await?;

    Ok(PagedResult::new(items, total, pagination))
}
