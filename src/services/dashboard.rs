//! Worker dashboard aggregation queries.
//!
//! Every query is scoped to one worker and runs concurrently; the first
//! failure aborts the whole snapshot.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::job::JobStatus;
use crate::models::job_application::ApplicationStatus;
use crate::services::metrics::{
    self, Achievement, AchievementInputs, ActivityEvent, DeadlinePriority, MonthKey, MonthlyPoint,
    TrendWindows, WindowCounts,
};
use crate::services::profile;

/// Full dashboard snapshot for one worker.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerDashboard {
    pub profile: ProfileSummary,
    pub applications: ApplicationCounts,
    pub jobs: JobCounts,
    pub earnings: Earnings,
    pub trends: Trends,
    pub applications_trend: Vec<MonthlyPoint<i64>>,
    pub earnings_trend: Vec<MonthlyPoint<f64>>,
    pub recent_activities: Vec<ActivityEvent>,
    pub upcoming_deadlines: Vec<UpcomingDeadline>,
    pub achievements: Vec<Achievement>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSummary {
    pub worker_id: Uuid,
    pub display_name: String,
    pub average_rating: f64,
    pub review_count: i32,
    pub is_available: bool,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct ApplicationCounts {
    pub total: i64,
    pub pending: i64,
    pub accepted: i64,
}

#[derive(Debug, Serialize)]
pub struct JobCounts {
    pub active: i64,
    pub completed: i64,
}

/// Lifetime earnings: salary summed over every completed job, regardless of date.
#[derive(Debug, Serialize)]
pub struct Earnings {
    pub total: f64,
}

/// 30-day percentage changes.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Trends {
    pub applications: i64,
    pub pending: i64,
    pub active_jobs: i64,
    pub completed_jobs: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingDeadline {
    pub job_id: Uuid,
    pub title: String,
    pub status: JobStatus,
    pub deadline: DateTime<Utc>,
    pub days_left: i64,
    pub priority: DeadlinePriority,
    pub label: String,
}

/// Build the dashboard snapshot for `worker_id` as of `now`.
pub async fn get_worker_dashboard(
    pool: &PgPool,
    worker_id: Uuid,
    now: DateTime<Utc>,
) -> Result<WorkerDashboard, AppError> {
    // Every failure, including a missing worker profile, surfaces as the one
    // aggregation failure category.
    aggregate(pool, worker_id, now).await.map_err(|e| {
        let e = e.into_aggregation();
        tracing::error!(worker_id = %worker_id, error = %e, "Dashboard aggregation failed");
        e
    })
}

async fn aggregate(
    pool: &PgPool,
    worker_id: Uuid,
    now: DateTime<Utc>,
) -> Result<WorkerDashboard, AppError> {
    let windows = TrendWindows::ending_at(now);
    let months = metrics::series_months(now, metrics::MONTHS_IN_SERIES);
    let series_start = months
        .first()
        .and_then(|m| m.start())
        .ok_or_else(|| AppError::Internal("empty month series".to_string()))?;

    let (
        profile,
        applications,
        job_totals,
        application_windows,
        job_windows,
        monthly_applications,
        monthly_earnings,
        recent_applications,
        recent_completions,
        recent_reviews,
        deadlines,
    ) = tokio::try_join!(
        profile::get_or_create(pool, worker_id),
        fetch_application_counts(pool, worker_id),
        fetch_job_totals(pool, worker_id),
        fetch_application_windows(pool, worker_id, &windows),
        fetch_job_windows(pool, worker_id, &windows),
        fetch_monthly_applications(pool, worker_id, series_start),
        fetch_monthly_earnings(pool, worker_id, series_start),
        fetch_recent_applications(pool, worker_id),
        fetch_recent_completions(pool, worker_id),
        fetch_recent_reviews(pool, worker_id),
        fetch_upcoming_deadlines(pool, worker_id, now),
    )?;

    let achievements = metrics::evaluate_achievements(&AchievementInputs {
        completed_jobs: job_totals.completed,
        average_rating: profile.average_rating,
        review_count: i64::from(profile.review_count),
        lifetime_earnings: job_totals.earnings,
    });

    Ok(WorkerDashboard {
        profile: ProfileSummary {
            worker_id: profile.worker_id,
            display_name: profile.display_name,
            average_rating: profile.average_rating,
            review_count: profile.review_count,
            is_available: profile.is_available,
        },
        applications,
        jobs: JobCounts {
            active: job_totals.active,
            completed: job_totals.completed,
        },
        earnings: Earnings {
            total: job_totals.earnings,
        },
        trends: Trends {
            applications: application_windows.applications().percent(),
            pending: application_windows.pending().percent(),
            active_jobs: job_windows.active().percent(),
            completed_jobs: job_windows.completed().percent(),
        },
        applications_trend: metrics::fill_monthly_series(&months, &monthly_applications),
        earnings_trend: metrics::fill_monthly_series(&months, &monthly_earnings),
        recent_activities: metrics::merge_activities(
            [recent_applications, recent_completions, recent_reviews],
            metrics::MAX_RECENT_ACTIVITIES,
        ),
        upcoming_deadlines: to_upcoming(deadlines, now),
        achievements,
    })
}

/// Keep only future deadlines and attach their priority.
fn to_upcoming(rows: Vec<DeadlineRow>, now: DateTime<Utc>) -> Vec<UpcomingDeadline> {
    rows.into_iter()
        .filter_map(|row| {
            let deadline = row.deadline.filter(|d| metrics::is_upcoming(Some(*d), now))?;
            let days_left = metrics::days_until(deadline, now);
            let (priority, label) = metrics::classify_deadline(days_left);
            Some(UpcomingDeadline {
                job_id: row.id,
                title: row.title,
                status: row.status,
                deadline,
                days_left,
                priority,
                label,
            })
        })
        .collect()
}

/// Count the worker's applications, total and by status.
async fn fetch_application_counts(
    pool: &PgPool,
    worker_id: Uuid,
) -> Result<ApplicationCounts, AppError> {
    let row = sqlx::query_as::<_, ApplicationCounts>(
        r#"
        SELECT
            COUNT(*) AS total,
            COALESCE(SUM(CASE WHEN status = 'pending'  THEN 1 ELSE 0 END), 0) AS pending,
            COALESCE(SUM(CASE WHEN status = 'accepted' THEN 1 ELSE 0 END), 0) AS accepted
        FROM job_applications
        WHERE worker_id = $1
        "#,
    )
    .bind(worker_id)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Intermediate row for job counts and lifetime earnings.
#[derive(Debug, sqlx::FromRow)]
struct JobTotalsRow {
    active: i64,
    completed: i64,
    earnings: f64,
}

/// Count active and completed jobs and sum lifetime earnings in one pass.
async fn fetch_job_totals(pool: &PgPool, worker_id: Uuid) -> Result<JobTotalsRow, AppError> {
    let row = sqlx::query_as::<_, JobTotalsRow>(
        r#"
        SELECT
            COALESCE(SUM(CASE WHEN status IN ('assigned', 'in_progress', 'submitted', 'revision_requested')
                              THEN 1 ELSE 0 END), 0) AS active,
            COALESCE(SUM(CASE WHEN status = 'completed' THEN 1 ELSE 0 END), 0) AS completed,
            COALESCE(SUM(CASE WHEN status = 'completed' THEN salary ELSE 0 END), 0)::float8 AS earnings
        FROM jobs
        WHERE assigned_worker_id = $1
        "#,
    )
    .bind(worker_id)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Intermediate row for application trend windows.
#[derive(Debug, sqlx::FromRow)]
struct ApplicationWindowRow {
    applications_current: i64,
    applications_previous: i64,
    pending_current: i64,
    pending_previous: i64,
}

impl ApplicationWindowRow {
    fn applications(&self) -> WindowCounts {
        WindowCounts {
            current: self.applications_current,
            previous: self.applications_previous,
        }
    }

    fn pending(&self) -> WindowCounts {
        WindowCounts {
            current: self.pending_current,
            previous: self.pending_previous,
        }
    }
}

/// Count applications (all, and still pending) created in each trend window.
async fn fetch_application_windows(
    pool: &PgPool,
    worker_id: Uuid,
    windows: &TrendWindows,
) -> Result<ApplicationWindowRow, AppError> {
    // $2 = current window start, $3 = now, $4 = previous window start
    let row = sqlx::query_as::<_, ApplicationWindowRow>(
        r#"
        SELECT
            COALESCE(SUM(CASE WHEN created_at >= $2 THEN 1 ELSE 0 END), 0) AS applications_current,
            COALESCE(SUM(CASE WHEN created_at <  $2 THEN 1 ELSE 0 END), 0) AS applications_previous,
            COALESCE(SUM(CASE WHEN created_at >= $2 AND status = 'pending' THEN 1 ELSE 0 END), 0) AS pending_current,
            COALESCE(SUM(CASE WHEN created_at <  $2 AND status = 'pending' THEN 1 ELSE 0 END), 0) AS pending_previous
        FROM job_applications
        WHERE worker_id = $1
          AND created_at >= $4
          AND created_at <= $3
        "#,
    )
    .bind(worker_id)
    .bind(windows.current_start)
    .bind(windows.now)
    .bind(windows.previous_start)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Intermediate row for job trend windows.
#[derive(Debug, sqlx::FromRow)]
struct JobWindowRow {
    active_current: i64,
    active_previous: i64,
    completed_current: i64,
    completed_previous: i64,
}

impl JobWindowRow {
    fn active(&self) -> WindowCounts {
        WindowCounts {
            current: self.active_current,
            previous: self.active_previous,
        }
    }

    fn completed(&self) -> WindowCounts {
        WindowCounts {
            current: self.completed_current,
            previous: self.completed_previous,
        }
    }
}

/// Count active jobs by assignment date and completed jobs by completion
/// date in each trend window.
async fn fetch_job_windows(
    pool: &PgPool,
    worker_id: Uuid,
    windows: &TrendWindows,
) -> Result<JobWindowRow, AppError> {
    // $2 = current window start, $3 = now, $4 = previous window start
    let row = sqlx::query_as::<_, JobWindowRow>(
        r#"
        SELECT
            COALESCE(SUM(CASE WHEN status IN ('assigned', 'in_progress', 'submitted', 'revision_requested')
                               AND assigned_date >= $2 AND assigned_date <= $3
                              THEN 1 ELSE 0 END), 0) AS active_current,
            COALESCE(SUM(CASE WHEN status IN ('assigned', 'in_progress', 'submitted', 'revision_requested')
                               AND assigned_date >= $4 AND assigned_date < $2
                              THEN 1 ELSE 0 END), 0) AS active_previous,
            COALESCE(SUM(CASE WHEN status = 'completed'
                               AND completed_date >= $2 AND completed_date <= $3
                              THEN 1 ELSE 0 END), 0) AS completed_current,
            COALESCE(SUM(CASE WHEN status = 'completed'
                               AND completed_date >= $4 AND completed_date < $2
                              THEN 1 ELSE 0 END), 0) AS completed_previous
        FROM jobs
        WHERE assigned_worker_id = $1
        "#,
    )
    .bind(worker_id)
    .bind(windows.current_start)
    .bind(windows.now)
    .bind(windows.previous_start)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Intermediate row for a monthly application count.
#[derive(Debug, sqlx::FromRow)]
struct MonthCountRow {
    year: i32,
    month: i32,
    value: i64,
}

/// Intermediate row for a monthly salary sum.
#[derive(Debug, sqlx::FromRow)]
struct MonthSumRow {
    year: i32,
    month: i32,
    value: f64,
}

fn month_key(year: i32, month: i32) -> MonthKey {
    MonthKey {
        year,
        month: month.clamp(1, 12) as u32,
    }
}

/// Applications created per UTC calendar month since `since`.
async fn fetch_monthly_applications(
    pool: &PgPool,
    worker_id: Uuid,
    since: DateTime<Utc>,
) -> Result<Vec<(MonthKey, i64)>, AppError> {
    let rows = sqlx::query_as::<_, MonthCountRow>(
        r#"
        SELECT
            EXTRACT(YEAR  FROM created_at AT TIME ZONE 'UTC')::int AS year,
            EXTRACT(MONTH FROM created_at AT TIME ZONE 'UTC')::int AS month,
            COUNT(*) AS value
        FROM job_applications
        WHERE worker_id = $1 AND created_at >= $2
        GROUP BY 1, 2
        ORDER BY 1, 2
        "#,
    )
    .bind(worker_id)
    .bind(since)
    .fetch_all(pool)
    .await?;
    Ok(rows
        .into_iter()
        .map(|r| (month_key(r.year, r.month), r.value))
        .collect())
}

/// Salary of jobs completed per UTC calendar month since `since`.
async fn fetch_monthly_earnings(
    pool: &PgPool,
    worker_id: Uuid,
    since: DateTime<Utc>,
) -> Result<Vec<(MonthKey, f64)>, AppError> {
    let rows = sqlx::query_as::<_, MonthSumRow>(
        r#"
        SELECT
            EXTRACT(YEAR  FROM completed_date AT TIME ZONE 'UTC')::int AS year,
            EXTRACT(MONTH FROM completed_date AT TIME ZONE 'UTC')::int AS month,
            COALESCE(SUM(salary), 0)::float8 AS value
        FROM jobs
        WHERE assigned_worker_id = $1
          AND status = 'completed'
          AND completed_date >= $2
        GROUP BY 1, 2
        ORDER BY 1, 2
        "#,
    )
    .bind(worker_id)
    .bind(since)
    .fetch_all(pool)
    .await?;
    Ok(rows
        .into_iter()
        .map(|r| (month_key(r.year, r.month), r.value))
        .collect())
}

#[derive(Debug, sqlx::FromRow)]
struct RecentApplicationRow {
    id: Uuid,
    job_id: Uuid,
    job_title: String,
    status: ApplicationStatus,
    created_at: DateTime<Utc>,
}

/// The worker's most recent applications.
async fn fetch_recent_applications(
    pool: &PgPool,
    worker_id: Uuid,
) -> Result<Vec<ActivityEvent>, AppError> {
    let rows = sqlx::query_as::<_, RecentApplicationRow>(
        r#"
        SELECT a.id, a.job_id, j.title AS job_title, a.status, a.created_at
        FROM job_applications a
        INNER JOIN jobs j ON j.id = a.job_id
        WHERE a.worker_id = $1
        ORDER BY a.created_at DESC
        LIMIT $2
        "#,
    )
    .bind(worker_id)
    .bind(metrics::RECENT_APPLICATIONS_LIMIT)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| ActivityEvent::ApplicationSubmitted {
            application_id: r.id,
            job_id: r.job_id,
            job_title: r.job_title,
            status: r.status,
            occurred_at: r.created_at,
        })
        .collect())
}

#[derive(Debug, sqlx::FromRow)]
struct RecentCompletionRow {
    id: Uuid,
    title: String,
    salary: f64,
    completed_date: DateTime<Utc>,
}

/// The worker's most recently completed jobs.
async fn fetch_recent_completions(
    pool: &PgPool,
    worker_id: Uuid,
) -> Result<Vec<ActivityEvent>, AppError> {
    let rows = sqlx::query_as::<_, RecentCompletionRow>(
        r#"
        SELECT id, title, salary, completed_date
        FROM jobs
        WHERE assigned_worker_id = $1
          AND status = 'completed'
          AND completed_date IS NOT NULL
        ORDER BY completed_date DESC
        LIMIT $2
        "#,
    )
    .bind(worker_id)
    .bind(metrics::RECENT_COMPLETIONS_LIMIT)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| ActivityEvent::JobCompleted {
            job_id: r.id,
            job_title: r.title,
            salary: r.salary,
            occurred_at: r.completed_date,
        })
        .collect())
}

#[derive(Debug, sqlx::FromRow)]
struct RecentReviewRow {
    id: Uuid,
    job_id: Uuid,
    company_name: String,
    rating: i32,
    created_at: DateTime<Utc>,
}

/// The worker's most recent reviews, with the reviewing company's name.
async fn fetch_recent_reviews(
    pool: &PgPool,
    worker_id: Uuid,
) -> Result<Vec<ActivityEvent>, AppError> {
    let rows = sqlx::query_as::<_, RecentReviewRow>(
        r#"
        SELECT r.id, r.job_id, u.display_name AS company_name, r.rating, r.created_at
        FROM reviews r
        INNER JOIN users u ON u.id = r.company_id
        WHERE r.worker_id = $1
        ORDER BY r.created_at DESC
        LIMIT $2
        "#,
    )
    .bind(worker_id)
    .bind(metrics::RECENT_REVIEWS_LIMIT)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| ActivityEvent::ReviewReceived {
            review_id: r.id,
            job_id: r.job_id,
            company_name: r.company_name,
            rating: r.rating,
            occurred_at: r.created_at,
        })
        .collect())
}

#[derive(Debug, sqlx::FromRow)]
struct DeadlineRow {
    id: Uuid,
    title: String,
    status: JobStatus,
    deadline: Option<DateTime<Utc>>,
}

/// Nearest future deadlines among the worker's active jobs.
async fn fetch_upcoming_deadlines(
    pool: &PgPool,
    worker_id: Uuid,
    now: DateTime<Utc>,
) -> Result<Vec<DeadlineRow>, AppError> {
    let rows = sqlx::query_as::<_, DeadlineRow>(
        r#"
        SELECT id, title, status, deadline
        FROM jobs
        WHERE assigned_worker_id = $1
          AND status IN ('assigned', 'in_progress', 'submitted', 'revision_requested')
          AND deadline IS NOT NULL
          AND deadline >= $2
        ORDER BY deadline ASC
        LIMIT $3
        "#,
    )
    .bind(worker_id)
    .bind(now)
    .bind(metrics::MAX_UPCOMING_DEADLINES)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
