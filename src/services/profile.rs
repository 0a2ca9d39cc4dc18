//! Worker profile service: lazy creation, updates, and rating aggregates.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;
use crate::models::worker_profile::{UpdateProfile, WorkerProfile};

/// Fetch the worker's profile, creating it from the user row on first access.
///
/// Safe to race: concurrent callers both hit `ON CONFLICT DO NOTHING` and
/// then read the single surviving row.
pub async fn get_or_create(pool: &PgPool, worker_id: Uuid) -> Result<WorkerProfile, AppError> {
    let mut conn = pool.acquire().await?;
    get_or_create_with(&mut conn, worker_id).await
}

/// Same as [`get_or_create`] on an existing connection or transaction.
pub async fn get_or_create_with(
    conn: &mut PgConnection,
    worker_id: Uuid,
) -> Result<WorkerProfile, AppError> {
    sqlx::query(
        r#"
        INSERT INTO worker_profiles (worker_id, display_name)
        SELECT id, display_name FROM users WHERE id = $1 AND role = 'worker'
        ON CONFLICT (worker_id) DO NOTHING
        "#,
    )
    .bind(worker_id)
    .execute(&mut *conn)
    .await?;

    sqlx::query_as::<_, WorkerProfile>("SELECT * FROM worker_profiles WHERE worker_id = $1")
        .bind(worker_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("worker {worker_id}")))
}

/// Find an existing profile without creating one.
pub async fn find_by_worker(pool: &PgPool, worker_id: Uuid) -> Result<WorkerProfile, AppError> {
    sqlx::query_as::<_, WorkerProfile>("SELECT * FROM worker_profiles WHERE worker_id = $1")
        .bind(worker_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("profile for worker {worker_id}")))
}

/// Apply a partial profile update.
pub async fn update(
    pool: &PgPool,
    worker_id: Uuid,
    input: &UpdateProfile,
) -> Result<WorkerProfile, AppError> {
    input.validate()?;

    let mut tx = pool.begin().await?;
    get_or_create_with(&mut *tx, worker_id).await?;

    let skills = input.skills.clone().map(serde_json::Value::from);

    let profile = sqlx::query_as::<_, WorkerProfile>(
        r#"
        UPDATE worker_profiles SET
            display_name = COALESCE($2, display_name),
            bio          = COALESCE($3, bio),
            skills       = COALESCE($4, skills),
            is_available = COALESCE($5, is_available),
            updated_at   = NOW()
        WHERE worker_id = $1
        RETURNING *
        "#,
    )
    .bind(worker_id)
    .bind(&input.display_name)
    .bind(&input.bio)
    .bind(&skills)
    .bind(input.is_available)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(profile)
}

/// Recompute `average_rating` and `review_count` from the reviews table.
///
/// Called inside the review-insert transaction so the profile never lags
/// behind its reviews. The profile row lock serializes concurrent reviews of
/// one worker; the aggregate below then reads every committed review.
pub async fn refresh_rating(conn: &mut PgConnection, worker_id: Uuid) -> Result<(), AppError> {
    get_or_create_with(&mut *conn, worker_id).await?;

    sqlx::query("SELECT id FROM worker_profiles WHERE worker_id = $1 FOR UPDATE")
        .bind(worker_id)
        .execute(&mut *conn)
        .await?;

    sqlx::query(
        r#"
        UPDATE worker_profiles p SET
            average_rating = s.average_rating,
            review_count   = s.review_count,
            updated_at     = NOW()
        FROM (
            SELECT
                COALESCE(AVG(rating)::float8, 0) AS average_rating,
                COUNT(*)::int                   AS review_count
            FROM reviews
            WHERE worker_id = $1
        ) s
        WHERE p.worker_id = $1
        "#,
    )
    .bind(worker_id)
    .execute(&mut *conn)
    .await?;

    Ok(())
}
