//! Seed script for development: populates a fresh database with sample data.
//!
//! Usage: `cargo run --bin seed`
//!
//! Requires `DATABASE_URL` (reads .env). Creates an admin, a company and a
//! worker whose dashboard has something in every section.

use anyhow::Context;
use chrono::{Duration, Utc};
use gigboard::services::{auth, profile};
use sqlx::PgPool;
use uuid::Uuid;

const SEED_PASSWORD: &str = "Test123!";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let db_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = gigboard::db::create_pool(&db_url, 5).await?;

    // Run migrations first
    gigboard::db::run_migrations(&pool).await?;

    println!("=== gigboard Seed Script ===");

    let admin_id = seed_user(&pool, "admin", "Platform Administrator", "admin").await?;
    let company_id = seed_user(&pool, "acme", "Acme Studio", "company").await?;
    let worker_id = seed_user(&pool, "worker", "Sam Rivera", "worker").await?;
    println!("[done] Users ready (admin {admin_id})");

    seed_jobs(&pool, company_id, worker_id).await?;
    seed_reviews(&pool, company_id, worker_id).await?;

    let mut conn = pool.acquire().await?;
    profile::get_or_create_with(&mut *conn, worker_id).await?;
    profile::refresh_rating(&mut *conn, worker_id).await?;
    println!("[done] Worker profile rating refreshed");

    println!("\n=== Seed complete! ===");
    println!("Logins (password {SEED_PASSWORD}): admin, acme, worker");

    Ok(())
}

/// Insert a user if missing, otherwise reset its password. Returns its id.
async fn seed_user(pool: &PgPool, username: &str, display_name: &str, role: &str) -> anyhow::Result<Uuid> {
    let hash = auth::hash_password(SEED_PASSWORD)?;

    let id: Uuid = sqlx::query_scalar(
        "INSERT INTO users (username, email, password_hash, display_name, role)
         VALUES ($1, $2, $3, $4, $5::user_role)
         ON CONFLICT (username) DO UPDATE SET password_hash = EXCLUDED.password_hash
         RETURNING id",
    )
    .bind(username)
    .bind(format!("{username}@gigboard.local"))
    .bind(&hash)
    .bind(display_name)
    .bind(role)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

async fn seed_jobs(pool: &PgPool, company_id: Uuid, worker_id: Uuid) -> anyhow::Result<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM jobs WHERE company_id = $1")
        .bind(company_id)
        .fetch_one(pool)
        .await?;

    if count > 0 {
        println!("[skip] Jobs already exist ({count})");
        return Ok(());
    }

    let now = Utc::now();
    // (title, salary, status, assigned, deadline offset, assigned days ago, completed days ago)
    let jobs: Vec<(&str, f64, &str, bool, Option<i64>, Option<i64>, Option<i64>)> = vec![
        ("Landing page redesign", 1200.0, "open", false, Some(30), None, None),
        ("Product photo retouching", 300.0, "open", false, Some(10), None, None),
        ("Logo refresh", 450.0, "assigned", true, Some(1), Some(2), None),
        ("Checkout bug bash", 800.0, "in_progress", true, Some(4), Some(10), None),
        ("Quarterly report layout", 650.0, "submitted", true, Some(12), Some(20), None),
        ("API documentation pass", 500.0, "revision_requested", true, Some(40), Some(35), None),
        ("Newsletter template", 250.0, "completed", true, None, Some(20), Some(5)),
        ("Brand guidelines", 900.0, "completed", true, None, Some(70), Some(45)),
        ("Onboarding emails", 350.0, "completed", true, None, Some(130), Some(100)),
        ("Legacy migration", 2000.0, "cancelled", false, None, None, None),
    ];

    for (title, salary, status, assigned, deadline, assigned_ago, completed_ago) in jobs {
        let job_id: Uuid = sqlx::query_scalar(
            "INSERT INTO jobs (company_id, title, description, salary, status, assigned_worker_id,
             deadline, assigned_date, completed_date)
             VALUES ($1, $2, $3, $4, $5::job_status, $6, $7, $8, $9)
             RETURNING id",
        )
        .bind(company_id)
        .bind(title)
        .bind(format!("{title} for Acme Studio"))
        .bind(salary)
        .bind(status)
        .bind(assigned.then_some(worker_id))
        .bind(deadline.map(|d| now + Duration::days(d)))
        .bind(assigned_ago.map(|d| now - Duration::days(d)))
        .bind(completed_ago.map(|d| now - Duration::days(d)))
        .fetch_one(pool)
        .await?;

        // Applications: accepted for assigned jobs, pending on the larger open job.
        let application_status = match (assigned, status) {
            (true, _) => Some("accepted"),
            (false, "open") if salary > 1000.0 => Some("pending"),
            (false, "cancelled") => Some("rejected"),
            _ => None,
        };
        if let Some(app_status) = application_status {
            let applied_at = now - Duration::days(assigned_ago.map_or(3, |d| d + 1));
            sqlx::query(
                "INSERT INTO job_applications (job_id, worker_id, cover_letter, status, created_at, updated_at)
                 VALUES ($1, $2, $3, $4::application_status, $5, $5)",
            )
            .bind(job_id)
            .bind(worker_id)
            .bind("I'd love to take this on.")
            .bind(app_status)
            .bind(applied_at)
            .execute(pool)
            .await?;
        }
    }

    println!("[done] Created 10 sample jobs with applications");
    Ok(())
}

async fn seed_reviews(pool: &PgPool, company_id: Uuid, worker_id: Uuid) -> anyhow::Result<()> {
    let completed: Vec<(Uuid, Option<chrono::DateTime<Utc>>)> = sqlx::query_as(
        "SELECT j.id, j.completed_date FROM jobs j
         LEFT JOIN reviews r ON r.job_id = j.id
         WHERE j.company_id = $1 AND j.assigned_worker_id = $2
           AND j.status = 'completed' AND r.id IS NULL
         ORDER BY j.completed_date",
    )
    .bind(company_id)
    .bind(worker_id)
    .fetch_all(pool)
    .await?;

    if completed.is_empty() {
        println!("[skip] Reviews already exist");
        return Ok(());
    }

    let ratings = [5, 4, 5];
    for ((job_id, completed_date), rating) in completed.iter().zip(ratings) {
        let reviewed_at = completed_date.unwrap_or_else(Utc::now) + Duration::hours(6);
        sqlx::query(
            "INSERT INTO reviews (worker_id, company_id, job_id, rating, comment, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(worker_id)
        .bind(company_id)
        .bind(job_id)
        .bind(rating)
        .bind(format!("{rating}/5, would hire again"))
        .bind(reviewed_at)
        .execute(pool)
        .await?;
    }

    println!("[done] Created {} reviews", completed.len().min(ratings.len()));
    Ok(())
}
