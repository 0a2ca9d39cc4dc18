//! Pure reporting arithmetic behind the worker dashboard.
//!
//! Everything here is a function of its inputs and an explicit `now`, so the
//! dashboard service only has to fetch rows and hand them over.

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::job_application::ApplicationStatus;

/// Length of each trend window.
pub const TREND_WINDOW_DAYS: i64 = 30;

/// Calendar months covered by the monthly series, current month included.
pub const MONTHS_IN_SERIES: u32 = 6;

pub const MAX_RECENT_ACTIVITIES: usize = 10;
pub const RECENT_APPLICATIONS_LIMIT: i64 = 5;
pub const RECENT_COMPLETIONS_LIMIT: i64 = 3;
pub const RECENT_REVIEWS_LIMIT: i64 = 3;
pub const MAX_UPCOMING_DEADLINES: i64 = 5;

const SECONDS_PER_DAY: f64 = 86_400.0;

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

// ---------------------------------------------------------------------------
// Trends
// ---------------------------------------------------------------------------

/// Percentage change from `previous` to `current`, rounded to an integer.
///
/// A zero baseline yields 100 when anything happened in the current window
/// and 0 otherwise.
pub fn trend_percent(current: i64, previous: i64) -> i64 {
    if previous > 0 {
        (((current - previous) as f64 / previous as f64) * 100.0).round() as i64
    } else if current > 0 {
        100
    } else {
        0
    }
}

/// Two adjacent, equally long windows ending at `now`:
/// previous = `[previous_start, current_start)`, current = `[current_start, now]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrendWindows {
    pub previous_start: DateTime<Utc>,
    pub current_start: DateTime<Utc>,
    pub now: DateTime<Utc>,
}

impl TrendWindows {
    pub fn ending_at(now: DateTime<Utc>) -> Self {
        let window = Duration::days(TREND_WINDOW_DAYS);
        Self {
            previous_start: now - window - window,
            current_start: now - window,
            now,
        }
    }
}

/// Metric value in the current and previous window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowCounts {
    pub current: i64,
    pub previous: i64,
}

impl WindowCounts {
    pub fn percent(&self) -> i64 {
        trend_percent(self.current, self.previous)
    }
}

// ---------------------------------------------------------------------------
// Monthly series
// ---------------------------------------------------------------------------

/// A calendar month in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MonthKey {
    pub year: i32,
    /// 1-based.
    pub month: u32,
}

impl MonthKey {
    pub fn of(ts: DateTime<Utc>) -> Self {
        Self {
            year: ts.year(),
            month: ts.month(),
        }
    }

    /// The month `months` months before this one.
    pub fn back(self, months: u32) -> Self {
        let index = self.year * 12 + (self.month as i32 - 1) - months as i32;
        Self {
            year: index.div_euclid(12),
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    /// First instant of the month.
    pub fn start(self) -> Option<DateTime<Utc>> {
        Utc.with_ymd_and_hms(self.year, self.month, 1, 0, 0, 0).single()
    }

    pub fn key(self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }

    pub fn label(self) -> &'static str {
        MONTH_LABELS[(self.month as usize - 1) % 12]
    }
}

/// The last `count` months ending with the month of `now`, oldest first.
pub fn series_months(now: DateTime<Utc>, count: u32) -> Vec<MonthKey> {
    let current = MonthKey::of(now);
    (0..count).rev().map(|back| current.back(back)).collect()
}

/// One point of a monthly chart series.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MonthlyPoint<T> {
    pub month: String,
    pub label: &'static str,
    pub value: T,
}

/// Lay sparse `(month, value)` buckets onto a dense month axis; months with
/// no bucket get `T::default()`.
pub fn fill_monthly_series<T: Copy + Default>(
    months: &[MonthKey],
    buckets: &[(MonthKey, T)],
) -> Vec<MonthlyPoint<T>> {
    months
        .iter()
        .map(|month| MonthlyPoint {
            month: month.key(),
            label: month.label(),
            value: buckets
                .iter()
                .find(|(key, _)| key == month)
                .map(|(_, value)| *value)
                .unwrap_or_default(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Deadlines
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DeadlinePriority {
    High,
    Medium,
    Low,
}

/// Whole days until `deadline`, rounded up.
pub fn days_until(deadline: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    ((deadline - now).num_seconds() as f64 / SECONDS_PER_DAY).ceil() as i64
}

/// Only deadlines that exist and have not passed are shown.
pub fn is_upcoming(deadline: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    deadline.is_some_and(|d| d >= now)
}

/// Priority and human label for a deadline `days` away.
pub fn classify_deadline(days: i64) -> (DeadlinePriority, String) {
    match days {
        d if d <= 2 => (DeadlinePriority::High, day_label(d)),
        d if d <= 5 => (DeadlinePriority::Medium, day_label(d)),
        d if d <= 7 => (DeadlinePriority::Low, "1 week".to_string()),
        d => {
            let weeks = (d + 6) / 7;
            (DeadlinePriority::Low, format!("{weeks} weeks"))
        }
    }
}

fn day_label(days: i64) -> String {
    if days == 1 {
        "1 day".to_string()
    } else {
        format!("{days} days")
    }
}

// ---------------------------------------------------------------------------
// Recent activity
// ---------------------------------------------------------------------------

/// One entry of the merged activity feed.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ActivityEvent {
    ApplicationSubmitted {
        application_id: Uuid,
        job_id: Uuid,
        job_title: String,
        status: ApplicationStatus,
        occurred_at: DateTime<Utc>,
    },
    JobCompleted {
        job_id: Uuid,
        job_title: String,
        salary: f64,
        occurred_at: DateTime<Utc>,
    },
    ReviewReceived {
        review_id: Uuid,
        job_id: Uuid,
        company_name: String,
        rating: i32,
        occurred_at: DateTime<Utc>,
    },
}

impl ActivityEvent {
    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            Self::ApplicationSubmitted { occurred_at, .. }
            | Self::JobCompleted { occurred_at, .. }
            | Self::ReviewReceived { occurred_at, .. } => *occurred_at,
        }
    }
}

/// Concatenate independently capped event groups, newest first, keeping at
/// most `limit` events.
pub fn merge_activities<I>(groups: I, limit: usize) -> Vec<ActivityEvent>
where
    I: IntoIterator<Item = Vec<ActivityEvent>>,
{
    let mut events: Vec<ActivityEvent> = groups.into_iter().flatten().collect();
    events.sort_by(|a, b| b.occurred_at().cmp(&a.occurred_at()));
    events.truncate(limit);
    events
}

// ---------------------------------------------------------------------------
// Achievements
// ---------------------------------------------------------------------------

/// Milestone flag, recomputed on every dashboard request.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Achievement {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub unlocked: bool,
}

/// Figures the achievement rules look at.
#[derive(Debug, Clone, Copy, Default)]
pub struct AchievementInputs {
    pub completed_jobs: i64,
    pub average_rating: f64,
    pub review_count: i64,
    pub lifetime_earnings: f64,
}

const RISING_STAR_JOBS: i64 = 5;
const PERFECT_SCORE_RATING: f64 = 5.0;
const PERFECT_SCORE_REVIEWS: i64 = 3;
const CENTURY_CLUB_EARNINGS: f64 = 10_000.0;

pub fn evaluate_achievements(inputs: &AchievementInputs) -> Vec<Achievement> {
    vec![
        Achievement {
            id: "rising_star",
            title: "Rising Star",
            description: "Complete 5 jobs",
            unlocked: inputs.completed_jobs >= RISING_STAR_JOBS,
        },
        Achievement {
            id: "perfect_score",
            title: "Perfect Score",
            description: "Hold a 5.0 rating across at least 3 reviews",
            unlocked: inputs.average_rating >= PERFECT_SCORE_RATING
                && inputs.review_count >= PERFECT_SCORE_REVIEWS,
        },
        Achievement {
            id: "speed_demon",
            title: "Speed Demon",
            description: "Deliver jobs ahead of schedule",
            // No delivery-speed rule exists yet; stays locked.
            unlocked: false,
        },
        Achievement {
            id: "century_club",
            title: "Century Club",
            description: "Earn 10,000 in total",
            unlocked: inputs.lifetime_earnings >= CENTURY_CLUB_EARNINGS,
        },
    ]
}
