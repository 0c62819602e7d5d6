//! Daily rollups over the raw analytics tables and the dashboard summary built
//! from them.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::errors::AppError;

pub const MAX_RANGE_DAYS: u32 = 365;
const TOP_DEVOTIONALS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountEntry {
    pub key: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyStats {
    pub date: NaiveDate,
    pub unique_visitors: i64,
    pub total_page_views: i64,
    /// Mean seconds on site per session that day.
    pub avg_session_duration: f64,
    /// Share of sessions with exactly one page view, 0.0..=1.0.
    pub bounce_rate: f64,
    pub devotional_views: Vec<CountEntry>,
    pub game_plays: Vec<CountEntry>,
    pub top_devices: Vec<CountEntry>,
}

impl DailyStats {
    fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            unique_visitors: 0,
            total_page_views: 0,
            avg_session_duration: 0.0,
            bounce_rate: 0.0,
            devotional_views: Vec::new(),
            game_plays: Vec::new(),
            top_devices: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsSummary {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub daily_stats: Vec<DailyStats>,
    pub total_visitors: i64,
    pub total_page_views: i64,
    pub avg_session_duration: i64,
    pub avg_bounce_rate: f64,
    pub top_devotionals: Vec<CountEntry>,
    pub top_games: Vec<CountEntry>,
    pub device_breakdown: Vec<CountEntry>,
}

/// Inclusive date range ending today and reaching `days` back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn ending_on(end: NaiveDate, days: u32) -> Result<Self, AppError> {
        if days == 0 || days > MAX_RANGE_DAYS {
            return Err(AppError::Validation(format!(
                "days must be between 1 and {MAX_RANGE_DAYS}"
            )));
        }
        let start = end
            .checked_sub_days(Days::new(u64::from(days)))
            .ok_or_else(|| AppError::Validation("date range out of bounds".into()))?;
        Ok(Self { start, end })
    }

    /// `[start 00:00, end+1 00:00)` in UTC.
    fn bounds(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        let from = self.start.and_time(NaiveTime::MIN).and_utc();
        let until = self
            .end
            .checked_add_days(Days::new(1))
            .unwrap_or(self.end)
            .and_time(NaiveTime::MIN)
            .and_utc();
        (from, until)
    }
}

#[derive(Debug, FromRow)]
struct DailyBaseRow {
    day: NaiveDate,
    unique_visitors: i64,
    total_page_views: i64,
    avg_session_duration: f64,
    bounce_rate: f64,
}

#[derive(Debug, FromRow)]
struct DailyCountRow {
    day: NaiveDate,
    key: String,
    count: i64,
}

const DAILY_BASE_SQL: &str = r#"
    WITH per_session AS (
        SELECT session_id,
               (created_at AT TIME ZONE 'UTC')::date AS day,
               COUNT(*) AS views,
               SUM(time_on_page) AS seconds
        FROM analytics_page_views
        WHERE created_at >= $1 AND created_at < $2
        GROUP BY session_id, day
    )
    SELECT day,
           COUNT(*)::BIGINT AS unique_visitors,
           SUM(views)::BIGINT AS total_page_views,
           COALESCE(AVG(seconds), 0)::DOUBLE PRECISION AS avg_session_duration,
           (COUNT(*) FILTER (WHERE views = 1))::DOUBLE PRECISION / COUNT(*) AS bounce_rate
    FROM per_session
    GROUP BY day
    ORDER BY day
"#;

const DEVOTIONAL_VIEWS_SQL: &str = r#"
    SELECT (created_at AT TIME ZONE 'UTC')::date AS day,
           devotional_id AS key,
           COUNT(*)::BIGINT AS count
    FROM analytics_page_views
    WHERE devotional_id IS NOT NULL AND created_at >= $1 AND created_at < $2
    GROUP BY day, devotional_id
"#;

const GAME_PLAYS_SQL: &str = r#"
    SELECT (created_at AT TIME ZONE 'UTC')::date AS day,
           event_label AS key,
           COUNT(*)::BIGINT AS count
    FROM analytics_events
    WHERE event_type = 'game' AND event_action = 'play' AND event_label IS NOT NULL
      AND created_at >= $1 AND created_at < $2
    GROUP BY day, event_label
"#;

const DEVICES_SQL: &str = r#"
    SELECT (created_at AT TIME ZONE 'UTC')::date AS day,
           device_type AS key,
           COUNT(*)::BIGINT AS count
    FROM analytics_sessions
    WHERE created_at >= $1 AND created_at < $2
    GROUP BY day, device_type
"#;

async fn fetch_counts(
    pool: &PgPool,
    sql: &str,
    from: DateTime<Utc>,
    until: DateTime<Utc>,
) -> Result<Vec<DailyCountRow>, sqlx::Error> {
    sqlx::query_as::<_, DailyCountRow>(sql)
        .bind(from)
        .bind(until)
        .fetch_all(pool)
        .await
}

/// One `DailyStats` per day in the range that saw any page views or sessions, ascending.
pub async fn fetch_daily_stats(pool: &PgPool, range: DateRange) -> Result<Vec<DailyStats>, AppError> {
    let (from, until) = range.bounds();

    let base = sqlx::query_as::<_, DailyBaseRow>(DAILY_BASE_SQL)
        .bind(from)
        .bind(until)
        .fetch_all(pool)
        .await?;
    let devotionals = fetch_counts(pool, DEVOTIONAL_VIEWS_SQL, from, until).await?;
    let games = fetch_counts(pool, GAME_PLAYS_SQL, from, until).await?;
    let devices = fetch_counts(pool, DEVICES_SQL, from, until).await?;

    let mut days: BTreeMap<NaiveDate, DailyStats> = BTreeMap::new();
    for row in base {
        let day = days.entry(row.day).or_insert_with(|| DailyStats::empty(row.day));
        day.unique_visitors = row.unique_visitors;
        day.total_page_views = row.total_page_views;
        day.avg_session_duration = row.avg_session_duration;
        day.bounce_rate = row.bounce_rate;
    }
    for row in devotionals {
        push_count(&mut days, row, |d| &mut d.devotional_views);
    }
    for row in games {
        push_count(&mut days, row, |d| &mut d.game_plays);
    }
    for row in devices {
        push_count(&mut days, row, |d| &mut d.top_devices);
    }

    Ok(days.into_values().collect())
}

fn push_count(
    days: &mut BTreeMap<NaiveDate, DailyStats>,
    row: DailyCountRow,
    field: impl Fn(&mut DailyStats) -> &mut Vec<CountEntry>,
) {
    let day = days.entry(row.day).or_insert_with(|| DailyStats::empty(row.day));
    field(day).push(CountEntry {
        key: row.key,
        count: row.count,
    });
}

/// Sums `entries` by key, sorted by count descending then key ascending.
fn merge_counts<'a>(entries: impl Iterator<Item = &'a CountEntry>) -> Vec<CountEntry> {
    let mut totals: HashMap<&str, i64> = HashMap::new();
    for entry in entries {
        *totals.entry(entry.key.as_str()).or_insert(0) += entry.count;
    }
    let mut merged: Vec<CountEntry> = totals
        .into_iter()
        .map(|(key, count)| CountEntry {
            key: key.to_string(),
            count,
        })
        .collect();
    merged.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
    merged
}

/// Folds daily rows into the dashboard summary.
///
/// Averages are means of the daily values, not re-weighted by traffic.
pub fn summarize(range: DateRange, daily_stats: Vec<DailyStats>) -> AnalyticsSummary {
    let total_visitors = daily_stats.iter().map(|d| d.unique_visitors).sum();
    let total_page_views = daily_stats.iter().map(|d| d.total_page_views).sum();

    let n = daily_stats.len() as f64;
    let (avg_session_duration, avg_bounce_rate) = if daily_stats.is_empty() {
        (0, 0.0)
    } else {
        let duration = daily_stats.iter().map(|d| d.avg_session_duration).sum::<f64>() / n;
        let bounce = daily_stats.iter().map(|d| d.bounce_rate).sum::<f64>() / n;
        (duration.round() as i64, (bounce * 100.0).round() / 100.0)
    };

    let mut top_devotionals = merge_counts(daily_stats.iter().flat_map(|d| &d.devotional_views));
    top_devotionals.truncate(TOP_DEVOTIONALS);
    let top_games = merge_counts(daily_stats.iter().flat_map(|d| &d.game_plays));
    let device_breakdown = merge_counts(daily_stats.iter().flat_map(|d| &d.top_devices));

    AnalyticsSummary {
        start_date: range.start,
        end_date: range.end,
        daily_stats,
        total_visitors,
        total_page_views,
        avg_session_duration,
        avg_bounce_rate,
        top_devotionals,
        top_games,
        device_breakdown,
    }
}
