use async_trait::async_trait;
use sqlx::PgPool;

use crate::errors::TrackError;
use crate::models::analytics::{EventRecord, PageViewRecord, SessionRecord};
use crate::tracker::sink::EventSink;

/// Append-only: analytics rows are never updated or deleted.
pub async fn insert_session(pool: &PgPool, record: &SessionRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO analytics_sessions
            (session_id, user_agent, device_type, browser, os, referrer,
             utm_source, utm_medium, utm_campaign, first_visit)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(&record.session_id)
    .bind(&record.user_agent)
    .bind(&record.device_type)
    .bind(&record.browser)
    .bind(&record.os)
    .bind(&record.referrer)
    .bind(&record.utm_source)
    .bind(&record.utm_medium)
    .bind(&record.utm_campaign)
    .bind(record.first_visit)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn insert_page_view(pool: &PgPool, record: &PageViewRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO analytics_page_views
            (session_id, page_path, page_title, section, devotional_id,
             time_on_page, scroll_depth)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(&record.session_id)
    .bind(&record.path)
    .bind(&record.title)
    .bind(&record.section)
    .bind(&record.content_id)
    .bind(record.duration_seconds)
    .bind(record.scroll_depth)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn insert_event(pool: &PgPool, record: &EventRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO analytics_events
            (session_id, event_type, event_category, event_action, event_label,
             event_value, page_path, devotional_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(&record.session_id)
    .bind(&record.event_type)
    .bind(&record.category)
    .bind(&record.action)
    .bind(&record.label)
    .bind(record.value)
    .bind(&record.path)
    .bind(&record.content_id)
    .execute(pool)
    .await?;
    Ok(())
}

/// `EventSink` writing straight to PostgreSQL, for trackers composed server-side.
#[derive(Clone)]
pub struct PgSink {
    pool: PgPool,
}

impl PgSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventSink for PgSink {
    async fn insert_session(&self, record: &SessionRecord) -> Result<(), TrackError> {
        Ok(insert_session(&self.pool, record).await?)
    }

    async fn insert_page_view(&self, record: &PageViewRecord) -> Result<(), TrackError> {
        Ok(insert_page_view(&self.pool, record).await?)
    }

    async fn insert_event(&self, record: &EventRecord) -> Result<(), TrackError> {
        Ok(insert_event(&self.pool, record).await?)
    }
}
