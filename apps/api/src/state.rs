use std::sync::Arc;

use sqlx::PgPool;

use crate::clock::Clock;
use crate::config::Config;
use crate::tracker::sink::EventSink;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Read side: daily rollups for the dashboard.
    pub db: PgPool,
    /// Write side: every ingested record goes through here. `PgSink` in production.
    pub sink: Arc<dyn EventSink>,
    pub config: Config,
    /// "Today" for dashboard date ranges.
    pub clock: Arc<dyn Clock>,
}
