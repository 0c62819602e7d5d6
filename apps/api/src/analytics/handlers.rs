use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use bytes::Bytes;
use serde::Deserialize;
use tracing::debug;

use crate::analytics::export::{file_name, render_csv};
use crate::analytics::ingest::{normalize_event, normalize_session, parse_beacon};
use crate::analytics::stats::{fetch_daily_stats, summarize, AnalyticsSummary, DateRange};
use crate::errors::AppError;
use crate::models::analytics::{EventRecord, SessionRecord};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub days: Option<u32>,
}

impl RangeQuery {
    fn resolve(&self, state: &AppState) -> Result<DateRange, AppError> {
        let days = self
            .days
            .unwrap_or(state.config.analytics_default_range_days);
        DateRange::ending_on(state.clock.now().date_naive(), days)
    }
}

/// POST /api/analytics/sessions
pub async fn handle_session_start(
    State(state): State<AppState>,
    Json(record): Json<SessionRecord>,
) -> Result<StatusCode, AppError> {
    let record = normalize_session(record)?;
    state.sink.insert_session(&record).await?;
    debug!("Stored session {}", record.session_id);
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/analytics/page-view
///
/// Also the beacon target, so the body is read raw whatever its content type.
pub async fn handle_page_view(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    let record = parse_beacon(&body)?;
    state.sink.insert_page_view(&record).await?;
    debug!(
        "Stored page view {} for session {}",
        record.path, record.session_id
    );
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/analytics/events
pub async fn handle_event(
    State(state): State<AppState>,
    Json(record): Json<EventRecord>,
) -> Result<StatusCode, AppError> {
    let record = normalize_event(record)?;
    state.sink.insert_event(&record).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/analytics/summary?days=N
pub async fn handle_summary(
    State(state): State<AppState>,
    Query(params): Query<RangeQuery>,
) -> Result<Json<AnalyticsSummary>, AppError> {
    let range = params.resolve(&state)?;
    let daily = fetch_daily_stats(&state.db, range).await?;
    Ok(Json(summarize(range, daily)))
}

/// GET /api/analytics/export?days=N
pub async fn handle_export(
    State(state): State<AppState>,
    Query(params): Query<RangeQuery>,
) -> Result<impl IntoResponse, AppError> {
    let range = params.resolve(&state)?;
    let daily = fetch_daily_stats(&state.db, range).await?;
    let disposition = format!("attachment; filename=\"{}\"", file_name(range.end));
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        render_csv(&daily),
    ))
}
