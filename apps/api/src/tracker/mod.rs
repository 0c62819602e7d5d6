//! Per-browsing-context analytics: one session, a chain of page views, and
//! free-standing interaction events.
//!
//! A `Tracker` is built once per browsing context by the composing application.
//! Every remote write goes through an [`EventSink`]; the final page view on
//! teardown goes through a [`BeaconTransport`] instead, because the context may
//! be gone before an awaited write could finish.
//!
//! The `async` methods return the delivery result for callers that care.
//! `navigate`/`emit` are the fire-and-forget variants used at the composition
//! root: local state changes synchronously, the write runs detached, and
//! failures are logged and dropped. Without a tokio runtime the state change
//! still happens and the write is dropped with a warning.

pub mod beacon;
pub mod classify;
pub mod events;
pub mod paths;
pub mod scroll;
pub mod session;
pub mod sink;

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::clock::Clock;
use crate::config::TrackerConfig;
use crate::errors::TrackError;
use crate::models::analytics::{EventRecord, PageViewRecord, SessionRecord};
use crate::storage::KeyValueStore;

use self::beacon::BeaconTransport;
use self::events::EventDescriptor;
use self::paths::{content_id_from_path, section_from_path};
use self::scroll::{ScrollDepth, ScrollMetrics};
use self::session::{landing_path, resolve_session, session_record, ClientContext, Session};
use self::sink::EventSink;

/// Collaborators a tracker needs from its environment.
#[derive(Clone)]
pub struct TrackerDeps {
    pub sink: Arc<dyn EventSink>,
    pub beacon: Arc<dyn BeaconTransport>,
    pub clock: Arc<dyn Clock>,
    /// Cleared when the browsing context ends.
    pub session_store: Arc<dyn KeyValueStore>,
    /// Survives across browsing contexts.
    pub local_store: Arc<dyn KeyValueStore>,
}

#[derive(Debug, Clone)]
struct OpenPageView {
    path: String,
    title: String,
    section: Option<String>,
    content_id: Option<String>,
    started_at: DateTime<Utc>,
}

impl OpenPageView {
    fn open(path: &str, title: &str, now: DateTime<Utc>) -> Self {
        Self {
            path: path.to_string(),
            title: title.to_string(),
            section: section_from_path(path).map(|s| s.as_str().to_string()),
            content_id: content_id_from_path(path),
            started_at: now,
        }
    }

    fn close(self, session_id: &str, now: DateTime<Utc>, scroll_depth: i32) -> PageViewRecord {
        PageViewRecord {
            session_id: session_id.to_string(),
            path: self.path,
            title: self.title,
            section: self.section,
            content_id: self.content_id,
            duration_seconds: elapsed_seconds(self.started_at, now),
            scroll_depth,
        }
    }
}

/// Whole seconds between two instants, rounded, never negative.
fn elapsed_seconds(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    let ms = (to - from).num_milliseconds().max(0);
    (ms + 500) / 1000
}

fn beacon_body(record: &PageViewRecord) -> Result<Vec<u8>, TrackError> {
    Ok(serde_json::to_vec(record)?)
}

struct PageState {
    current: Option<OpenPageView>,
    /// Landing path until the first navigation.
    current_path: String,
    scroll: ScrollDepth,
    last_page_view: Option<DateTime<Utc>>,
}

pub struct Tracker {
    deps: TrackerDeps,
    config: TrackerConfig,
    session: Session,
    session_record: SessionRecord,
    state: Mutex<PageState>,
}

impl Tracker {
    /// Resolves the session and reports its start. A failed session-start write
    /// is logged; the tracker is returned either way.
    pub async fn start(config: TrackerConfig, deps: TrackerDeps, client: &ClientContext) -> Self {
        let tracker = Self::new(config, deps, client);
        if let Err(e) = tracker.deps.sink.insert_session(&tracker.session_record).await {
            warn!(
                "Failed to record session start for {}: {e}",
                tracker.session.id
            );
        }
        tracker
    }

    fn new(config: TrackerConfig, deps: TrackerDeps, client: &ClientContext) -> Self {
        let now = deps.clock.now();
        let session = resolve_session(
            &config,
            deps.session_store.as_ref(),
            deps.local_store.as_ref(),
            now,
        );
        let record = session_record(&session, client);
        info!(
            "Analytics session {} ({}, {}, {}, first visit: {})",
            session.id, record.device_type, record.browser, record.os, session.first_visit
        );

        let scroll = ScrollDepth::new(config.scroll_sample_interval);
        Self {
            deps,
            config,
            session,
            session_record: record,
            state: Mutex::new(PageState {
                current: None,
                current_path: landing_path(&client.landing_url),
                scroll,
                last_page_view: None,
            }),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session.id
    }

    pub fn is_first_visit(&self) -> bool {
        self.session.first_visit
    }

    pub fn session_started_at(&self) -> DateTime<Utc> {
        self.session.started_at
    }

    pub fn session_record(&self) -> &SessionRecord {
        &self.session_record
    }

    pub fn current_path(&self) -> String {
        self.lock_state().current_path.clone()
    }

    pub fn last_page_view(&self) -> Option<DateTime<Utc>> {
        self.lock_state().last_page_view
    }

    /// Current scroll depth of the open page view.
    pub fn scroll_depth(&self) -> i32 {
        self.lock_state().scroll.current()
    }

    fn lock_state(&self) -> MutexGuard<'_, PageState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Closes the open page view (if any) and opens one for `path`.
    /// Returns the record to flush for the closed view.
    fn transition(&self, path: &str, title: &str) -> Option<PageViewRecord> {
        let now = self.deps.clock.now();
        let mut state = self.lock_state();
        let depth = state.scroll.current();
        let closed = state
            .current
            .take()
            .map(|open| open.close(&self.session.id, now, depth));

        state.current = Some(OpenPageView::open(path, title, now));
        state.current_path = path.to_string();
        state.scroll.reset();
        state.last_page_view = Some(now);
        closed
    }

    /// Records a navigation: flushes the previous page view and opens a new one.
    ///
    /// Local state advances even when the flush fails.
    pub async fn record_page_view(&self, path: &str, title: &str) -> Result<(), TrackError> {
        match self.transition(path, title) {
            Some(record) => {
                debug!(
                    "Flushing page view {} ({}s, {}%)",
                    record.path, record.duration_seconds, record.scroll_depth
                );
                self.deps.sink.insert_page_view(&record).await
            }
            None => Ok(()),
        }
    }

    fn event_record(&self, event: EventDescriptor) -> EventRecord {
        EventRecord {
            session_id: self.session.id.clone(),
            event_type: event.event_type,
            category: event.category,
            action: event.action,
            label: event.label,
            value: event.value,
            path: self.current_path(),
            content_id: event.content_id,
        }
    }

    /// Writes one event tagged with the session and the current path.
    pub async fn record(&self, event: impl Into<EventDescriptor>) -> Result<(), TrackError> {
        let record = self.event_record(event.into());
        self.deps.sink.insert_event(&record).await
    }

    /// Fire-and-forget [`record_page_view`](Self::record_page_view).
    ///
    /// The page-view transition happens before this returns, so navigation order
    /// is preserved even though the flush completes later.
    /// Returns `None` when no write was started: nothing to flush, or no runtime.
    pub fn navigate(&self, path: &str, title: &str) -> Option<JoinHandle<()>> {
        let record = self.transition(path, title)?;
        let Ok(handle) = Handle::try_current() else {
            warn!("No async runtime available; dropping page view {}", record.path);
            return None;
        };
        let sink = Arc::clone(&self.deps.sink);
        Some(handle.spawn(async move {
            if let Err(e) = sink.insert_page_view(&record).await {
                warn!("Failed to record page view {}: {e}", record.path);
            }
        }))
    }

    /// Fire-and-forget [`record`](Self::record). The path is captured now.
    ///
    /// Returns `None` when no runtime is available and the event was dropped.
    pub fn emit(&self, event: impl Into<EventDescriptor>) -> Option<JoinHandle<()>> {
        let record = self.event_record(event.into());
        let Ok(handle) = Handle::try_current() else {
            warn!(
                "No async runtime available; dropping {} event ({})",
                record.event_type, record.action
            );
            return None;
        };
        let sink = Arc::clone(&self.deps.sink);
        Some(handle.spawn(async move {
            if let Err(e) = sink.insert_event(&record).await {
                warn!(
                    "Failed to record {} event ({}): {e}",
                    record.event_type, record.action
                );
            }
        }))
    }

    /// Feeds one scroll sample into the open page view. Ignored when no page is open.
    pub fn on_scroll(&self, metrics: ScrollMetrics) {
        let Some(percent) = metrics.percent() else {
            return;
        };
        let now = self.deps.clock.now();
        let mut state = self.lock_state();
        if state.current.is_some() {
            state.scroll.observe(percent, now);
        }
    }

    /// Teardown hook for unload/hide. Submits the open page view through the
    /// beacon transport without waiting for delivery.
    ///
    /// Returns whether a record was handed to the transport. Safe to call more
    /// than once; only the first call after a navigation sends anything.
    pub fn teardown(&self) -> bool {
        let record = {
            let now = self.deps.clock.now();
            let mut state = self.lock_state();
            let depth = state.scroll.current();
            match state.current.take() {
                Some(open) => open.close(&self.session.id, now, depth),
                None => return false,
            }
        };

        let body = match beacon_body(&record) {
            Ok(body) => body,
            Err(e) => {
                error!("Failed to encode final page view: {e}");
                return false;
            }
        };

        let url = self.config.beacon_url();
        let queued = self.deps.beacon.send(&url, body);
        if !queued {
            warn!("Beacon transport refused final page view for {}", record.path);
        }
        queued
    }
}
