use chrono::{DateTime, Utc};
use reqwest::Url;
use tracing::warn;
use uuid::Uuid;

use crate::config::TrackerConfig;
use crate::models::analytics::SessionRecord;
use crate::storage::KeyValueStore;
use crate::tracker::classify::classify_user_agent;

/// What the host environment knows about the browsing context at startup.
#[derive(Debug, Clone, Default)]
pub struct ClientContext {
    pub user_agent: String,
    pub referrer: Option<String>,
    /// URL (absolute or path + query) the context was opened with; UTM tags are read from it.
    pub landing_url: String,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub started_at: DateTime<Utc>,
    pub first_visit: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UtmParams {
    pub source: Option<String>,
    pub medium: Option<String>,
    pub campaign: Option<String>,
}

/// Parses an absolute URL, or a path + query relative to the site root.
fn parse_landing(url: &str) -> Option<Url> {
    Url::parse(url)
        .or_else(|_| Url::parse("http://localhost/").and_then(|base| base.join(url)))
        .ok()
}

/// Path part of the landing URL; `/` when it has none or does not parse.
pub fn landing_path(url: &str) -> String {
    parse_landing(url)
        .map(|u| u.path().to_string())
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| "/".to_string())
}

impl UtmParams {
    pub fn from_url(url: &str) -> Self {
        let Some(parsed) = parse_landing(url) else {
            return Self::default();
        };

        let mut utm = Self::default();
        for (key, value) in parsed.query_pairs() {
            if value.is_empty() {
                continue;
            }
            match key.as_ref() {
                "utm_source" => utm.source = Some(value.into_owned()),
                "utm_medium" => utm.medium = Some(value.into_owned()),
                "utm_campaign" => utm.campaign = Some(value.into_owned()),
                _ => {}
            }
        }
        utm
    }
}

/// Reuses the session id in context-scoped storage, or mints and stores a new one.
///
/// Storage failures degrade to an unpersisted session; they never fail startup.
pub fn resolve_session(
    config: &TrackerConfig,
    session_store: &dyn KeyValueStore,
    local_store: &dyn KeyValueStore,
    now: DateTime<Utc>,
) -> Session {
    let existing = session_store
        .get(&config.session_key)
        .unwrap_or_else(|e| {
            warn!("Could not read analytics session id: {e}");
            None
        })
        .filter(|id| !id.trim().is_empty());

    if let Some(id) = existing {
        return Session {
            id,
            started_at: now,
            first_visit: false,
        };
    }

    let id = Uuid::new_v4().to_string();
    if let Err(e) = session_store.set(&config.session_key, &id) {
        warn!("Could not persist analytics session id: {e}");
    }

    let visited_before = match local_store.get(&config.visited_key) {
        Ok(flag) => flag.is_some(),
        Err(e) => {
            warn!("Could not read first-visit flag: {e}");
            false
        }
    };
    if let Err(e) = local_store.set(&config.visited_key, "true") {
        warn!("Could not persist first-visit flag: {e}");
    }

    Session {
        id,
        started_at: now,
        first_visit: !visited_before,
    }
}

pub fn session_record(session: &Session, client: &ClientContext) -> SessionRecord {
    let info = classify_user_agent(&client.user_agent);
    let utm = UtmParams::from_url(&client.landing_url);
    SessionRecord {
        session_id: session.id.clone(),
        user_agent: client.user_agent.clone(),
        device_type: info.device_type.as_str().to_string(),
        browser: info.browser.to_string(),
        os: info.os.to_string(),
        referrer: client.referrer.clone().filter(|r| !r.is_empty()),
        utm_source: utm.source,
        utm_medium: utm.medium,
        utm_campaign: utm.campaign,
        first_visit: session.first_visit,
    }
}
