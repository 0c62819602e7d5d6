//! Validation and normalization applied to every record before it is stored.

use crate::errors::AppError;
use crate::models::analytics::{EventRecord, PageViewRecord, SessionRecord};

const MAX_PATH_LEN: usize = 2048;
const MAX_TEXT_LEN: usize = 1024;

fn require_session_id(session_id: &str) -> Result<(), AppError> {
    if session_id.trim().is_empty() {
        return Err(AppError::Validation("session_id must not be empty".into()));
    }
    Ok(())
}

fn require_path(path: &str) -> Result<(), AppError> {
    if path.trim().is_empty() {
        return Err(AppError::Validation("page_path must not be empty".into()));
    }
    if path.len() > MAX_PATH_LEN {
        return Err(AppError::Validation(format!(
            "page_path exceeds {MAX_PATH_LEN} bytes"
        )));
    }
    Ok(())
}

/// Truncates free text on a char boundary so oversized labels do not reject the record.
fn truncate(text: String, max: usize) -> String {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text[..end].to_string()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub fn normalize_session(mut record: SessionRecord) -> Result<SessionRecord, AppError> {
    require_session_id(&record.session_id)?;
    record.user_agent = truncate(record.user_agent, MAX_TEXT_LEN);
    record.referrer = non_empty(record.referrer).map(|r| truncate(r, MAX_PATH_LEN));
    record.utm_source = non_empty(record.utm_source);
    record.utm_medium = non_empty(record.utm_medium);
    record.utm_campaign = non_empty(record.utm_campaign);
    Ok(record)
}

pub fn normalize_page_view(mut record: PageViewRecord) -> Result<PageViewRecord, AppError> {
    require_session_id(&record.session_id)?;
    require_path(&record.path)?;
    if record.duration_seconds < 0 {
        return Err(AppError::Validation(
            "time_on_page must not be negative".into(),
        ));
    }
    record.scroll_depth = record.scroll_depth.clamp(0, 100);
    record.title = truncate(record.title, MAX_TEXT_LEN);
    record.section = non_empty(record.section);
    record.content_id = non_empty(record.content_id);
    Ok(record)
}

pub fn normalize_event(mut record: EventRecord) -> Result<EventRecord, AppError> {
    require_session_id(&record.session_id)?;
    require_path(&record.path)?;
    for (name, value) in [
        ("event_type", &record.event_type),
        ("event_category", &record.category),
        ("event_action", &record.action),
    ] {
        if value.trim().is_empty() {
            return Err(AppError::Validation(format!("{name} must not be empty")));
        }
    }
    if record.value.is_some_and(|v| !v.is_finite()) {
        return Err(AppError::Validation("event_value must be finite".into()));
    }
    record.label = non_empty(record.label).map(|l| truncate(l, MAX_TEXT_LEN));
    record.content_id = non_empty(record.content_id);
    Ok(record)
}

/// Parses a beacon body. Beacons arrive as `text/plain`, so the JSON extractor
/// cannot be used.
pub fn parse_beacon(body: &[u8]) -> Result<PageViewRecord, AppError> {
    let record: PageViewRecord = serde_json::from_slice(body)
        .map_err(|e| AppError::Validation(format!("Invalid page view payload: {e}")))?;
    normalize_page_view(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_view() -> PageViewRecord {
        PageViewRecord {
            session_id: "s1".into(),
            path: "/children".into(),
            title: "Children".into(),
            section: Some("children".into()),
            content_id: Some(String::new()),
            duration_seconds: 30,
            scroll_depth: 140,
        }
    }

    #[test]
    fn test_page_view_scroll_clamped_and_blank_content_dropped() {
        let pv = normalize_page_view(page_view()).unwrap();
        assert_eq!(pv.scroll_depth, 100);
        assert!(pv.content_id.is_none());
    }

    #[test]
    fn test_negative_duration_rejected() {
        let mut pv = page_view();
        pv.duration_seconds = -1;
        assert!(matches!(normalize_page_view(pv), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_blank_session_rejected() {
        let mut pv = page_view();
        pv.session_id = "  ".into();
        assert!(normalize_page_view(pv).is_err());
    }

    #[test]
    fn test_parse_beacon_accepts_tracker_payload() {
        let body = serde_json::to_vec(&page_view()).unwrap();
        let pv = parse_beacon(&body).unwrap();
        assert_eq!(pv.path, "/children");
    }

    #[test]
    fn test_parse_beacon_rejects_garbage() {
        assert!(matches!(
            parse_beacon(b"not json"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_event_requires_action_and_finite_value() {
        let event = EventRecord {
            session_id: "s1".into(),
            event_type: "game".into(),
            category: "engagement".into(),
            action: "".into(),
            label: Some("memory".into()),
            value: Some(3.0),
            path: "/children".into(),
            content_id: None,
        };
        assert!(normalize_event(event.clone()).is_err());

        let nan = EventRecord {
            action: "play".into(),
            value: Some(f64::NAN),
            ..event.clone()
        };
        assert!(normalize_event(nan).is_err());

        let ok = EventRecord {
            action: "play".into(),
            ..event
        };
        assert!(normalize_event(ok).is_ok());
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let s = "é".repeat(10); // 20 bytes
        let t = truncate(s, 5);
        assert_eq!(t, "éé");
    }

    #[test]
    fn test_session_blank_utm_dropped() {
        let record = SessionRecord {
            session_id: "s1".into(),
            user_agent: "ua".into(),
            device_type: "desktop".into(),
            browser: "Chrome".into(),
            os: "Windows".into(),
            referrer: Some("".into()),
            utm_source: Some(" ".into()),
            utm_medium: None,
            utm_campaign: Some("lent".into()),
            first_visit: true,
        };
        let r = normalize_session(record).unwrap();
        assert!(r.referrer.is_none());
        assert!(r.utm_source.is_none());
        assert_eq!(r.utm_campaign.as_deref(), Some("lent"));
    }
}
