//! Analytics records as they travel from the tracker to the ingest service.
//!
//! Field names on the wire match the database columns (`page_path`,
//! `devotional_id`, `time_on_page`, ...) so beacon payloads map 1:1 onto rows.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: String,
    pub user_agent: String,
    pub device_type: String,
    pub browser: String,
    pub os: String,
    pub referrer: Option<String>,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub first_visit: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageViewRecord {
    pub session_id: String,
    #[serde(rename = "page_path")]
    pub path: String,
    #[serde(rename = "page_title")]
    pub title: String,
    #[serde(default)]
    pub section: Option<String>,
    #[serde(rename = "devotional_id", default)]
    pub content_id: Option<String>,
    #[serde(rename = "time_on_page")]
    pub duration_seconds: i64,
    pub scroll_depth: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub session_id: String,
    pub event_type: String,
    #[serde(rename = "event_category")]
    pub category: String,
    #[serde(rename = "event_action")]
    pub action: String,
    #[serde(rename = "event_label", default)]
    pub label: Option<String>,
    #[serde(rename = "event_value", default)]
    pub value: Option<f64>,
    #[serde(rename = "page_path")]
    pub path: String,
    #[serde(rename = "devotional_id", default)]
    pub content_id: Option<String>,
}
