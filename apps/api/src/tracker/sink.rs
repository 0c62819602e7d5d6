//! Remote event store seam. The tracker only ever inserts; nothing is read back.

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::errors::TrackError;
use crate::models::analytics::{EventRecord, PageViewRecord, SessionRecord};

/// Insert-only writes to the three analytics collections.
///
/// Carried by the tracker as `Arc<dyn EventSink>`.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn insert_session(&self, record: &SessionRecord) -> Result<(), TrackError>;
    async fn insert_page_view(&self, record: &PageViewRecord) -> Result<(), TrackError>;
    async fn insert_event(&self, record: &EventRecord) -> Result<(), TrackError>;
}

/// Posts records to the ingest service's JSON endpoints.
#[derive(Clone)]
pub struct HttpSink {
    client: Client,
    base_url: String,
}

impl HttpSink {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/analytics/{path}", self.base_url)
    }

    async fn post<T: serde::Serialize + Sync>(&self, path: &str, body: &T) -> Result<(), TrackError> {
        let url = self.endpoint(path);
        let response = self.client.post(&url).json(body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TrackError::Rejected {
                status: status.as_u16(),
            });
        }
        debug!("Delivered analytics record to {url}");
        Ok(())
    }
}

#[async_trait]
impl EventSink for HttpSink {
    async fn insert_session(&self, record: &SessionRecord) -> Result<(), TrackError> {
        self.post("sessions", record).await
    }

    async fn insert_page_view(&self, record: &PageViewRecord) -> Result<(), TrackError> {
        self.post("page-view", record).await
    }

    async fn insert_event(&self, record: &EventRecord) -> Result<(), TrackError> {
        self.post("events", record).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_match_ingest_routes() {
        let sink = HttpSink::new(Client::new(), "https://devotions.example/");
        assert_eq!(
            sink.endpoint("sessions"),
            "https://devotions.example/api/analytics/sessions"
        );
        assert_eq!(
            sink.endpoint("page-view"),
            "https://devotions.example/api/analytics/page-view"
        );
    }
}
