use reqwest::{header, Client};
use tokio::runtime::Handle;
use tracing::{debug, warn};

/// Teardown-safe delivery channel for the final page-view record.
///
/// `send` must return without waiting on the network: the caller is usually
/// tearing down and will not be around to observe completion.
pub trait BeaconTransport: Send + Sync {
    /// Queues `body` for delivery to `url`. Returns whether the transport took it.
    fn send(&self, url: &str, body: Vec<u8>) -> bool;
}

/// Hands the request to a detached task on the current tokio runtime.
#[derive(Clone)]
pub struct HttpBeacon {
    client: Client,
}

impl HttpBeacon {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl BeaconTransport for HttpBeacon {
    fn send(&self, url: &str, body: Vec<u8>) -> bool {
        let Ok(handle) = Handle::try_current() else {
            warn!("No async runtime available; dropping beacon to {url}");
            return false;
        };

        let request = self
            .client
            .post(url)
            .header(header::CONTENT_TYPE, "text/plain;charset=UTF-8")
            .body(body);
        let url = url.to_string();
        handle.spawn(async move {
            match request.send().await {
                Ok(resp) if resp.status().is_success() => debug!("Beacon delivered to {url}"),
                Ok(resp) => warn!("Beacon to {url} rejected with status {}", resp.status()),
                Err(e) => warn!("Beacon to {url} failed: {e}"),
            }
        });
        true
    }
}
