//! Remote page fetching.
//!
//! One GET per page, bounded by the fetch timeout. Anything but a 200 with a
//! readable body is a [`FetchError`]; the caller rolls the page counter back.

mod request;

use std::sync::Arc;
use std::time::Duration;

use log::debug;
use reqwest::StatusCode;
use url::Url;

use crate::error_handling::FetchError;
use request::RequestHeaders;

/// Fetches page markup. Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Arc<reqwest::Client>,
    timeout: Duration,
    referer: Option<String>,
}

impl PageFetcher {
    pub fn new(client: Arc<reqwest::Client>, timeout: Duration) -> Self {
        PageFetcher {
            client,
            timeout,
            referer: None,
        }
    }

    /// Sends `referer` (normally the host page) with every request.
    pub fn with_referer(mut self, referer: &Url) -> Self {
        self.referer = Some(referer.to_string());
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// GETs `url` and returns the body of a 200 response.
    ///
    /// Completes exactly once: with the body, a status error, a network error,
    /// or a timeout, whichever comes first.
    pub async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        debug!("Fetching {url}");
        let request = RequestHeaders::apply_to_request_builder(
            self.client.get(url.clone()),
            self.referer.as_deref(),
        );

        let attempt = async {
            let response = request
                .send()
                .await
                .map_err(|e| self.classify(e))?;
            let status = response.status();
            if status != StatusCode::OK {
                return Err(FetchError::Status(status.as_u16()));
            }
            response.text().await.map_err(|e| self.classify(e))
        };

        match tokio::time::timeout(self.timeout, attempt).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(self.timeout)),
        }
    }

    fn classify(&self, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else {
            FetchError::Network(error)
        }
    }
}
