use std::sync::Arc;
use std::time::Duration;

use reqwest::header::HeaderMap;
use tracing::{debug, warn};

use super::{HttpRequest, HttpTransport};
use crate::errors::FinvError;

/// Performs a single GET and returns the body only for a 200 response.
#[derive(Clone)]
pub struct HttpFetcher {
    transport: Arc<dyn HttpTransport>,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(transport: Arc<dyn HttpTransport>, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    /// Fetch `url` with `headers`.
    ///
    /// Any status other than 200 becomes [`FinvError::Status`]; the body of such
    /// a response is discarded.
    pub async fn fetch(&self, url: &str, headers: HeaderMap) -> Result<String, FinvError> {
        debug!("GET {}", url);

        let response = self
            .transport
            .execute(HttpRequest::get(url, headers, self.timeout))
            .await
            .inspect_err(|e| warn!("Request to {} failed: {}", url, e))?;

        if response.status != 200 {
            warn!("Request to {} returned status {}", url, response.status);
            return Err(FinvError::Status {
                status: response.status,
                url: url.to_string(),
            });
        }

        Ok(response.body)
    }
}
