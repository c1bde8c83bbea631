//! HTTP plumbing shared by the auth session and the providers.
//!
//! - [`RequestBuilder`] composes a base URL with ordered, percent-encoded query parameters
//! - [`HttpTransport`] is the seam over the network; [`ReqwestTransport`] is the real one
//! - [`HttpFetcher`] turns a transport response into a body or a [`FinvError`]
//! - [`headers`] holds the header sets the provider expects

mod fetcher;
pub mod headers;
mod url;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Client;

use crate::errors::FinvError;

pub use fetcher::HttpFetcher;
pub use url::{QueryParams, RequestBuilder};

/// HTTP method of an outbound request. Only GET is used by the provider.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HttpMethod {
    #[default]
    Get,
}

/// A fully built outbound request.
#[derive(Clone, Debug)]
pub struct HttpRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: HeaderMap,
    /// Connect and read timeout for this request
    pub timeout: Duration,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>, headers: HeaderMap, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            method: HttpMethod::Get,
            headers,
            timeout,
        }
    }
}

/// Raw response as seen by the transport, whatever the status.
#[derive(Clone, Debug, Default)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: String,
}

/// Executes requests against the network.
///
/// Implemented by [`ReqwestTransport`] in production and by scripted mocks in tests.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send the request and return the response regardless of its status.
    ///
    /// Only failures to obtain a response at all (connection, timeout, body read)
    /// are reported as errors.
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, FinvError>;
}

/// [`HttpTransport`] backed by a shared `reqwest` client.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport whose connections time out after `connect_timeout`.
    pub fn new(connect_timeout: Duration) -> Result<Self, FinvError> {
        let client = Client::builder().connect_timeout(connect_timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, FinvError> {
        let builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
        };

        let response = builder
            .headers(request.headers)
            .timeout(request.timeout)
            .send()
            .await?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.text().await?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
