//! HTTP transport seam.
//!
//! The transport executes exactly one prepared request and reports the
//! status and body. Rate limiting, caching, and retries all live above
//! this seam in [`crate::client::WebClient`], which keeps transports
//! trivially mockable in tests.

use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::errors::FetchError;

/// HTTP method supported by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    /// Canonical name, used in cache keys and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// Raw response from a transport call.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// Executes a single prepared HTTP request.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Perform the request. Form fields are sent URL-encoded on POST
    /// and ignored for GET.
    ///
    /// Implementations return `Ok` for any response the server produced
    /// (including error statuses) and `Err` only for transport-level
    /// failures such as timeouts or connection resets.
    async fn execute(
        &self,
        method: Method,
        url: &Url,
        form: Option<&[(String, String)]>,
    ) -> Result<TransportResponse, FetchError>;
}

/// Production transport backed by [`reqwest`].
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with the given user agent and request timeout.
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::transport(format!("failed to build client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(
        &self,
        method: Method,
        url: &Url,
        form: Option<&[(String, String)]>,
    ) -> Result<TransportResponse, FetchError> {
        let request = match method {
            Method::Get => self.client.get(url.clone()),
            Method::Post => {
                let request = self.client.post(url.clone());
                match form {
                    Some(fields) => request.form(fields),
                    None => request,
                }
            }
        };

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::transport(format!("failed to read body: {}", e)))?;

        Ok(TransportResponse { status, body })
    }
}
