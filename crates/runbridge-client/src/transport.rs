//! The request-issuing primitive.
//!
//! A transport sends one already-prepared request and returns whatever the
//! server answered, whatever the status. Classification and retries happen
//! above it, in the client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use url::Url;

use crate::error::{Error, Result};
use crate::pipeline::{ApiRequest, ApiResponse, RequestBody};

/// Sends a single request.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue the request. Non-2xx statuses are returned as responses, not
    /// errors; only transport failures are errors.
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse>;
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl HttpTransport {
    /// Create a transport for the given (normalised) base URL.
    pub fn new(http: reqwest::Client, base_url: Url, timeout: Duration) -> Self {
        Self {
            http,
            base_url,
            timeout,
        }
    }

    /// Absolute URL for a relative API path.
    pub fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(Error::from)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let url = self.url(&request.path)?;
        let mut builder = self
            .http
            .request(request.method.clone(), url)
            .query(&request.query)
            .timeout(self.timeout);

        builder = match &request.body {
            Some(RequestBody::Json(value)) => builder.json(value),
            Some(RequestBody::Bytes { content_type, data }) => builder
                .header(CONTENT_TYPE, content_type.as_str())
                .body(data.clone()),
            None => builder,
        };

        tracing::debug!(request = %request.label(), "Sending request");
        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let content = response.bytes().await?.to_vec();
        tracing::debug!(request = %request.label(), status, bytes = content.len(), "Received response");

        let mut api_response = ApiResponse::new(status, content);
        api_response.headers = headers;
        Ok(api_response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_join() {
        let transport = HttpTransport::new(
            reqwest::Client::new(),
            Url::parse("https://api.example.com/v2/").unwrap(),
            Duration::from_secs(5),
        );
        assert_eq!(
            transport.url("acts/a~b/runs").unwrap().as_str(),
            "https://api.example.com/v2/acts/a~b/runs"
        );
        assert_eq!(
            transport.url("/users/me").unwrap().as_str(),
            "https://api.example.com/v2/users/me"
        );
    }
}
