//! Main client implementation.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use url::Url;

use crate::api::{ActorsApi, DatasetsApi, KeyValueStoresApi, RunsApi, UsersApi, WebhooksApi};
use crate::error::{Error, Result};
use crate::pipeline::{ApiRequest, ApiResponse, Pipeline, RequestContext};
use crate::retry::{RetryPolicy, with_retry};
use crate::transport::{HttpTransport, Transport};

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.apify.com/v2/";

/// Default web console URL, used for details page links.
pub const DEFAULT_CONSOLE_URL: &str = "https://console.apify.com";

/// Default timeout for requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Platform API client.
///
/// Every request goes through the same path: request steps of the
/// [`Pipeline`], then the [`Transport`], then the response steps, all of it
/// wrapped in [`with_retry`].
///
/// # Example
///
/// ```no_run
/// use runbridge_client::{PlatformClient, RunSource};
///
/// # async fn example() -> runbridge_client::Result<()> {
/// let client = PlatformClient::builder().token("secret").build()?;
///
/// let last = client.runs().last(&RunSource::actor("apify/web-scraper"), None).await?;
/// println!("{} {}", last.id, last.status);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct PlatformClient {
    inner: Arc<ClientInner>,
}

/// Inner client state (shared across clones).
struct ClientInner {
    transport: Arc<dyn Transport>,
    pipeline: Pipeline,
    context: RequestContext,
    retry: RetryPolicy,
    base_url: Url,
    console_url: Url,
}

impl std::fmt::Debug for PlatformClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("console_url", &self.inner.console_url.as_str())
            .field("retry", &self.inner.retry)
            .field("has_token", &self.inner.context.token.is_some())
            .finish()
    }
}

impl PlatformClient {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Get the API base URL (always ends with `/`).
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Get the web console URL.
    pub fn console_url(&self) -> &Url {
        &self.inner.console_url
    }

    /// Retry policy applied to every request.
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.inner.retry
    }

    /// Absolute URL of an API path, without the token.
    pub fn api_url(&self, path: &str) -> Result<Url> {
        self.inner
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(Error::from)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Access the users API.
    pub fn users(&self) -> UsersApi {
        UsersApi::new(self.clone())
    }

    /// Access the runs API.
    pub fn runs(&self) -> RunsApi {
        RunsApi::new(self.clone())
    }

    /// Access the datasets API.
    pub fn datasets(&self) -> DatasetsApi {
        DatasetsApi::new(self.clone())
    }

    /// Access the key-value stores API.
    pub fn key_value_stores(&self) -> KeyValueStoresApi {
        KeyValueStoresApi::new(self.clone())
    }

    /// Access the webhooks API.
    pub fn webhooks(&self) -> WebhooksApi {
        WebhooksApi::new(self.clone())
    }

    /// Access the actors and tasks API.
    pub fn actors(&self) -> ActorsApi {
        ActorsApi::new(self.clone())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Request execution
    // ─────────────────────────────────────────────────────────────────────────

    /// Prepare, send (with retries) and normalize one request.
    pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        let inner = &self.inner;
        let request = inner.pipeline.prepare(request, &inner.context);
        let label = request.label();

        with_retry(&inner.retry, &label, || async {
            let response = inner.transport.send(&request).await?;
            inner.pipeline.finish(response, &request)
        })
        .await
    }

    /// Execute a request and deserialize the unwrapped body.
    pub async fn execute_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let response = self.execute(request).await?;
        Ok(serde_json::from_value(response.json)?)
    }
}

/// Builder for creating a [`PlatformClient`].
pub struct ClientBuilder {
    base_url: Option<String>,
    console_url: Option<String>,
    token: Option<String>,
    timeout: Duration,
    user_agent: Option<String>,
    retry: RetryPolicy,
    pipeline: Pipeline,
    transport: Option<Arc<dyn Transport>>,
}

impl std::fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("base_url", &self.base_url)
            .field("console_url", &self.console_url)
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .field("custom_transport", &self.transport.is_some())
            .finish()
    }
}

impl ClientBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            base_url: None,
            console_url: None,
            token: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
            retry: RetryPolicy::default(),
            pipeline: Pipeline::default(),
            transport: None,
        }
    }

    /// Set the API base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the web console URL.
    pub fn console_url(mut self, url: impl Into<String>) -> Self {
        self.console_url = Some(url.into());
        self
    }

    /// Set the API token.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the API token when present.
    pub fn maybe_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Set the retry policy.
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    /// Replace the request/response pipeline.
    pub fn pipeline(mut self, pipeline: Pipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Use a custom transport instead of the `reqwest` one.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<PlatformClient> {
        let base_url = normalize_base(self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL))?;
        let console_url = Url::parse(self.console_url.as_deref().unwrap_or(DEFAULT_CONSOLE_URL))?;

        if let Some(token) = &self.token
            && token.trim().is_empty()
        {
            return Err(Error::Config("token must not be empty".to_string()));
        }

        let transport = match self.transport {
            Some(transport) => transport,
            None => {
                let mut headers = HeaderMap::new();
                headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

                let user_agent = self
                    .user_agent
                    .unwrap_or_else(|| format!("runbridge/{}", env!("CARGO_PKG_VERSION")));

                let http = reqwest::Client::builder()
                    .default_headers(headers)
                    .user_agent(user_agent)
                    .build()?;
                Arc::new(HttpTransport::new(http, base_url.clone(), self.timeout))
            }
        };

        Ok(PlatformClient {
            inner: Arc::new(ClientInner {
                transport,
                pipeline: self.pipeline,
                context: RequestContext { token: self.token },
                retry: self.retry,
                base_url,
                console_url,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a base URL and make sure it ends with `/` so relative joins work.
fn normalize_base(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw)?;
    if !url.path().ends_with('/') {
        url.set_path(&format!("{}/", url.path()));
    }
    Ok(url)
}
