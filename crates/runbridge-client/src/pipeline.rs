//! Request/response normalization.
//!
//! Every outbound request passes through an ordered list of request steps,
//! and every inbound response through an ordered list of response steps.
//! Steps are plain functions so the whole chain can be exercised without a
//! network:
//!
//! ```text
//! request:  attach_token
//! response: unwrap_envelope -> classify_status
//! ```
//!
//! Classification runs after unwrapping but reads the raw `content`, because
//! error bodies do not follow the `{"data": ...}` envelope.

use reqwest::Method;
use reqwest::header::HeaderMap;
use serde_json::Value;

use crate::error::{Error, ErrorResponse, Result};

/// Query parameter carrying the API token.
pub const TOKEN_PARAM: &str = "token";

/// How the response body of a request is shaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyShape {
    /// JSON wrapped as `{"data": ...}`.
    Enveloped,
    /// Anything else (dataset items, record values, HEAD probes).
    Raw,
}

/// Body of an outbound request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Serialized as `application/json`.
    Json(Value),
    /// Sent verbatim with the given content type.
    Bytes {
        content_type: String,
        data: Vec<u8>,
    },
}

/// An outbound request, relative to the client's base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the base URL, without a leading slash.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<RequestBody>,
    pub shape: BodyShape,
}

impl ApiRequest {
    /// Create a request expecting an enveloped JSON response.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into().trim_start_matches('/').to_string(),
            query: Vec::new(),
            body: None,
            shape: BodyShape::Enveloped,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn head(path: impl Into<String>) -> Self {
        Self::new(Method::HEAD, path).raw()
    }

    /// Append a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Append a query parameter when the value is present.
    pub fn query_opt<V: ToString>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(v) => self.query(key, v),
            None => self,
        }
    }

    /// Attach a JSON body.
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    /// Attach a raw body.
    pub fn bytes(mut self, content_type: impl Into<String>, data: Vec<u8>) -> Self {
        self.body = Some(RequestBody::Bytes {
            content_type: content_type.into(),
            data,
        });
        self
    }

    /// Mark the response as not enveloped.
    pub fn raw(mut self) -> Self {
        self.shape = BodyShape::Raw;
        self
    }

    /// Short label for logs, never containing the token.
    pub fn label(&self) -> String {
        format!("{} {}", self.method, self.path)
    }

    /// Value of a query parameter.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// An inbound response as produced by a transport.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: HeaderMap,
    /// Raw body bytes.
    pub content: Vec<u8>,
    /// Parsed body; set by `unwrap_envelope` for enveloped requests.
    pub json: Value,
}

impl ApiResponse {
    /// Create a response with an empty header map.
    pub fn new(status: u16, content: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            content: content.into(),
            json: Value::Null,
        }
    }

    /// Raw body as text (lossy).
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.content).into_owned()
    }

    /// Header value as a string, if present and valid.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Parse the raw content as JSON.
    pub fn parse_content(&self) -> Result<Value> {
        Ok(serde_json::from_slice(&self.content)?)
    }
}

/// Per-invocation values needed by request steps.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub token: Option<String>,
}

/// A request step.
pub type RequestStep = fn(ApiRequest, &RequestContext) -> ApiRequest;

/// A response step.
pub type ResponseStep = fn(ApiResponse, &ApiRequest) -> Result<ApiResponse>;

/// Append the API token to the query string.
pub fn attach_token(mut request: ApiRequest, ctx: &RequestContext) -> ApiRequest {
    if let Some(token) = &ctx.token
        && request.query_value(TOKEN_PARAM).is_none()
    {
        request.query.push((TOKEN_PARAM.to_string(), token.clone()));
    }
    request
}

/// Replace the parsed body with the `data` property of the envelope.
///
/// Bodies that are not an object with a `data` property become `{}`. Raw
/// requests are left untouched.
pub fn unwrap_envelope(mut response: ApiResponse, request: &ApiRequest) -> Result<ApiResponse> {
    if request.shape == BodyShape::Raw {
        return Ok(response);
    }
    let decoded: Option<Value> = serde_json::from_slice(&response.content).ok();
    response.json = match decoded {
        Some(Value::Object(mut map)) if map.contains_key("data") => {
            map.remove("data").unwrap_or_default()
        }
        _ => Value::Object(Default::default()),
    };
    Ok(response)
}

/// Turn non-success statuses into classified errors.
pub fn classify_status(response: ApiResponse, _request: &ApiRequest) -> Result<ApiResponse> {
    let status = response.status;
    if status < 300 {
        return Ok(response);
    }
    if status == 429 {
        return Err(Error::rate_limited());
    }
    let message = error_message(&response.content, status);
    match status {
        500.. => Err(Error::Server { status, message }),
        404 => Err(Error::NotFound(message)),
        _ => Err(Error::Api { status, message }),
    }
}

/// Extract `error.message` from a raw error body, or a generic fallback.
pub fn error_message(content: &[u8], status: u16) -> String {
    match serde_json::from_slice::<ErrorResponse>(content) {
        Ok(body) if !body.error.message.is_empty() => body.error.message,
        _ => format!("request failed with status {}", status),
    }
}

/// Ordered request and response steps.
#[derive(Clone)]
pub struct Pipeline {
    request_steps: Vec<RequestStep>,
    response_steps: Vec<ResponseStep>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("request_steps", &self.request_steps.len())
            .field("response_steps", &self.response_steps.len())
            .finish()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self {
            request_steps: vec![attach_token],
            response_steps: vec![unwrap_envelope, classify_status],
        }
    }
}

impl Pipeline {
    /// A pipeline without any steps.
    pub fn empty() -> Self {
        Self {
            request_steps: Vec::new(),
            response_steps: Vec::new(),
        }
    }

    /// Append a request step.
    pub fn with_request_step(mut self, step: RequestStep) -> Self {
        self.request_steps.push(step);
        self
    }

    /// Append a response step.
    pub fn with_response_step(mut self, step: ResponseStep) -> Self {
        self.response_steps.push(step);
        self
    }

    /// Run all request steps in order.
    pub fn prepare(&self, request: ApiRequest, ctx: &RequestContext) -> ApiRequest {
        self.request_steps
            .iter()
            .fold(request, |req, step| step(req, ctx))
    }

    /// Run all response steps in order, stopping at the first error.
    pub fn finish(&self, response: ApiResponse, request: &ApiRequest) -> Result<ApiResponse> {
        self.response_steps
            .iter()
            .try_fold(response, |resp, step| step(resp, request))
    }
}
