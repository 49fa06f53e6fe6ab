// crates/aiapp-handlers/src/client.rs
// ============================================================================
// Module: Outbound HTTP Client
// Description: Bounded blocking HTTP exchanges for handlers.
// Purpose: Share one connection pool with timeout, scheme, and size limits.
// Dependencies: aiapp-core, reqwest, url, serde_json
// ============================================================================

//! ## Overview
//! [`HttpClient`] wraps a blocking `reqwest` client and returns
//! [`HttpResponseData`]: status, raw body, a best-effort JSON decode of the
//! body, and flattened response headers. Every exchange enforces the URL
//! policy and the response size limit from [`HttpClientConfig`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::io::Read;
use std::time::Duration;

use aiapp_core::HandlerError;
use reqwest::blocking::Client;
use reqwest::blocking::RequestBuilder;
use reqwest::blocking::Response;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use serde::Deserialize;
use serde_json::Map;
use serde_json::Value;
use url::Url;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Maximum redirects followed per request.
const MAX_REDIRECTS: usize = 5;

/// Configuration for outbound HTTP exchanges.
///
/// # Invariants
/// - `allow_http = false` blocks cleartext `http://` URLs.
/// - `max_response_bytes` is a hard upper bound on response bodies.
/// - If `allowed_hosts` is set, only listed hosts are permitted.
/// - URLs with embedded credentials are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HttpClientConfig {
    /// Allow cleartext HTTP.
    pub allow_http: bool,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Maximum response size allowed, in bytes.
    pub max_response_bytes: usize,
    /// Optional host allowlist.
    pub allowed_hosts: Option<BTreeSet<String>>,
    /// User agent string for outbound requests.
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            allow_http: true,
            timeout_ms: 5_000,
            max_response_bytes: 1024 * 1024,
            allowed_hosts: None,
            user_agent: "aiapp-runtime/0.1".to_string(),
        }
    }
}

// ============================================================================
// SECTION: Response
// ============================================================================

/// Captured HTTP response.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponseData {
    /// HTTP status code.
    pub status_code: u16,
    /// Raw response body decoded as UTF-8 (lossy).
    pub body: String,
    /// JSON-decoded body, or `None` when the body is empty or not JSON.
    pub body_object: Option<Value>,
    /// Response headers; repeated values are joined with `", "`.
    pub headers: BTreeMap<String, String>,
}

impl HttpResponseData {
    /// Returns true for 2xx responses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status_code >= 200 && self.status_code < 300
    }

    /// Renders the handler output document.
    #[must_use]
    pub fn to_output(&self) -> Value {
        let headers: Map<String, Value> = self
            .headers
            .iter()
            .map(|(name, value)| (name.clone(), Value::String(value.clone())))
            .collect();
        let mut output = Map::new();
        output.insert("statusCode".to_string(), Value::from(self.status_code));
        output.insert("body".to_string(), Value::String(self.body.clone()));
        output.insert("bodyObject".to_string(), self.body_object.clone().unwrap_or(Value::Null));
        output.insert("headers".to_string(), Value::Object(headers));
        Value::Object(output)
    }
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// Blocking HTTP client shared by handlers.
///
/// # Invariants
/// - The inner client is built once and reused across requests.
#[derive(Debug, Clone)]
pub struct HttpClient {
    /// Client configuration, including limits and policy.
    config: HttpClientConfig,
    /// Underlying connection-pooling client.
    client: Client,
}

impl HttpClient {
    /// Creates a client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::Internal`] when the HTTP client cannot be built.
    pub fn new(config: HttpClientConfig) -> Result<Self, HandlerError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .redirect(Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|err| HandlerError::Internal(format!("http client build failed: {err}")))?;
        Ok(Self {
            config,
            client,
        })
    }

    /// Returns the client configuration.
    #[must_use]
    pub const fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Sends a GET request with query parameters appended to `url`.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::InvalidInput`] for rejected URLs and
    /// [`HandlerError::Remote`] for transport or size-limit failures.
    pub fn get(
        &self,
        url: &str,
        headers: &BTreeMap<String, String>,
        query: &BTreeMap<String, String>,
    ) -> Result<HttpResponseData, HandlerError> {
        let mut url = self.parse_url(url)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.iter());
        }
        self.send(self.client.get(url.as_str()), headers)
    }

    /// Sends a POST request; JSON content type is assumed unless given.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::InvalidInput`] for rejected URLs and
    /// [`HandlerError::Remote`] for transport or size-limit failures.
    pub fn post(
        &self,
        url: &str,
        headers: &BTreeMap<String, String>,
        body: Option<String>,
    ) -> Result<HttpResponseData, HandlerError> {
        let url = self.parse_url(url)?;
        let mut request = self.client.post(url.as_str());
        if !headers.keys().any(|name| name.eq_ignore_ascii_case(CONTENT_TYPE.as_str())) {
            request = request.header(CONTENT_TYPE, "application/json");
        }
        if let Some(body) = body {
            request = request.body(body);
        }
        self.send(request, headers)
    }

    /// Parses and validates a request URL.
    fn parse_url(&self, raw: &str) -> Result<Url, HandlerError> {
        let url = Url::parse(raw)
            .map_err(|err| HandlerError::InvalidInput(format!("URL 格式错误: {err}")))?;
        validate_url(&url, &self.config)?;
        Ok(url)
    }

    /// Applies headers, sends, and captures the response.
    fn send(
        &self,
        mut request: RequestBuilder,
        headers: &BTreeMap<String, String>,
    ) -> Result<HttpResponseData, HandlerError> {
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }
        let mut response = request
            .send()
            .map_err(|err| HandlerError::Remote(format!("HTTP 请求失败: {err}")))?;
        let status_code = response.status().as_u16();
        let headers = collect_headers(&response);
        let bytes = read_response_limited(&mut response, self.config.max_response_bytes)?;
        let body = String::from_utf8_lossy(&bytes).into_owned();
        let body_object = parse_body(&body);
        Ok(HttpResponseData {
            status_code,
            body,
            body_object,
            headers,
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Validates URL scheme, credentials, and allowlist policy.
fn validate_url(url: &Url, config: &HttpClientConfig) -> Result<(), HandlerError> {
    match url.scheme() {
        "https" => {}
        "http" if config.allow_http => {}
        scheme => {
            return Err(HandlerError::InvalidInput(format!("unsupported url scheme: {scheme}")));
        }
    }
    if !url.username().is_empty() || url.password().is_some() {
        return Err(HandlerError::InvalidInput("url credentials are not allowed".to_string()));
    }
    if let Some(allowlist) = &config.allowed_hosts {
        let host = normalize_host_label(
            url.host_str()
                .ok_or_else(|| HandlerError::InvalidInput("url host required".to_string()))?,
        );
        if !allowlist.iter().any(|entry| normalize_host_label(entry) == host) {
            return Err(HandlerError::InvalidInput(format!("url host not allowed: {host}")));
        }
    }
    Ok(())
}

/// Normalizes host labels for allowlist comparisons.
fn normalize_host_label(host: &str) -> String {
    let trimmed = host.trim_end_matches('.');
    let trimmed =
        trimmed.strip_prefix('[').and_then(|inner| inner.strip_suffix(']')).unwrap_or(trimmed);
    trimmed.to_ascii_lowercase()
}

/// Flattens response headers into a sorted map.
fn collect_headers(response: &Response) -> BTreeMap<String, String> {
    let mut headers: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in response.headers() {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        headers
            .entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    headers
}

/// Decodes a JSON body, returning `None` for empty or non-JSON bodies.
fn parse_body(body: &str) -> Option<Value> {
    if body.trim().is_empty() {
        return None;
    }
    serde_json::from_str(body).ok()
}

/// Reads the response body while enforcing a byte limit.
fn read_response_limited(response: &mut Response, max_bytes: usize) -> Result<Vec<u8>, HandlerError> {
    let expected_len = response.content_length();
    let max_bytes_u64 = u64::try_from(max_bytes)
        .map_err(|_| HandlerError::Internal("response size limit exceeds u64".to_string()))?;
    if let Some(expected) = expected_len
        && expected > max_bytes_u64
    {
        return Err(HandlerError::Remote("http response exceeds size limit".to_string()));
    }
    let mut buf = Vec::new();
    let mut handle = response.take(max_bytes_u64.saturating_add(1));
    handle
        .read_to_end(&mut buf)
        .map_err(|err| HandlerError::Remote(format!("failed to read response: {err}")))?;
    if buf.len() > max_bytes {
        return Err(HandlerError::Remote("http response exceeds size limit".to_string()));
    }
    Ok(buf)
}
