// crates/aiapp-handlers/src/http.rs
// ============================================================================
// Module: HTTP Passthrough Handler
// Description: Handler issuing one GET or POST request per execution.
// Purpose: Expose arbitrary HTTP endpoints as applications.
// Dependencies: aiapp-core, crate::client
// ============================================================================

//! ## Overview
//! Input keys: `method` (`GET`/`POST`, required), `url` (required),
//! `headers` (optional map), `params` (optional map, GET only), `body`
//! (optional string, POST only). Output keys: `statusCode`, `body`,
//! `bodyObject`, `headers`. Non-2xx responses are returned, not raised.

// ============================================================================
// SECTION: Imports
// ============================================================================

use aiapp_core::AppHandler;
use aiapp_core::HandlerError;
use serde_json::Map;
use serde_json::Value;

use crate::client::HttpClient;
use crate::client::HttpResponseData;
use crate::params::optional_str;
use crate::params::required_str;
use crate::params::string_map;

// ============================================================================
// SECTION: Request
// ============================================================================

/// Supported HTTP methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// `GET` with query parameters.
    Get,
    /// `POST` with an optional body.
    Post,
}

impl HttpMethod {
    /// Parses a method name case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::InvalidInput`] for anything but GET or POST.
    pub fn parse(raw: &str) -> Result<Self, HandlerError> {
        if raw.eq_ignore_ascii_case("GET") {
            Ok(Self::Get)
        } else if raw.eq_ignore_ascii_case("POST") {
            Ok(Self::Post)
        } else {
            Err(HandlerError::InvalidInput("仅支持 GET 或 POST 方法".to_string()))
        }
    }
}

/// Executes the request described by `params`.
///
/// # Errors
///
/// Returns [`HandlerError`] for invalid input or transport failures.
pub fn send_request(client: &HttpClient, params: &Map<String, Value>) -> Result<HttpResponseData, HandlerError> {
    let method = HttpMethod::parse(required_str(params, "method")?)?;
    let url = required_str(params, "url")?;
    let headers = string_map(params, "headers")?;
    match method {
        HttpMethod::Get => client.get(url, &headers, &string_map(params, "params")?),
        HttpMethod::Post => {
            let body = optional_str(params, "body")?.map(str::to_string);
            client.post(url, &headers, body)
        }
    }
}

// ============================================================================
// SECTION: Handler
// ============================================================================

/// HTTP passthrough handler.
#[derive(Debug, Clone)]
pub struct HttpHandler {
    /// Shared outbound client.
    client: HttpClient,
}

impl HttpHandler {
    /// Creates a handler over a shared client.
    #[must_use]
    pub const fn new(client: HttpClient) -> Self {
        Self {
            client,
        }
    }
}

impl AppHandler for HttpHandler {
    fn execute(&self, params: &Map<String, Value>) -> Result<Value, HandlerError> {
        Ok(send_request(&self.client, params)?.to_output())
    }
}
