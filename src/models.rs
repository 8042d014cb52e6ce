use axum::Json;
use axum::body::Bytes;
use axum::http::header::COOKIE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use std::collections::HashMap;

use crate::error::ProxyError;

// Cookie names the dashboard stores its access token under
pub const SESSION_COOKIES: [&str; 3] = ["access_token", "accessToken", "auth_token"];

/// One inbound request, reduced to what the proxy needs to forward it.
#[derive(Debug, Clone, Default)]
pub struct ProxyCall {
    pub params: HashMap<String, String>, // path params, e.g. id
    pub query: HashMap<String, String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ProxyCall {
    pub fn new(query: HashMap<String, String>, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            params: HashMap::new(),
            query,
            headers,
            body,
        }
    }

    pub fn with_param(mut self, name: &str, value: impl Into<String>) -> Self {
        self.params.insert(name.to_string(), value.into());
        self
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// First non-empty access token found in the request cookies.
    pub fn session_token(&self) -> Option<&str> {
        self.headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|cookies| cookies.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, value)| SESSION_COOKIES.contains(name) && !value.is_empty())
            .map(|(_, value)| value)
    }

    // Empty or whitespace-only bodies count as absent
    pub fn json_body(&self) -> Result<Option<Value>, ProxyError> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        serde_json::from_slice(&self.body)
            .map(Some)
            .map_err(|e| ProxyError::Validation(format!("Invalid JSON body: {}", e)))
    }
}

/// What one proxy invocation produced.
#[derive(Debug, Clone)]
pub struct ProxyCallOutcome {
    pub succeeded: bool,
    pub upstream_status: Option<StatusCode>, // None when the backend never answered
    pub status: StatusCode,                  // status sent back to the caller
    pub payload: Value,
}

impl IntoResponse for ProxyCallOutcome {
    fn into_response(self) -> Response {
        (self.status, Json(self.payload)).into_response()
    }
}
