use axum::http::StatusCode;
use axum::routing::MethodFilter;
use serde_json::Value;

use crate::models::ProxyCall;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamMethod {
    Get,
    Post,
}

impl UpstreamMethod {
    pub fn filter(self) -> MethodFilter {
        match self {
            UpstreamMethod::Get => MethodFilter::GET,
            UpstreamMethod::Post => MethodFilter::POST,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// Nothing is forwarded.
    Anonymous,
    /// Inbound `Authorization` and `Cookie` headers are copied upstream.
    Forward,
    /// An access token cookie is mandatory and sent upstream as a bearer
    /// token. Upstream 401s are propagated instead of falling back.
    RequireSession,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorStatus {
    Internal,
    // backend status when it answered, 500 otherwise
    Upstream,
}

/// What the caller sees when the backend cannot be used.
#[derive(Clone, Copy)]
pub enum OnFailure {
    Fallback {
        status: StatusCode,
        payload: fn(&ProxyCall) -> Value,
    },
    Error {
        message: &'static str,
        status: ErrorStatus,
    },
}

/// Declarative description of one proxied dashboard route.
#[derive(Clone, Copy)]
pub struct EndpointSpec {
    pub name: &'static str,
    pub method: UpstreamMethod,
    /// Path below the upstream base; `{name}` segments come from path params.
    pub upstream: &'static str,
    /// Query parameters carried to the upstream when present.
    pub forward_query: &'static [&'static str],
    pub auth: AuthMode,
    pub success_status: StatusCode,
    /// Answer locally with 200 when this returns a payload.
    pub short_circuit: Option<fn(&ProxyCall) -> Option<Value>>,
    pub validate: Option<fn(Option<&Value>) -> Result<(), String>>,
    pub on_failure: OnFailure,
}
