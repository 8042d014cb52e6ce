use axum::http::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, HeaderMap, HeaderValue};
use reqwest::{Client, Url};
use serde_json::{Value, json};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use super::endpoint::{AuthMode, EndpointSpec, ErrorStatus, OnFailure, UpstreamMethod};
use crate::error::ProxyError;
use crate::metrics::{FALLBACK_TOTAL, REQUEST_TOTAL, UPSTREAM_LATENCY};
use crate::models::{ProxyCall, ProxyCallOutcome};

/// Forwards dashboard calls to the backend, one attempt per call.
#[derive(Debug, Clone)]
pub struct ProxyExecutor {
    client: Client,
    base: String,
}

impl ProxyExecutor {
    pub fn new(base: impl Into<String>, timeout: Duration) -> Result<Self, ProxyError> {
        let client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| ProxyError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base: base.into(),
        })
    }

    /// Run one call through auth, validation and the backend, and turn
    /// whatever happened into the response the dashboard gets.
    pub async fn execute(&self, endpoint: &EndpointSpec, call: &ProxyCall) -> ProxyCallOutcome {
        REQUEST_TOTAL.with_label_values(&[endpoint.name]).inc();

        match self.forward(endpoint, call).await {
            Ok((upstream_status, payload)) => ProxyCallOutcome {
                succeeded: true,
                upstream_status,
                // short-circuited calls answer 200
                status: upstream_status.map_or(StatusCode::OK, |_| endpoint.success_status),
                payload,
            },
            Err(err) => recover(endpoint, call, err),
        }
    }

    async fn forward(
        &self,
        endpoint: &EndpointSpec,
        call: &ProxyCall,
    ) -> Result<(Option<StatusCode>, Value), ProxyError> {
        let token = match endpoint.auth {
            AuthMode::RequireSession => Some(call.session_token().ok_or(ProxyError::AuthRequired)?),
            AuthMode::Anonymous | AuthMode::Forward => None,
        };

        if let Some(payload) = endpoint.short_circuit.and_then(|answer| answer(call)) {
            return Ok((None, payload));
        }

        // read routes never look at the inbound body
        let body = match endpoint.method {
            UpstreamMethod::Post => call.json_body()?,
            UpstreamMethod::Get => None,
        };
        if let Some(validate) = endpoint.validate {
            validate(body.as_ref()).map_err(ProxyError::Validation)?;
        }

        let url = self.upstream_url(endpoint, call)?;
        debug!(endpoint = endpoint.name, url = %url, "Forwarding to backend");

        let mut request = match endpoint.method {
            UpstreamMethod::Get => self.client.get(url),
            UpstreamMethod::Post => self.client.post(url),
        }
        .headers(forwarded_headers(endpoint.auth, call));

        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = &body {
            request = request.json(body);
        }

        let started = Instant::now();
        let result = request.send().await;
        UPSTREAM_LATENCY.observe(started.elapsed().as_secs_f64());

        let response = result.map_err(ProxyError::from_reqwest)?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED && endpoint.auth == AuthMode::RequireSession {
            return Err(ProxyError::AuthRejected);
        }
        if !status.is_success() {
            return Err(ProxyError::Upstream(status));
        }

        let payload = response
            .json::<Value>()
            .await
            .map_err(|e| ProxyError::Decode(e.to_string()))?;

        Ok((Some(status), payload))
    }

    fn upstream_url(&self, endpoint: &EndpointSpec, call: &ProxyCall) -> Result<Url, ProxyError> {
        let mut url =
            Url::parse(&self.base).map_err(|e| ProxyError::InvalidUpstream(e.to_string()))?;

        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                ProxyError::InvalidUpstream(format!("{} cannot be a base url", self.base))
            })?;
            segments.pop_if_empty();

            for part in endpoint.upstream.split('/').filter(|p| !p.is_empty()) {
                match part.strip_prefix('{').and_then(|p| p.strip_suffix('}')) {
                    Some(name) => {
                        let value = call.params.get(name).ok_or_else(|| {
                            ProxyError::InvalidUpstream(format!("missing path parameter {}", name))
                        })?;
                        segments.push(value);
                    }
                    None => {
                        segments.push(part);
                    }
                }
            }
        }

        let forwarded: Vec<(&str, &str)> = endpoint
            .forward_query
            .iter()
            .filter_map(|name| call.query_param(name).map(|value| (*name, value)))
            .collect();
        if !forwarded.is_empty() {
            url.query_pairs_mut().extend_pairs(forwarded);
        }

        Ok(url)
    }
}

fn forwarded_headers(auth: AuthMode, call: &ProxyCall) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    if auth == AuthMode::Forward {
        for name in [AUTHORIZATION, COOKIE] {
            if let Some(value) = call.headers.get(&name) {
                headers.insert(name, value.clone());
            }
        }
    }
    headers
}

// Map a failed call onto the endpoint's failure policy
fn recover(endpoint: &EndpointSpec, call: &ProxyCall, err: ProxyError) -> ProxyCallOutcome {
    if let Some(status) = err.client_status() {
        if err.upstream_status().is_some() {
            warn!(endpoint = endpoint.name, error = %err, "Backend rejected credentials");
        } else {
            debug!(endpoint = endpoint.name, error = %err, "Rejected before reaching backend");
        }
        return ProxyCallOutcome {
            succeeded: false,
            upstream_status: err.upstream_status(),
            status,
            payload: json!({ "error": err.to_string() }),
        };
    }

    warn!(endpoint = endpoint.name, error = %err, "Backend call failed");

    match endpoint.on_failure {
        OnFailure::Fallback { status, payload } => {
            FALLBACK_TOTAL.with_label_values(&[endpoint.name]).inc();
            ProxyCallOutcome {
                succeeded: false,
                upstream_status: err.upstream_status(),
                status,
                payload: payload(call),
            }
        }
        OnFailure::Error { message, status } => {
            let status = match status {
                ErrorStatus::Internal => StatusCode::INTERNAL_SERVER_ERROR,
                ErrorStatus::Upstream => err
                    .upstream_status()
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            };
            ProxyCallOutcome {
                succeeded: false,
                upstream_status: err.upstream_status(),
                status,
                payload: json!({
                    "error": message,
                    "details": err.to_string(),
                }),
            }
        }
    }
}
