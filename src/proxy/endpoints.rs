//! Every dashboard route the gateway proxies, with its fallback behavior.
//!
//! Monitoring and search routes degrade to canned "unavailable" payloads so
//! the dashboard renders an empty state instead of an error screen. Mutating
//! routes report the failure.

use axum::http::StatusCode;
use serde_json::{Value, json};

use super::endpoint::{AuthMode, EndpointSpec, ErrorStatus, OnFailure, UpstreamMethod};
use crate::models::ProxyCall;

pub static HEALTH: EndpointSpec = EndpointSpec {
    name: "health",
    method: UpstreamMethod::Get,
    upstream: "health",
    forward_query: &["limit"],
    auth: AuthMode::Anonymous,
    success_status: StatusCode::OK,
    short_circuit: None,
    validate: None,
    on_failure: OnFailure::Fallback {
        status: StatusCode::OK,
        payload: health_down,
    },
};

pub static HEALTH_METRICS: EndpointSpec = EndpointSpec {
    name: "health_metrics",
    method: UpstreamMethod::Get,
    upstream: "health/metrics",
    forward_query: &[],
    auth: AuthMode::Anonymous,
    success_status: StatusCode::OK,
    short_circuit: None,
    validate: None,
    on_failure: OnFailure::Fallback {
        status: StatusCode::OK,
        payload: metrics_zeroed,
    },
};

pub static HEALTH_HISTORY: EndpointSpec = EndpointSpec {
    name: "health_history",
    method: UpstreamMethod::Get,
    upstream: "health/history",
    forward_query: &["limit"],
    auth: AuthMode::Anonymous,
    success_status: StatusCode::OK,
    short_circuit: None,
    validate: None,
    on_failure: OnFailure::Fallback {
        status: StatusCode::OK,
        payload: empty_list,
    },
};

pub static HEALTH_ALERTS: EndpointSpec = EndpointSpec {
    name: "health_alerts",
    method: UpstreamMethod::Get,
    upstream: "health/alerts",
    forward_query: &[],
    auth: AuthMode::Anonymous,
    success_status: StatusCode::OK,
    short_circuit: None,
    validate: None,
    on_failure: OnFailure::Fallback {
        status: StatusCode::OK,
        payload: alerts_unavailable,
    },
};

pub static HEALTH_PING: EndpointSpec = EndpointSpec {
    name: "health_ping",
    method: UpstreamMethod::Get,
    upstream: "health/ping",
    forward_query: &[],
    auth: AuthMode::Anonymous,
    success_status: StatusCode::OK,
    short_circuit: None,
    validate: None,
    on_failure: OnFailure::Fallback {
        status: StatusCode::SERVICE_UNAVAILABLE,
        payload: ping_failed,
    },
};

pub static SEARCH_SUGGESTIONS: EndpointSpec = EndpointSpec {
    name: "search_suggestions",
    method: UpstreamMethod::Get,
    upstream: "search/suggestions",
    forward_query: &["q", "category", "limit"],
    auth: AuthMode::RequireSession,
    success_status: StatusCode::OK,
    short_circuit: Some(blank_search),
    validate: None,
    on_failure: OnFailure::Fallback {
        status: StatusCode::OK,
        payload: no_suggestions,
    },
};

pub static CONTRACTS_LIST: EndpointSpec = EndpointSpec {
    name: "contracts_list",
    method: UpstreamMethod::Get,
    upstream: "contracts",
    forward_query: &["page", "limit", "status", "search"],
    auth: AuthMode::Forward,
    success_status: StatusCode::OK,
    short_circuit: None,
    validate: None,
    on_failure: OnFailure::Error {
        message: "Failed to fetch contracts",
        status: ErrorStatus::Internal,
    },
};

pub static CONTRACTS_CREATE: EndpointSpec = EndpointSpec {
    name: "contracts_create",
    method: UpstreamMethod::Post,
    upstream: "contracts",
    forward_query: &[],
    auth: AuthMode::Forward,
    success_status: StatusCode::CREATED,
    short_circuit: None,
    validate: Some(contract_fields),
    on_failure: OnFailure::Error {
        message: "Failed to create contract",
        status: ErrorStatus::Internal,
    },
};

pub static CONTRACT_GET: EndpointSpec = EndpointSpec {
    name: "contract_get",
    method: UpstreamMethod::Get,
    upstream: "contracts/{id}",
    forward_query: &[],
    auth: AuthMode::Forward,
    success_status: StatusCode::OK,
    short_circuit: None,
    validate: None,
    on_failure: OnFailure::Error {
        message: "Failed to fetch contract",
        status: ErrorStatus::Internal,
    },
};

pub static CONTRACT_SEND: EndpointSpec = EndpointSpec {
    name: "contract_send",
    method: UpstreamMethod::Post,
    upstream: "contracts/{id}/send",
    forward_query: &[],
    auth: AuthMode::Forward,
    success_status: StatusCode::OK,
    short_circuit: None,
    validate: None,
    on_failure: OnFailure::Error {
        message: "Failed to send contract",
        status: ErrorStatus::Internal,
    },
};

pub static CONTRACT_VOID: EndpointSpec = EndpointSpec {
    name: "contract_void",
    method: UpstreamMethod::Post,
    upstream: "contracts/{id}/void",
    forward_query: &[],
    auth: AuthMode::Forward,
    success_status: StatusCode::OK,
    short_circuit: None,
    validate: None,
    on_failure: OnFailure::Error {
        message: "Failed to void contract",
        status: ErrorStatus::Internal,
    },
};

pub static NOTIFICATIONS: EndpointSpec = EndpointSpec {
    name: "notifications",
    method: UpstreamMethod::Get,
    upstream: "notifications",
    forward_query: &["limit", "unread"],
    auth: AuthMode::Forward,
    success_status: StatusCode::OK,
    short_circuit: None,
    validate: None,
    on_failure: OnFailure::Fallback {
        status: StatusCode::OK,
        payload: no_notifications,
    },
};

pub static EMAIL_RESEND: EndpointSpec = EndpointSpec {
    name: "email_resend",
    method: UpstreamMethod::Post,
    upstream: "notifications/email/resend/{id}",
    forward_query: &[],
    auth: AuthMode::Forward,
    success_status: StatusCode::OK,
    short_circuit: None,
    validate: None,
    on_failure: OnFailure::Error {
        message: "Failed to resend email",
        status: ErrorStatus::Upstream,
    },
};

pub static SESSIONS: EndpointSpec = EndpointSpec {
    name: "sessions",
    method: UpstreamMethod::Get,
    upstream: "sessions",
    forward_query: &[],
    auth: AuthMode::Forward,
    success_status: StatusCode::OK,
    short_circuit: None,
    validate: None,
    on_failure: OnFailure::Fallback {
        status: StatusCode::OK,
        payload: no_sessions,
    },
};

fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn zeroed_metrics(now: &str) -> Value {
    json!({
        "cpu": 0,
        "memory": 0,
        "disk": 0,
        "network": { "in": 0, "out": 0 },
        "requests": { "total": 0, "perSecond": 0, "errorRate": 0 },
        "responseTime": { "avg": 0, "p95": 0, "p99": 0 },
        "activeConnections": 0,
        "timestamp": now,
    })
}

fn backend_alert(now: &str) -> Value {
    json!({
        "id": "backend-unavailable",
        "severity": "critical",
        "title": "Backend Service Unavailable",
        "message": "Unable to reach the backend service. Monitoring data is unavailable.",
        "service": "backend",
        "timestamp": now,
        "acknowledged": false,
    })
}

fn health_down(_: &ProxyCall) -> Value {
    let now = timestamp();
    json!({
        "overall": "critical",
        "timestamp": now,
        "uptime": 0,
        "services": [{
            "name": "backend",
            "status": "down",
            "responseTime": null,
            "lastCheck": now,
            "message": "Backend service unavailable",
        }],
        "metrics": zeroed_metrics(&now),
        "alerts": [backend_alert(&now)],
    })
}

fn metrics_zeroed(_: &ProxyCall) -> Value {
    zeroed_metrics(&timestamp())
}

fn empty_list(_: &ProxyCall) -> Value {
    json!([])
}

fn alerts_unavailable(_: &ProxyCall) -> Value {
    json!([backend_alert(&timestamp())])
}

fn ping_failed(_: &ProxyCall) -> Value {
    json!({
        "status": "error",
        "uptime": 0,
        "timestamp": timestamp(),
        "message": "Backend service unavailable",
    })
}

fn blank_search(call: &ProxyCall) -> Option<Value> {
    let query = call.query_param("q").map(str::trim).unwrap_or_default();
    query.is_empty().then(|| {
        json!({
            "suggestions": [],
            "query": "",
            "category": null,
        })
    })
}

fn no_suggestions(call: &ProxyCall) -> Value {
    json!({
        "suggestions": [],
        "query": call.query_param("q").unwrap_or_default(),
        "category": call.query_param("category"),
    })
}

fn no_notifications(_: &ProxyCall) -> Value {
    json!({
        "notifications": [],
        "unreadCount": 0,
    })
}

fn no_sessions(_: &ProxyCall) -> Value {
    json!({
        "sessions": [],
        "total": 0,
    })
}

fn contract_fields(body: Option<&Value>) -> Result<(), String> {
    const REQUIRED: [&str; 2] = ["title", "customerId"];

    let body = body
        .and_then(Value::as_object)
        .ok_or("Request body must be a JSON object")?;

    let missing: Vec<&str> = REQUIRED
        .iter()
        .copied()
        .filter(|field| body.get(*field).is_none_or(is_blank))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(format!("Missing required fields: {}", missing.join(", ")))
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}
