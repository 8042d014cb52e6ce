use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::get;
use std::sync::Arc;

use crate::handlers::{health_handler, metrics_handler, route, route_with_id};
use crate::middleware::rate_limit;
use crate::proxy::endpoints::{
    CONTRACT_GET, CONTRACT_SEND, CONTRACT_VOID, CONTRACTS_CREATE, CONTRACTS_LIST, EMAIL_RESEND,
    HEALTH, HEALTH_ALERTS, HEALTH_HISTORY, HEALTH_METRICS, HEALTH_PING, NOTIFICATIONS,
    SEARCH_SUGGESTIONS, SESSIONS,
};
use crate::state::AppState;

pub fn build(state: Arc<AppState>) -> Router {
    // dashboard api, all behind the rate limiter
    let api = Router::new()
        .route("/api/health", route(&HEALTH))
        .route("/api/health/metrics", route(&HEALTH_METRICS))
        .route("/api/health/history", route(&HEALTH_HISTORY))
        .route("/api/health/alerts", route(&HEALTH_ALERTS))
        .route("/api/health/ping", route(&HEALTH_PING))
        .route("/api/search/suggestions", route(&SEARCH_SUGGESTIONS))
        .route(
            "/api/contracts",
            route(&CONTRACTS_LIST).merge(route(&CONTRACTS_CREATE)),
        )
        .route("/api/contracts/{id}", route_with_id(&CONTRACT_GET))
        .route("/api/contracts/{id}/send", route_with_id(&CONTRACT_SEND))
        .route("/api/contracts/{id}/void", route_with_id(&CONTRACT_VOID))
        .route("/api/notifications", route(&NOTIFICATIONS))
        .route(
            "/api/notifications/email/resend/{id}",
            route_with_id(&EMAIL_RESEND),
        )
        .route("/api/sessions", route(&SESSIONS))
        .route_layer(from_fn_with_state(state.clone(), rate_limit));

    Router::new()
        .route("/livez", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .merge(api)
        .with_state(state)
}
