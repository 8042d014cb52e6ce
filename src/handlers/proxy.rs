use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::routing::{MethodRouter, on};
use std::collections::HashMap;
use std::sync::Arc;

use crate::models::ProxyCall;
use crate::proxy::EndpointSpec;
use crate::state::AppState;

// Route for an endpoint without path params
pub fn route(endpoint: &'static EndpointSpec) -> MethodRouter<Arc<AppState>> {
    let handler = move |State(state): State<Arc<AppState>>,
                        Query(query): Query<HashMap<String, String>>,
                        headers: HeaderMap,
                        body: Bytes| async move {
        let call = ProxyCall::new(query, headers, body);
        state.proxy.execute(endpoint, &call).await
    };

    on(endpoint.method.filter(), handler)
}

// Route for an endpoint whose path carries an {id}
pub fn route_with_id(endpoint: &'static EndpointSpec) -> MethodRouter<Arc<AppState>> {
    let handler = move |State(state): State<Arc<AppState>>,
                        Path(id): Path<String>,
                        Query(query): Query<HashMap<String, String>>,
                        headers: HeaderMap,
                        body: Bytes| async move {
        let call = ProxyCall::new(query, headers, body).with_param("id", id);
        state.proxy.execute(endpoint, &call).await
    };

    on(endpoint.method.filter(), handler)
}
