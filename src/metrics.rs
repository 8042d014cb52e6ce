use lazy_static::lazy_static;
use prometheus::{
    Counter, CounterVec, Gauge, Histogram, register_counter, register_counter_vec,
    register_gauge, register_histogram,
};


lazy_static! {
    pub static ref REQUEST_TOTAL: CounterVec = register_counter_vec!(
        "eagle_proxy_requests_total",
        "Total number of proxied requests",
        &["endpoint"]
    )
    .unwrap();
    pub static ref FALLBACK_TOTAL: CounterVec = register_counter_vec!(
        "eagle_proxy_fallbacks_total",
        "Backend failures answered locally",
        &["endpoint"]
    )
    .unwrap();
    pub static ref RATE_LIMITED_TOTAL: Counter =
        register_counter!("eagle_rate_limited_total", "Requests rejected by the rate limiter").unwrap();
    pub static ref UPSTREAM_LATENCY: Histogram = register_histogram!(
        "eagle_upstream_latency_seconds",
        "Backend call latency in seconds"
    )
    .unwrap();
    pub static ref RATE_LIMIT_TRACKED: Gauge =
        register_gauge!("eagle_rate_limit_tracked", "Identifiers currently held by the rate limiter").unwrap();
}
