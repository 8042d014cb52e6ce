use crate::proxy::ProxyExecutor;
use crate::rate_limit::RateLimiter;
// app's shared state

pub struct AppState {
    pub proxy: ProxyExecutor,        // backend forwarding
    pub rate_limiter: RateLimiter,   // admission for /api routes
}

impl AppState {
    pub fn new(proxy: ProxyExecutor, rate_limiter: RateLimiter) -> Self {
        Self {
            proxy,
            rate_limiter,
        }
    }
}
