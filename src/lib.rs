pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod proxy;
pub mod rate_limit;
pub mod router;
pub mod state;
