use clap::Parser; // for cli
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use eagle_gateway::config::Args;
use eagle_gateway::proxy::ProxyExecutor;
use eagle_gateway::rate_limit::{RateLimitConfig, RateLimiter, sweep_expired};
use eagle_gateway::router;
use eagle_gateway::state::AppState;

// this is main async function with tokio
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // parse cli arguments
    let args = Args::parse();

    let upstream = args.upstream_base();
    let proxy = ProxyExecutor::new(upstream.clone(), args.upstream_timeout())?;
    let rate_limiter = RateLimiter::new(RateLimitConfig {
        max: args.rate_limit,
        window: args.rate_window(),
    });

    // spawn the limiter sweep, once per window
    tokio::spawn(sweep_expired(rate_limiter.clone(), args.rate_window()));

    // creating shared state
    let state = Arc::new(AppState::new(proxy, rate_limiter));
    let app = router::build(state);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(port = args.port, "Gateway running");
    info!(upstream = %upstream, timeout_secs = args.upstream_timeout, "Forwarding to backend");
    info!(
        max = args.rate_limit,
        window_secs = args.rate_window,
        "Rate limit configured"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
