use clap::Parser;
use std::time::Duration;

const DEFAULT_BACKEND: &str = "http://localhost:8080";

// CLI argument structure
#[derive(Parser, Debug, Clone)]
#[command(name = "eagle-gateway")]
#[command(about = "Rate-limited resilient proxy for the Eagle dashboard API")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    // Backend base address, the api prefix is appended
    #[arg(long, env = "BACKEND_URL")]
    pub backend_url: Option<String>,

    // Version prefix for backend routes
    #[arg(long, env = "API_PREFIX", default_value = "/api/v1")]
    pub api_prefix: String,

    // Public api address, used when BACKEND_URL is not set
    #[arg(long, env = "NEXT_PUBLIC_API_URL")]
    pub public_api_url: Option<String>,

    // Fully qualified backend api address (prefix included), wins over everything else
    #[arg(long, env = "BACKEND_API_URL")]
    pub backend_api_url: Option<String>,

    // Rate limit max requests per window
    #[arg(long, default_value_t = 100)]
    pub rate_limit: usize,

    // Rate limit window in seconds
    #[arg(long, default_value_t = 60)]
    pub rate_window: u64,

    // Upstream request timeout in seconds
    #[arg(long, default_value_t = 10)]
    pub upstream_timeout: u64,
}

impl Args {
    /// Resolve the upstream base every proxied path is appended to.
    pub fn upstream_base(&self) -> String {
        if let Some(full) = non_empty(&self.backend_api_url) {
            return full.trim_end_matches('/').to_string();
        }

        let host = non_empty(&self.backend_url)
            .or_else(|| non_empty(&self.public_api_url))
            .unwrap_or(DEFAULT_BACKEND);

        join_prefix(host, &self.api_prefix)
    }

    pub fn rate_window(&self) -> Duration {
        Duration::from_secs(self.rate_window)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn join_prefix(host: &str, prefix: &str) -> String {
    let host = host.trim_end_matches('/');
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        host.to_string()
    } else {
        format!("{}/{}", host, prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        let mut argv = vec!["eagle-gateway"];
        argv.extend_from_slice(args);
        Args::try_parse_from(argv).unwrap()
    }

    fn clear(mut args: Args) -> Args {
        // the test process may carry these in its environment
        args.backend_url = None;
        args.public_api_url = None;
        args.backend_api_url = None;
        args
    }

    #[test]
    fn backend_api_url_is_used_verbatim() {
        let mut args = clear(parse(&[]));
        args.backend_api_url = Some("https://api.example.com/api/v2/".into());
        args.backend_url = Some("http://ignored".into());
        assert_eq!(args.upstream_base(), "https://api.example.com/api/v2");
    }

    #[test]
    fn backend_url_gets_prefix() {
        let mut args = clear(parse(&["--api-prefix", "/api/v1"]));
        args.backend_url = Some("http://backend:9000/".into());
        assert_eq!(args.upstream_base(), "http://backend:9000/api/v1");
    }

    #[test]
    fn public_url_is_the_last_resort_before_default() {
        let mut args = clear(parse(&["--api-prefix", "v3"]));
        args.public_api_url = Some("https://public.example.com".into());
        assert_eq!(args.upstream_base(), "https://public.example.com/v3");

        args.public_api_url = Some("   ".into());
        assert_eq!(args.upstream_base(), "http://localhost:8080/v3");
    }

    #[test]
    fn defaults_match_the_dashboard() {
        let args = parse(&[]);
        assert_eq!(args.rate_limit, 100);
        assert_eq!(args.rate_window(), Duration::from_secs(60));
        assert_eq!(args.upstream_timeout(), Duration::from_secs(10));
    }
}
