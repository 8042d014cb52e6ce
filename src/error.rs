use axum::http::StatusCode;
use thiserror::Error;

/// Everything that can stop a proxied call from producing upstream data.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Authentication required")]
    AuthRequired,

    #[error("Authentication failed")]
    AuthRejected,

    #[error("{0}")]
    Validation(String),

    #[error("Backend responded with status {0}")]
    Upstream(StatusCode),

    #[error("Backend request timed out")]
    Timeout,

    #[error("Backend request failed: {0}")]
    Network(String),

    #[error("Backend returned an unreadable body: {0}")]
    Decode(String),

    #[error("Cannot build backend url: {0}")]
    InvalidUpstream(String),

    #[error("Cannot build http client: {0}")]
    Client(String),
}

impl ProxyError {
    pub fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            ProxyError::Timeout
        } else if error.is_decode() {
            ProxyError::Decode(error.to_string())
        } else {
            ProxyError::Network(error.to_string())
        }
    }

    /// Status the backend answered with, if it answered at all.
    pub fn upstream_status(&self) -> Option<StatusCode> {
        match self {
            ProxyError::Upstream(status) => Some(*status),
            ProxyError::AuthRejected => Some(StatusCode::UNAUTHORIZED),
            _ => None,
        }
    }

    // Failures that are answered directly instead of going through the
    // endpoint's failure policy
    pub fn client_status(&self) -> Option<StatusCode> {
        match self {
            ProxyError::AuthRequired | ProxyError::AuthRejected => Some(StatusCode::UNAUTHORIZED),
            ProxyError::Validation(_) => Some(StatusCode::BAD_REQUEST),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_their_statuses() {
        assert_eq!(
            ProxyError::AuthRequired.client_status(),
            Some(StatusCode::UNAUTHORIZED)
        );
        assert_eq!(
            ProxyError::Validation("missing title".into()).client_status(),
            Some(StatusCode::BAD_REQUEST)
        );
        assert_eq!(ProxyError::Timeout.client_status(), None);
    }

    #[test]
    fn only_backend_answers_carry_a_status() {
        let err = ProxyError::Upstream(StatusCode::NOT_FOUND);
        assert_eq!(err.upstream_status(), Some(StatusCode::NOT_FOUND));
        assert_eq!(ProxyError::Network("refused".into()).upstream_status(), None);
        assert_eq!(ProxyError::AuthRequired.upstream_status(), None);
        assert_eq!(
            ProxyError::AuthRejected.upstream_status(),
            Some(StatusCode::UNAUTHORIZED)
        );
        assert_eq!(err.to_string(), "Backend responded with status 404 Not Found");
    }
}
