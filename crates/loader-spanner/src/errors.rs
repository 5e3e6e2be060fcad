use loader_core::{Code, QueryError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpannerError {
    #[error("http request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    #[error("spanner returned {code}: {message}")]
    Status { code: Code, message: String },

    #[error("spanner created no sessions for {0}")]
    NoSessions(String),

    #[error("session pool closed")]
    PoolClosed,
}

impl SpannerError {
    /// Canonical status code of the failure.
    ///
    /// Transport timeouts count as deadline expiry; connection failures as unavailability.
    pub fn code(&self) -> Code {
        match self {
            SpannerError::Status { code, .. } => *code,
            SpannerError::HttpRequest(e) if e.is_timeout() => Code::DeadlineExceeded,
            SpannerError::HttpRequest(e) if e.is_connect() => Code::Unavailable,
            SpannerError::HttpRequest(e) if e.is_decode() => Code::Internal,
            SpannerError::HttpRequest(_) => Code::Unknown,
            SpannerError::NoSessions(_) => Code::ResourceExhausted,
            SpannerError::PoolClosed => Code::Cancelled,
        }
    }
}

impl From<SpannerError> for QueryError {
    fn from(err: SpannerError) -> Self {
        let code = err.code();
        match err {
            SpannerError::Status { message, .. } => QueryError::new(code, message),
            other => QueryError::new(code, other.to_string()),
        }
    }
}
