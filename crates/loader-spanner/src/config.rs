use loader_model::DatabasePath;

/// Public Cloud Spanner REST endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://spanner.googleapis.com";

/// Session pool bounds.
///
/// The load driver sizes both bounds to the worker count so every worker owns exactly one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    /// Sessions created up front, before the first query.
    pub min_opened: usize,
    /// Hard cap on sessions checked out at the same time.
    pub max_opened: usize,
}

impl PoolConfig {
    pub fn sized_for(workers: usize) -> Self {
        Self {
            min_opened: workers,
            max_opened: workers,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SpannerConfig {
    pub database: DatabasePath,
    /// Base URL of the REST API, e.g. [`DEFAULT_ENDPOINT`] or an emulator's `http://localhost:9020`.
    pub endpoint: String,
    /// OAuth2 bearer token; omitted for emulators.
    pub access_token: Option<String>,
    pub pool: PoolConfig,
}

impl SpannerConfig {
    pub fn new(database: DatabasePath, workers: usize) -> Self {
        Self {
            database,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            access_token: None,
            pool: PoolConfig::sized_for(workers),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_access_token(mut self, token: Option<String>) -> Self {
        self.access_token = token.filter(|t| !t.trim().is_empty());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_is_sized_to_workers() {
        let pool = PoolConfig::sized_for(8);
        assert_eq!(pool.min_opened, 8);
        assert_eq!(pool.max_opened, 8);
    }

    #[test]
    fn blank_token_is_dropped() {
        let db = DatabasePath::new("p", "i", "d").unwrap();
        let cfg = SpannerConfig::new(db, 2).with_access_token(Some("  ".into()));
        assert!(cfg.access_token.is_none());
        assert_eq!(cfg.endpoint, DEFAULT_ENDPOINT);
    }
}
