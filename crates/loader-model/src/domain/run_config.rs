use std::time::Duration;

use crate::{ModelError, Priority, Statement};

/// Validated parameters of a single load run.
///
/// Built once before any client exists; immutable for the lifetime of the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    workers: usize,
    duration: Duration,
    query: String,
    priority: Priority,
}

impl RunConfig {
    pub fn new(
        workers: usize,
        duration: Duration,
        query: impl Into<String>,
        priority: Priority,
    ) -> Result<Self, ModelError> {
        let query = query.into();
        if query.trim().is_empty() {
            return Err(ModelError::EmptyQuery);
        }
        if workers == 0 {
            return Err(ModelError::ZeroWorkers);
        }
        if duration.is_zero() {
            return Err(ModelError::ZeroDuration);
        }

        Ok(Self {
            workers,
            duration,
            query,
            priority,
        })
    }

    /// Number of concurrent workers (and database sessions).
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Wall-clock budget of the run, measured from the moment workers are launched.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// The statement every worker issues on each cycle.
    pub fn statement(&self) -> Statement {
        Statement::new(self.query.clone(), self.priority)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_config() {
        let cfg = RunConfig::new(4, Duration::from_secs(5), "SELECT 1", Priority::High).unwrap();
        assert_eq!(cfg.workers(), 4);
        assert_eq!(cfg.duration(), Duration::from_secs(5));
        assert_eq!(cfg.statement(), Statement::new("SELECT 1", Priority::High));
    }

    #[test]
    fn rejects_blank_query() {
        let err = RunConfig::new(1, Duration::from_secs(1), "   ", Priority::Low).unwrap_err();
        assert_eq!(err, ModelError::EmptyQuery);
    }

    #[test]
    fn rejects_zero_workers_and_duration() {
        assert_eq!(
            RunConfig::new(0, Duration::from_secs(1), "SELECT 1", Priority::Low).unwrap_err(),
            ModelError::ZeroWorkers
        );
        assert_eq!(
            RunConfig::new(1, Duration::ZERO, "SELECT 1", Priority::Low).unwrap_err(),
            ModelError::ZeroDuration
        );
    }
}
