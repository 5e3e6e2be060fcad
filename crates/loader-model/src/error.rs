use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("query text is required")]
    EmptyQuery,
    #[error("invalid priority: {0}, priority must be one of: low, medium, high")]
    InvalidPriority(String),
    #[error("missing project id (set -project or GCP_PROJECT_ID)")]
    MissingProject,
    #[error("missing instance id (set -instance or SPANNER_INSTANCE)")]
    MissingInstance,
    #[error("missing database id (set -database or SPANNER_DATABASE)")]
    MissingDatabase,
    #[error("concurrency must be at least 1")]
    ZeroWorkers,
    #[error("duration must be greater than zero")]
    ZeroDuration,
}
