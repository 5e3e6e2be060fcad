use loader_model::ModelError;
use loader_observe::LoggerError;
use thiserror::Error;

/// Invalid command-line or environment input, detected before any load is generated.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Logger(#[from] LoggerError),
}
