use thiserror::Error;

/// Why the log subscriber could not be installed.
#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("unknown --log-format {0:?}; use text or json")]
    InvalidFormat(String),
    #[error("--log-format journald needs a Linux build with the `journald` feature")]
    JournaldNotSupported,
    #[error("a global tracing subscriber is already installed")]
    AlreadyInitialized,
    #[error("cannot install log subscriber: {0}")]
    InitializationFailed(String),
    #[error("invalid --log-level directive {0:?}")]
    InvalidLogLevel(String),
}
