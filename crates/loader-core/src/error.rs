use std::fmt;

use loader_model::WorkerId;
use thiserror::Error;

/// Canonical status code attached to every query failure.
///
/// Mirrors the service's gRPC status space so that failures are classified by code, never by message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Code {
    Cancelled,
    Unknown,
    InvalidArgument,
    DeadlineExceeded,
    NotFound,
    AlreadyExists,
    PermissionDenied,
    ResourceExhausted,
    FailedPrecondition,
    Aborted,
    OutOfRange,
    Unimplemented,
    Internal,
    Unavailable,
    DataLoss,
    Unauthenticated,
}

impl Code {
    /// Parse a canonical status name such as `"NOT_FOUND"`.
    ///
    /// Unrecognized names map to [`Code::Unknown`].
    pub fn from_status(status: &str) -> Self {
        match status {
            "CANCELLED" => Code::Cancelled,
            "INVALID_ARGUMENT" => Code::InvalidArgument,
            "DEADLINE_EXCEEDED" => Code::DeadlineExceeded,
            "NOT_FOUND" => Code::NotFound,
            "ALREADY_EXISTS" => Code::AlreadyExists,
            "PERMISSION_DENIED" => Code::PermissionDenied,
            "RESOURCE_EXHAUSTED" => Code::ResourceExhausted,
            "FAILED_PRECONDITION" => Code::FailedPrecondition,
            "ABORTED" => Code::Aborted,
            "OUT_OF_RANGE" => Code::OutOfRange,
            "UNIMPLEMENTED" => Code::Unimplemented,
            "INTERNAL" => Code::Internal,
            "UNAVAILABLE" => Code::Unavailable,
            "DATA_LOSS" => Code::DataLoss,
            "UNAUTHENTICATED" => Code::Unauthenticated,
            _ => Code::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Code::Cancelled => "CANCELLED",
            Code::Unknown => "UNKNOWN",
            Code::InvalidArgument => "INVALID_ARGUMENT",
            Code::DeadlineExceeded => "DEADLINE_EXCEEDED",
            Code::NotFound => "NOT_FOUND",
            Code::AlreadyExists => "ALREADY_EXISTS",
            Code::PermissionDenied => "PERMISSION_DENIED",
            Code::ResourceExhausted => "RESOURCE_EXHAUSTED",
            Code::FailedPrecondition => "FAILED_PRECONDITION",
            Code::Aborted => "ABORTED",
            Code::OutOfRange => "OUT_OF_RANGE",
            Code::Unimplemented => "UNIMPLEMENTED",
            Code::Internal => "INTERNAL",
            Code::Unavailable => "UNAVAILABLE",
            Code::DataLoss => "DATA_LOSS",
            Code::Unauthenticated => "UNAUTHENTICATED",
        }
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure reported by a [`QueryClient`](crate::QueryClient) while issuing a query or pulling rows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct QueryError {
    code: Code,
    message: String,
}

impl QueryError {
    pub fn new(code: Code, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn deadline_exceeded(message: impl Into<String>) -> Self {
        Self::new(Code::DeadlineExceeded, message)
    }

    pub fn code(&self) -> Code {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns `true` when the call was cut short by the run's time budget rather than by a real failure.
    pub fn is_deadline(&self) -> bool {
        matches!(self.code, Code::DeadlineExceeded | Code::Cancelled)
    }
}

#[derive(Debug, Clone, Error)]
pub enum CoreError {
    #[error("worker {worker} failed: {source}")]
    Query {
        worker: WorkerId,
        #[source]
        source: QueryError,
    },
    #[error("worker {worker} panicked: {reason}")]
    WorkerPanicked { worker: WorkerId, reason: String },
}

impl CoreError {
    /// Index of the worker whose failure decided the run.
    pub fn worker(&self) -> WorkerId {
        match self {
            CoreError::Query { worker, .. } | CoreError::WorkerPanicked { worker, .. } => *worker,
        }
    }

    /// Underlying client error, when the failure came from the database.
    pub fn query_error(&self) -> Option<&QueryError> {
        match self {
            CoreError::Query { source, .. } => Some(source),
            CoreError::WorkerPanicked { .. } => None,
        }
    }
}
