//! JSON bodies of the REST calls the adapter makes.
use loader_core::Code;
use loader_model::{Priority, Row, Statement};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BatchCreateSessionsRequest {
    pub session_count: usize,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BatchCreateSessionsResponse {
    #[serde(default)]
    pub session: Vec<Session>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Session {
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ExecuteSqlRequest<'a> {
    pub sql: &'a str,
    pub transaction: TransactionSelector,
    pub request_options: RequestOptions,
}

impl<'a> ExecuteSqlRequest<'a> {
    /// Strong read in a single-use read-only transaction, like a standalone `SELECT`.
    pub fn single_use(statement: &'a Statement) -> Self {
        Self {
            sql: &statement.sql,
            transaction: TransactionSelector {
                single_use: TransactionOptions {
                    read_only: ReadOnly { strong: true },
                },
            },
            request_options: RequestOptions {
                priority: request_priority(statement.priority),
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TransactionSelector {
    pub single_use: TransactionOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TransactionOptions {
    pub read_only: ReadOnly,
}

#[derive(Debug, Serialize)]
pub(crate) struct ReadOnly {
    pub strong: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct RequestOptions {
    pub priority: &'static str,
}

/// Subset of `ResultSet` the loader needs; metadata and stats are ignored.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ResultSet {
    #[serde(default)]
    pub rows: Vec<Row>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: String,
}

pub(crate) fn request_priority(priority: Priority) -> &'static str {
    match priority {
        Priority::Unspecified => "PRIORITY_UNSPECIFIED",
        Priority::Low => "PRIORITY_LOW",
        Priority::Medium => "PRIORITY_MEDIUM",
        Priority::High => "PRIORITY_HIGH",
    }
}

/// Decode an error response into a status code and message.
///
/// Prefers the canonical `status` in the JSON envelope; falls back to the HTTP status mapping when the body is not JSON.
pub(crate) fn decode_error(http: StatusCode, body: &str) -> (Code, String) {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        let code = match Code::from_status(&envelope.error.status) {
            Code::Unknown => code_from_http(http),
            code => code,
        };
        return (code, envelope.error.message);
    }

    let message = match body.trim() {
        "" => http.to_string(),
        text => text.to_string(),
    };
    (code_from_http(http), message)
}

fn code_from_http(http: StatusCode) -> Code {
    match http.as_u16() {
        400 => Code::InvalidArgument,
        401 => Code::Unauthenticated,
        403 => Code::PermissionDenied,
        404 => Code::NotFound,
        409 => Code::Aborted,
        429 => Code::ResourceExhausted,
        499 => Code::Cancelled,
        500 => Code::Internal,
        501 => Code::Unimplemented,
        503 => Code::Unavailable,
        504 => Code::DeadlineExceeded,
        _ => Code::Unknown,
    }
}
