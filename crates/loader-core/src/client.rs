//! The seam between the load driver and a concrete database client.
//!
//! The core only ever issues a statement, pulls rows one at a time and stops the execution;
//! sessions, transport and retries live behind these traits.
use std::sync::Arc;

use async_trait::async_trait;
use loader_model::{Row, Statement};

use crate::error::QueryError;

/// Shared handle to a client, cloned into every worker.
pub type ClientRef = Arc<dyn QueryClient>;

/// A database client able to run one statement per call.
///
/// Implementations must tolerate `execute` being called concurrently from every worker
/// and bound their own session usage accordingly.
#[async_trait]
pub trait QueryClient: Send + Sync + 'static {
    /// Start a fresh execution of `statement` and return its row stream.
    async fn execute(&self, statement: &Statement) -> Result<Box<dyn RowStream>, QueryError>;

    /// Release every resource held by the client. Called once, after all workers have stopped.
    async fn close(&self);
}

/// Rows produced by a single execution.
#[async_trait]
pub trait RowStream: Send {
    /// Next row, or `None` once the result set is exhausted.
    async fn next_row(&mut self) -> Result<Option<Row>, QueryError>;

    /// Release the execution's resources. Safe to call after exhaustion or an error.
    async fn stop(&mut self);
}
