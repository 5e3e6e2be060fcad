use loader_model::{Statement, WorkerId};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::{
    client::{ClientRef, RowStream},
    error::QueryError,
};

/// Terminal result of one worker, produced exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerOutcome {
    /// Stopped because the run was cancelled (deadline, interrupt or another worker's failure).
    Cancelled,
    /// Stopped on a query error that was not caused by cancellation.
    Failed(QueryError),
}

impl WorkerOutcome {
    /// Returns `true` if the worker stopped without a genuine error.
    pub fn is_clean(&self) -> bool {
        matches!(self, WorkerOutcome::Cancelled)
    }
}

/// How one execute-drain-stop cycle ended.
enum Cycle {
    Drained,
    Cancelled,
}

/// One stream of back-to-back executions of the same statement.
///
/// The worker never retries: the first non-deadline error ends it.
pub struct Worker {
    id: WorkerId,
    client: ClientRef,
    statement: Statement,
    cancel: CancellationToken,
}

impl Worker {
    pub fn new(
        id: WorkerId,
        client: ClientRef,
        statement: Statement,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            id,
            client,
            statement,
            cancel,
        }
    }

    pub fn id(&self) -> WorkerId {
        self.id
    }

    /// Drive executions until cancellation or the first real error.
    pub async fn run(self) -> WorkerOutcome {
        debug!(target: "loader.worker", worker = self.id, "worker started");

        let outcome = loop {
            if self.cancel.is_cancelled() {
                break WorkerOutcome::Cancelled;
            }

            match self.cycle().await {
                Ok(Cycle::Drained) => {
                    trace!(target: "loader.worker", worker = self.id, "result set drained; reissuing");
                }
                Ok(Cycle::Cancelled) => break WorkerOutcome::Cancelled,
                Err(e) if e.is_deadline() => {
                    trace!(target: "loader.worker", worker = self.id, code = %e.code(), "query cut by deadline");
                    break WorkerOutcome::Cancelled;
                }
                Err(e) => break WorkerOutcome::Failed(e),
            }

            // A result set that is empty or served from cache can complete without ever suspending.
            tokio::task::yield_now().await;
        };

        match &outcome {
            WorkerOutcome::Cancelled => debug!(target: "loader.worker", worker = self.id, "worker stopped"),
            WorkerOutcome::Failed(e) => debug!(target: "loader.worker", worker = self.id, error = %e, "worker failed"),
        }
        outcome
    }

    async fn cycle(&self) -> Result<Cycle, QueryError> {
        let mut rows = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Ok(Cycle::Cancelled),
            res = self.client.execute(&self.statement) => res?,
        };

        let drained = self.drain(rows.as_mut()).await;
        rows.stop().await;
        drained
    }

    async fn drain(&self, rows: &mut dyn RowStream) -> Result<Cycle, QueryError> {
        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Ok(Cycle::Cancelled),
                next = rows.next_row() => {
                    if next?.is_none() {
                        return Ok(Cycle::Drained);
                    }
                }
            }
        }
    }
}
