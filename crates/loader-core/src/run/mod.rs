use std::{
    fmt,
    sync::{Arc, OnceLock},
};

use loader_model::{RunConfig, WorkerId};
use tokio::{task::JoinHandle, time::Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument};

use crate::{
    client::ClientRef,
    error::{Code, CoreError, QueryError},
    worker::{Worker, WorkerOutcome},
};

/// Lifecycle of a run. `Succeeded` and `Failed` are terminal; there is no way back to `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Starting,
    Running,
    /// Cancellation fired; in-flight executions are being released.
    Completing,
    Succeeded,
    Failed,
}

impl RunPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunPhase::Succeeded | RunPhase::Failed)
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RunPhase::Starting => "starting",
            RunPhase::Running => "running",
            RunPhase::Completing => "completing",
            RunPhase::Succeeded => "succeeded",
            RunPhase::Failed => "failed",
        })
    }
}

/// Why a successful run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The run's duration elapsed.
    Deadline,
    /// The external shutdown token fired before the deadline.
    Interrupted,
}

/// Summary of a run that ended without a worker failure.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// One outcome per worker, indexed by worker id.
    pub outcomes: Vec<WorkerOutcome>,
    pub stop: StopReason,
    /// Phase the run ended in; always terminal.
    pub phase: RunPhase,
}

/// Fans out the configured number of workers under one deadline and classifies the result.
///
/// The orchestrator owns the client: it is closed after every worker has been joined, whatever the outcome.
pub struct Orchestrator {
    cfg: RunConfig,
    client: ClientRef,
    shutdown: CancellationToken,
    phase: RunPhase,
}

impl Orchestrator {
    pub fn new(cfg: RunConfig, client: ClientRef) -> Self {
        Self {
            cfg,
            client,
            shutdown: CancellationToken::new(),
            phase: RunPhase::Starting,
        }
    }

    /// Stop the run early (and cleanly) when `token` is cancelled, e.g. on Ctrl-C.
    pub fn with_shutdown(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    /// Run to completion.
    ///
    /// Returns the report on a clean stop, or the first failure reported by any worker.
    /// The first failure also cancels the remaining workers.
    #[instrument(level = "debug", name = "load_run", skip_all)]
    pub async fn run(mut self) -> Result<RunReport, CoreError> {
        let run = self.shutdown.child_token();
        let first_failure: Arc<OnceLock<CoreError>> = Arc::new(OnceLock::new());

        info!(
            target: "loader.run",
            workers = self.cfg.workers(),
            duration = ?self.cfg.duration(),
            priority = %self.cfg.priority(),
            "starting load run"
        );

        let deadline = spawn_deadline(run.clone(), Instant::now() + self.cfg.duration());
        let handles = self.spawn_workers(&run, &first_failure);
        self.transition(RunPhase::Running);

        run.cancelled().await;
        self.transition(RunPhase::Completing);

        let mut outcomes = Vec::with_capacity(handles.len());
        for (worker, handle) in handles.into_iter().enumerate() {
            match handle.await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    let reason = e.to_string();
                    error!(target: "loader.run", worker, %reason, "worker task aborted");
                    let _ = first_failure.set(CoreError::WorkerPanicked {
                        worker,
                        reason: reason.clone(),
                    });
                    outcomes.push(WorkerOutcome::Failed(QueryError::new(Code::Internal, reason)));
                }
            }
        }
        debug!(target: "loader.run", collected = outcomes.len(), "all workers joined");

        let deadline_fired = deadline.await.unwrap_or(false);
        self.client.close().await;

        if let Some(err) = first_failure.get().cloned() {
            self.transition(RunPhase::Failed);
            error!(target: "loader.run", worker = err.worker(), error = %err, "load run failed");
            return Err(err);
        }

        let stop = if !deadline_fired && self.shutdown.is_cancelled() {
            StopReason::Interrupted
        } else {
            StopReason::Deadline
        };
        self.transition(RunPhase::Succeeded);
        info!(target: "loader.run", workers = outcomes.len(), ?stop, "load run completed");

        Ok(RunReport {
            outcomes,
            stop,
            phase: self.phase,
        })
    }

    fn spawn_workers(
        &self,
        run: &CancellationToken,
        first_failure: &Arc<OnceLock<CoreError>>,
    ) -> Vec<JoinHandle<WorkerOutcome>> {
        let statement = self.cfg.statement();

        (0..self.cfg.workers())
            .map(|id: WorkerId| {
                let worker = Worker::new(id, Arc::clone(&self.client), statement.clone(), run.clone());
                let first_failure = Arc::clone(first_failure);
                // A failure or a panic cancels the run for the other workers; a clean exit does not.
                let abort_on_failure = run.clone().drop_guard();

                tokio::spawn(async move {
                    let outcome = worker.run().await;
                    match &outcome {
                        WorkerOutcome::Failed(e) => {
                            error!(target: "loader.run", worker = id, error = %e, "worker failed; aborting run");
                            let _ = first_failure.set(CoreError::Query {
                                worker: id,
                                source: e.clone(),
                            });
                            drop(abort_on_failure);
                        }
                        WorkerOutcome::Cancelled => {
                            abort_on_failure.disarm();
                        }
                    }
                    outcome
                })
            })
            .collect()
    }

    fn transition(&mut self, next: RunPhase) {
        debug!(target: "loader.run", from = %self.phase, to = %next, "run phase");
        self.phase = next;
    }
}

/// Cancel `run` once `at` is reached. Resolves to `true` if the deadline is what fired.
fn spawn_deadline(run: CancellationToken, at: Instant) -> JoinHandle<bool> {
    tokio::spawn(async move {
        tokio::select! {
            _ = run.cancelled() => false,
            _ = tokio::time::sleep_until(at) => {
                debug!(target: "loader.run", "deadline reached");
                run.cancel();
                true
            }
        }
    })
}
