pub mod error;
pub use error::{Code, CoreError, QueryError};

pub mod client;
pub use client::{ClientRef, QueryClient, RowStream};

pub mod worker;
pub use worker::{Worker, WorkerOutcome};

pub mod run;
pub use run::{Orchestrator, RunPhase, RunReport, StopReason};

#[cfg(test)]
mod testing;
