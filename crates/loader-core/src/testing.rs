//! Scripted in-memory client used by the unit tests.
use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use loader_model::{Row, Statement};

use crate::{
    client::{QueryClient, RowStream},
    error::{Code, QueryError},
};

pub(crate) struct ScriptedClient {
    rows: usize,
    latency: Duration,
    fail_from: Option<(usize, Code)>,
    fail_only: Option<(usize, Code)>,
    fail_rows_from: Option<(usize, Code)>,
    panic_on: Option<usize>,
    executions: AtomicUsize,
    active: Arc<AtomicUsize>,
    max_active: Arc<AtomicUsize>,
    closes: AtomicUsize,
}

impl ScriptedClient {
    pub(crate) fn new() -> Self {
        Self {
            rows: 1,
            latency: Duration::ZERO,
            fail_from: None,
            fail_only: None,
            fail_rows_from: None,
            panic_on: None,
            executions: AtomicUsize::new(0),
            active: Arc::new(AtomicUsize::new(0)),
            max_active: Arc::new(AtomicUsize::new(0)),
            closes: AtomicUsize::new(0),
        }
    }

    /// Rows returned by every successful execution.
    pub(crate) fn rows(mut self, rows: usize) -> Self {
        self.rows = rows;
        self
    }

    /// Simulated round-trip applied to `execute` and to every `next_row`.
    pub(crate) fn latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Executions numbered `n` and later (1-based, across all workers) fail with `code`.
    pub(crate) fn fail_from(mut self, n: usize, code: Code) -> Self {
        self.fail_from = Some((n, code));
        self
    }

    /// Only execution number `n` fails with `code`; the rest succeed.
    pub(crate) fn fail_only(mut self, n: usize, code: Code) -> Self {
        self.fail_only = Some((n, code));
        self
    }

    /// Executions numbered `n` and later start fine but fail on their first row.
    pub(crate) fn fail_rows_from(mut self, n: usize, code: Code) -> Self {
        self.fail_rows_from = Some((n, code));
        self
    }

    pub(crate) fn panic_on(mut self, n: usize) -> Self {
        self.panic_on = Some(n);
        self
    }

    pub(crate) fn executions(&self) -> usize {
        self.executions.load(Ordering::SeqCst)
    }

    pub(crate) fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    pub(crate) fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    pub(crate) fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QueryClient for ScriptedClient {
    async fn execute(&self, _statement: &Statement) -> Result<Box<dyn RowStream>, QueryError> {
        let n = self.executions.fetch_add(1, Ordering::SeqCst) + 1;
        if self.panic_on == Some(n) {
            panic!("scripted panic on execution {n}");
        }
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if let Some((from, code)) = self.fail_from
            && n >= from
        {
            return Err(QueryError::new(code, format!("scripted failure on execution {n}")));
        }
        if let Some((only, code)) = self.fail_only
            && n == only
        {
            return Err(QueryError::new(code, format!("scripted failure on execution {n}")));
        }

        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now_active, Ordering::SeqCst);

        let fail = self
            .fail_rows_from
            .and_then(|(from, code)| (n >= from).then_some(code));

        Ok(Box::new(ScriptedRows {
            remaining: self.rows,
            latency: self.latency,
            fail,
            active: Arc::clone(&self.active),
            stopped: false,
        }))
    }

    async fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

struct ScriptedRows {
    remaining: usize,
    latency: Duration,
    fail: Option<Code>,
    active: Arc<AtomicUsize>,
    stopped: bool,
}

#[async_trait]
impl RowStream for ScriptedRows {
    async fn next_row(&mut self) -> Result<Option<Row>, QueryError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if let Some(code) = self.fail {
            return Err(QueryError::new(code, "scripted row failure"));
        }
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;
        Ok(Some(Row::default()))
    }

    async fn stop(&mut self) {
        if !self.stopped {
            self.stopped = true;
            self.active.fetch_sub(1, Ordering::SeqCst);
        }
    }
}
