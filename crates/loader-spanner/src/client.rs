use std::{collections::VecDeque, sync::Arc};

use async_trait::async_trait;
use loader_core::{QueryClient, QueryError, RowStream};
use loader_model::{DatabasePath, Row, Statement};
use tracing::{info, instrument};

use crate::{
    api::Api,
    config::SpannerConfig,
    errors::SpannerError,
    pool::{SessionLease, SessionPool},
    wire::ExecuteSqlRequest,
};

/// Cloud Spanner client backed by a fixed-size session pool.
pub struct SpannerClient {
    api: Arc<Api>,
    pool: SessionPool,
    database: DatabasePath,
}

impl SpannerClient {
    /// Connect to `cfg.database` and open the pool's initial sessions.
    #[instrument(level = "debug", skip(cfg), fields(database = %cfg.database, endpoint = %cfg.endpoint))]
    pub async fn connect(cfg: SpannerConfig) -> Result<Self, SpannerError> {
        let api = Arc::new(Api::new(&cfg)?);
        let pool = SessionPool::open(Arc::clone(&api), cfg.database.clone(), cfg.pool).await?;

        info!(target: "loader.spanner", database = %cfg.database, "connected");
        Ok(Self {
            api,
            pool,
            database: cfg.database,
        })
    }

    pub fn database(&self) -> &DatabasePath {
        &self.database
    }
}

#[async_trait]
impl QueryClient for SpannerClient {
    async fn execute(&self, statement: &Statement) -> Result<Box<dyn RowStream>, QueryError> {
        let lease = self.pool.acquire().await?;
        let request = ExecuteSqlRequest::single_use(statement);
        let result = self.api.execute_sql(lease.name(), &request).await?;

        Ok(Box::new(ResultRows::new(result.rows, lease)))
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

/// Rows of one execution, holding its session until stopped.
struct ResultRows {
    rows: VecDeque<Row>,
    lease: Option<SessionLease>,
}

impl ResultRows {
    fn new(rows: Vec<Row>, lease: SessionLease) -> Self {
        Self {
            rows: rows.into(),
            lease: Some(lease),
        }
    }
}

#[async_trait]
impl RowStream for ResultRows {
    async fn next_row(&mut self) -> Result<Option<Row>, QueryError> {
        Ok(self.rows.pop_front())
    }

    async fn stop(&mut self) {
        self.rows.clear();
        self.lease = None;
    }
}
