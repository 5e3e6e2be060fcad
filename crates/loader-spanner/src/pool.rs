use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use loader_model::DatabasePath;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, info, warn};

use crate::{api::Api, config::PoolConfig, errors::SpannerError};

/// Largest `sessionCount` accepted by a single `batchCreate` call.
const MAX_BATCH: usize = 100;

/// Fixed-capacity pool of server-side sessions.
///
/// At most `max_opened` sessions are checked out at once; callers beyond that wait for a lease to be returned.
pub(crate) struct SessionPool {
    inner: Arc<PoolInner>,
}

struct PoolInner {
    api: Arc<Api>,
    database: DatabasePath,
    permits: Arc<Semaphore>,
    /// Sessions not currently leased.
    idle: Mutex<Vec<String>>,
    /// Every session this pool created, deleted on close.
    opened: Mutex<Vec<String>>,
}

impl PoolInner {
    fn idle(&self) -> MutexGuard<'_, Vec<String>> {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn opened(&self) -> MutexGuard<'_, Vec<String>> {
        self.opened.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionPool {
    /// Create the pool and open `min_opened` sessions up front.
    ///
    /// If any batch fails, the sessions created so far are deleted before the error is returned.
    pub(crate) async fn open(
        api: Arc<Api>,
        database: DatabasePath,
        cfg: PoolConfig,
    ) -> Result<Self, SpannerError> {
        let pool = Self::empty(api, database, cfg.max_opened.max(1));

        let target = cfg.min_opened.min(cfg.max_opened);
        if let Err(e) = pool.fill(target).await {
            warn!(target: "loader.spanner", error = %e, "session pool setup failed");
            pool.close().await;
            return Err(e);
        }

        info!(target: "loader.spanner", sessions = target, max = cfg.max_opened, "session pool ready");
        Ok(pool)
    }

    async fn fill(&self, target: usize) -> Result<(), SpannerError> {
        while self.inner.opened().len() < target {
            let missing = target - self.inner.opened().len();
            let names = self
                .inner
                .api
                .batch_create_sessions(&self.inner.database, missing.min(MAX_BATCH))
                .await?;
            if names.is_empty() {
                return Err(SpannerError::NoSessions(self.inner.database.to_string()));
            }

            debug!(target: "loader.spanner", created = names.len(), "sessions created");
            self.inner.opened().extend(names.iter().cloned());
            self.inner.idle().extend(names);
        }
        Ok(())
    }

    fn empty(api: Arc<Api>, database: DatabasePath, max_opened: usize) -> Self {
        Self {
            inner: Arc::new(PoolInner {
                api,
                database,
                permits: Arc::new(Semaphore::new(max_opened)),
                idle: Mutex::new(Vec::new()),
                opened: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Lease a session, waiting while all `max_opened` are in use.
    pub(crate) async fn acquire(&self) -> Result<SessionLease, SpannerError> {
        let permit = Arc::clone(&self.inner.permits)
            .acquire_owned()
            .await
            .map_err(|_| SpannerError::PoolClosed)?;

        let idle = self.inner.idle().pop();
        let name = match idle {
            Some(name) => name,
            None => self.open_one().await?,
        };

        Ok(SessionLease {
            name: Some(name),
            pool: Arc::clone(&self.inner),
            _permit: permit,
        })
    }

    async fn open_one(&self) -> Result<String, SpannerError> {
        let name = self
            .inner
            .api
            .batch_create_sessions(&self.inner.database, 1)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| SpannerError::NoSessions(self.inner.database.to_string()))?;

        debug!(target: "loader.spanner", session = %name, "session opened on demand");
        self.inner.opened().push(name.clone());
        Ok(name)
    }

    /// Refuse new leases and delete every session the pool opened.
    pub(crate) async fn close(&self) {
        self.inner.permits.close();

        let sessions = std::mem::take(&mut *self.inner.opened());
        self.inner.idle().clear();

        for name in &sessions {
            if let Err(e) = self.inner.api.delete_session(name).await {
                warn!(target: "loader.spanner", session = %name, error = %e, "failed to delete session");
            }
        }
        info!(target: "loader.spanner", deleted = sessions.len(), "session pool closed");
    }

    #[cfg(test)]
    pub(crate) fn with_idle(api: Arc<Api>, database: DatabasePath, names: Vec<String>, max_opened: usize) -> Self {
        let pool = Self::empty(api, database, max_opened);
        pool.inner.opened().extend(names.iter().cloned());
        pool.inner.idle().extend(names);
        pool
    }

    #[cfg(test)]
    pub(crate) fn idle_count(&self) -> usize {
        self.inner.idle().len()
    }
}

/// A checked-out session; returned to the pool on drop.
pub(crate) struct SessionLease {
    name: Option<String>,
    pool: Arc<PoolInner>,
    _permit: OwnedSemaphorePermit,
}

impl SessionLease {
    pub(crate) fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}

impl Drop for SessionLease {
    fn drop(&mut self) {
        if let Some(name) = self.name.take()
            && !self.pool.permits.is_closed()
        {
            self.pool.idle().push(name);
        }
    }
}
