//! Connection Pool
//!
//! Fixed-budget pool that every in-process store operation checks a
//! connection out of. `max_size` bounds concurrency; `min_size` is only
//! checked against it, since in-process connections cost nothing to keep.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::warn;

use crate::config::PoolConfig;
use crate::error::{Result, TodoError};

// == Connection Pool ==
/// Bounds concurrent store operations and applies the pool timeouts.
#[derive(Debug, Clone)]
pub struct ConnectionPool {
    permits: Arc<Semaphore>,
    config: PoolConfig,
}

impl ConnectionPool {
    /// Creates a pool with `config.max_size` connections.
    pub fn new(config: PoolConfig) -> Result<Self> {
        if config.max_size == 0 {
            return Err(TodoError::Internal(
                "max pool size must be at least 1".to_string(),
            ));
        }
        if config.min_size > config.max_size {
            return Err(TodoError::Internal(format!(
                "min pool size {} exceeds max pool size {}",
                config.min_size, config.max_size
            )));
        }

        Ok(Self {
            permits: Arc::new(Semaphore::new(config.max_size)),
            config,
        })
    }

    /// Number of connections not currently checked out.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    // == Run ==
    /// Runs `op` on a checked-out connection.
    ///
    /// Waiting for a connection is bounded by the server-selection timeout
    /// and the operation itself by the socket timeout. The connection is
    /// returned when the call completes, on every path.
    pub async fn run<F, T>(&self, op: F) -> Result<T>
    where
        F: Future<Output = T>,
    {
        let _permit = timeout(self.config.server_selection_timeout, self.permits.acquire())
            .await
            .map_err(|_| {
                warn!("Timed out waiting for a store connection");
                TodoError::Unavailable("no store connection available".to_string())
            })?
            .map_err(|_| TodoError::Unavailable("store connection pool is closed".to_string()))?;

        timeout(self.config.socket_timeout, op).await.map_err(|_| {
            warn!("Store operation exceeded socket timeout");
            TodoError::Unavailable("store operation timed out".to_string())
        })
    }

    /// Closes the pool; pending and future checkouts fail.
    pub fn close(&self) {
        self.permits.close();
    }

    pub fn is_closed(&self) -> bool {
        self.permits.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn pool_config(max_size: usize, wait_ms: u64) -> PoolConfig {
        PoolConfig {
            min_size: 0,
            max_size,
            connect_timeout: Duration::from_millis(wait_ms),
            socket_timeout: Duration::from_millis(wait_ms),
            server_selection_timeout: Duration::from_millis(wait_ms),
        }
    }

    #[test]
    fn test_pool_rejects_bad_budget() {
        assert!(ConnectionPool::new(pool_config(0, 10)).is_err());

        let mut config = pool_config(2, 10);
        config.min_size = 3;
        assert!(ConnectionPool::new(config).is_err());
    }

    #[tokio::test]
    async fn test_pool_runs_and_releases() {
        let pool = ConnectionPool::new(pool_config(2, 100)).unwrap();
        let value = pool.run(async { 7 }).await.unwrap();
        assert_eq!(value, 7);
        assert_eq!(pool.available(), 2);
    }

    #[tokio::test]
    async fn test_pool_exhaustion_is_unavailable() {
        let pool = ConnectionPool::new(pool_config(1, 50)).unwrap();
        let held = pool.permits.clone().acquire_owned().await.unwrap();

        let result = pool.run(async {}).await;
        assert!(matches!(result, Err(TodoError::Unavailable(_))));

        drop(held);
        assert!(pool.run(async {}).await.is_ok());
    }

    #[tokio::test]
    async fn test_pool_socket_timeout() {
        let pool = ConnectionPool::new(pool_config(1, 20)).unwrap();
        let result = pool
            .run(tokio::time::sleep(Duration::from_millis(200)))
            .await;
        assert!(matches!(result, Err(TodoError::Unavailable(_))));
        assert_eq!(pool.available(), 1);
    }

    #[tokio::test]
    async fn test_closed_pool_is_unavailable() {
        let pool = ConnectionPool::new(pool_config(1, 50)).unwrap();
        pool.close();
        assert!(pool.is_closed());
        assert!(matches!(
            pool.run(async {}).await,
            Err(TodoError::Unavailable(_))
        ));
    }
}
