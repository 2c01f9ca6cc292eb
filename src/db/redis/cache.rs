use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::AsyncCommands;
use redis::Client;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, OnceCell};

use crate::error::AppError;
use crate::error::AppResult;
use crate::models::ExternalId;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Descriptive payload for a movie, per response language
    MovieDetails { id: ExternalId, language: String },
    /// Credits payload for a movie, per response language
    MovieCredits { id: ExternalId, language: String },
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::MovieDetails { id, language } => {
                write!(f, "details:{}:{}", language.to_lowercase(), id)
            }
            CacheKey::MovieCredits { id, language } => {
                write!(f, "credits:{}:{}", language.to_lowercase(), id)
            }
        }
    }
}

/// Creates a Redis client for caching
///
/// Only parses the URL; the first connection is made lazily on use.
pub fn create_redis_client(redis_url: &str) -> AppResult<Client> {
    Client::open(redis_url)
        .map_err(|e| AppError::Configuration(format!("Invalid REDIS_URL: {}", e)))
}

/// Message for asynchronous cache writes
struct CacheWriteMessage {
    key: String,
    value: String,
    ttl: u64,
}

/// One long-lived connection shared by readers and the writer task.
///
/// Established on first use, so a Redis outage at startup does not block
/// the service. Every operation through it is bounded by `timeout`.
#[derive(Clone)]
struct SharedConnection {
    client: Client,
    manager: Arc<OnceCell<ConnectionManager>>,
    timeout: Duration,
}

impl SharedConnection {
    async fn get(&self) -> AppResult<ConnectionManager> {
        let manager = self
            .manager
            .get_or_try_init(|| {
                let config = ConnectionManagerConfig::new()
                    .set_connection_timeout(self.timeout)
                    .set_response_timeout(self.timeout)
                    .set_number_of_retries(1);
                ConnectionManager::new_with_config(self.client.clone(), config)
            })
            .await?;
        Ok(manager.clone())
    }

    /// Runs a cache operation, failing with `CacheTimeout` once `timeout` elapses
    async fn bounded<T, Fut>(&self, operation: Fut) -> AppResult<T>
    where
        Fut: Future<Output = AppResult<T>>,
    {
        tokio::time::timeout(self.timeout, operation)
            .await
            .map_err(|_| AppError::CacheTimeout(self.timeout))?
    }
}

/// Cache handler for storing and retrieving provider payloads in Redis
#[derive(Clone)]
pub struct Cache {
    connection: SharedConnection,
    write_tx: mpsc::UnboundedSender<CacheWriteMessage>,
}

/// Handle for gracefully shutting down the cache writer
pub struct CacheWriterHandle {
    shutdown_tx: mpsc::Sender<()>,
    task: tokio::task::JoinHandle<()>,
}

impl CacheWriterHandle {
    /// Signals the writer task and waits until pending writes are flushed
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Cache writer task failed");
        }
        tracing::info!("Cache writer stopped");
    }
}

impl Cache {
    /// Creates a new Cache instance with an async write background task
    ///
    /// Writes are queued on a channel so that storing a payload never delays
    /// the lookup that produced it. `timeout` bounds every Redis round trip,
    /// connecting included.
    pub fn new(redis_client: Client, timeout: Duration) -> (Self, CacheWriterHandle) {
        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let connection = SharedConnection {
            client: redis_client,
            manager: Arc::new(OnceCell::new()),
            timeout,
        };

        let writer_connection = connection.clone();
        let task = tokio::spawn(async move {
            Self::cache_writer_task(writer_connection, write_rx, shutdown_rx).await;
        });

        let cache = Self {
            connection,
            write_tx,
        };

        (cache, CacheWriterHandle { shutdown_tx, task })
    }

    /// Background task that drains cache write messages
    ///
    /// On shutdown, everything already queued is flushed before exiting.
    async fn cache_writer_task(
        connection: SharedConnection,
        mut write_rx: mpsc::UnboundedReceiver<CacheWriteMessage>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        tracing::debug!("Cache writer task started");

        loop {
            tokio::select! {
                Some(msg) = write_rx.recv() => {
                    if let Err(e) = Self::write_to_redis(&connection, msg).await {
                        tracing::warn!(error = %e, "Failed to write to Redis cache");
                    }
                }
                _ = shutdown_rx.recv() => {
                    write_rx.close();
                    let mut flushed = 0usize;
                    while let Some(msg) = write_rx.recv().await {
                        if let Err(e) = Self::write_to_redis(&connection, msg).await {
                            tracing::warn!(error = %e, "Failed to flush cache write during shutdown");
                        } else {
                            flushed += 1;
                        }
                    }
                    tracing::info!(flushed, "Cache writer flushed pending writes");
                    break;
                }
            }
        }
    }

    async fn write_to_redis(connection: &SharedConnection, msg: CacheWriteMessage) -> AppResult<()> {
        connection
            .bounded(async move {
                let mut conn = connection.get().await?;
                let _: () = conn.set_ex(msg.key, msg.value, msg.ttl).await?;
                Ok::<_, AppError>(())
            })
            .await
    }

    /// Retrieves and deserializes a cached value, `None` on a miss
    ///
    /// An unresponsive Redis yields `CacheTimeout` rather than stalling the caller.
    pub async fn get_from_cache<T: serde::de::DeserializeOwned>(
        &self,
        key: &CacheKey,
    ) -> AppResult<Option<T>> {
        let cached: Option<String> = self
            .connection
            .bounded(async move {
                let mut conn = self.connection.get().await?;
                let cached: Option<String> = conn.get(key.to_string()).await?;
                Ok::<_, AppError>(cached)
            })
            .await?;

        match cached {
            Some(json) => {
                let data = serde_json::from_str(&json).map_err(|e| {
                    AppError::Internal(format!("Cache deserialization error: {}", e))
                })?;
                Ok(Some(data))
            }
            None => Ok(None),
        }
    }

    /// Queues a value for storage without waiting for Redis
    pub fn set_in_background<T: serde::Serialize>(&self, key: &CacheKey, value: &T, ttl: u64) {
        let json = match serde_json::to_string(value) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!(error = %e, "Cache serialization error");
                return;
            }
        };

        let msg = CacheWriteMessage {
            key: key.to_string(),
            value: json,
            ttl,
        };

        if let Err(e) = self.write_tx.send(msg) {
            tracing::error!(error = %e, "Failed to send cache write message");
        }
    }
}
