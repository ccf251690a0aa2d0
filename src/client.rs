//! HTTP transport used by the dispatcher workers

use crate::{
    error::{AppError, Result},
    models::{TestConfiguration, TransportError},
};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tokio::time::timeout;

/// The single HTTP operation a stress run needs
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Perform one GET and return the status code
    ///
    /// The response body must be released before this returns, whatever the
    /// outcome, so that concurrent workers never pin pooled connections.
    async fn get(&self, url: &str) -> std::result::Result<u16, TransportError>;
}

/// Connection pool settings for the shared client
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum number of idle connections kept per host
    pub max_idle_per_host: usize,
    /// Idle connection keep-alive
    pub idle_timeout: Option<Duration>,
    /// TCP keep-alive interval
    pub tcp_keep_alive: Option<Duration>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_idle_per_host: 10,
            idle_timeout: Some(Duration::from_secs(90)),
            tcp_keep_alive: Some(Duration::from_secs(60)),
        }
    }
}

impl PoolConfig {
    /// Keep one idle connection per worker
    pub fn for_concurrency(concurrency: usize) -> Self {
        Self {
            max_idle_per_host: concurrency.max(1),
            ..Default::default()
        }
    }
}

/// `reqwest`-backed transport; one instance is shared read-only by all workers
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    request_timeout: Duration,
}

impl ReqwestTransport {
    /// Create a transport with the given per-request timeout
    pub fn new(request_timeout: Duration) -> Result<Self> {
        Self::with_pool(request_timeout, PoolConfig::default())
    }

    /// Create a transport sized for a run
    pub fn for_run(config: &TestConfiguration) -> Result<Self> {
        Self::with_pool(config.per_request_timeout, PoolConfig::for_concurrency(config.concurrency))
    }

    pub fn with_pool(request_timeout: Duration, pool: PoolConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .timeout(request_timeout)
            .connect_timeout(request_timeout)
            .user_agent(crate::defaults::USER_AGENT)
            .pool_max_idle_per_host(pool.max_idle_per_host)
            .pool_idle_timeout(pool.idle_timeout);

        if let Some(keep_alive) = pool.tcp_keep_alive {
            builder = builder.tcp_keepalive(keep_alive);
        }

        let client = builder
            .build()
            .map_err(|e| AppError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, request_timeout })
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> std::result::Result<u16, TransportError> {
        let response = timeout(self.request_timeout, self.client.get(url).send())
            .await
            .map_err(|_| TransportError::timeout(self.request_timeout))?
            .map_err(TransportError::from)?;

        let status_code = response.status().as_u16();
        // Dropping the response releases its body and connection
        drop(response);

        Ok(status_code)
    }
}
