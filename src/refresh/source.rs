//! External rule store access.
//!
//! # Responsibilities
//! - Dial the store and authenticate
//! - Fetch the list of rule record keys (`LRANGE`)
//! - Fetch one rule record as flat field/value entries (`HGETALL`)
//!
//! # Design Decisions
//! - [`RuleSource`] is the seam the refresher is generic over, so refresh
//!   behaviour can be exercised without a live store
//! - A connection-level failure drops the connection; the next call redials
//! - Every round trip is bounded by the response timeout; a store that
//!   accepts the connection but never answers counts as a lost connection

use std::future::Future;
use std::time::Duration;

use redis::aio::MultiplexedConnection;
use redis::{Client, RedisError};
use thiserror::Error;

use crate::config::RedisConfig;

/// Errors talking to the rule store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("redis error: {0}")]
    Redis(#[from] RedisError),

    #[error("not connected to rule store at {0}")]
    Disconnected(String),

    #[error("rule store at {0} did not answer within {1:?}")]
    Timeout(String, Duration),
}

/// Source of raw rule records.
pub trait RuleSource: Send {
    /// Establish (or re-establish) the connection.
    fn connect(&mut self) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Keys of the rule records, in list order.
    fn rule_keys(
        &mut self,
        list_key: &str,
        max_len: i64,
    ) -> impl Future<Output = Result<Vec<String>, StoreError>> + Send;

    /// Alternating field/value entries of one rule record.
    fn rule_fields(
        &mut self,
        rule_key: &str,
    ) -> impl Future<Output = Result<Vec<String>, StoreError>> + Send;
}

/// [`RuleSource`] backed by a Redis-compatible server.
pub struct RedisRuleSource {
    address: String,
    password: String,
    timeout: Duration,
    conn: Option<MultiplexedConnection>,
}

impl RedisRuleSource {
    pub fn new(config: &RedisConfig) -> Self {
        Self {
            address: config.address.clone(),
            password: config.password.clone(),
            timeout: Duration::from_secs(config.response_timeout_secs.max(1)),
            conn: None,
        }
    }

    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    async fn connection(&mut self) -> Result<MultiplexedConnection, StoreError> {
        if self.conn.is_none() {
            self.connect().await?;
        }
        self.conn
            .clone()
            .ok_or_else(|| StoreError::Disconnected(self.address.clone()))
    }

    /// Await `fut`, giving up after the response timeout.
    async fn bounded<T, F>(&mut self, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, RedisError>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => self.check(result),
            Err(_) => {
                tracing::warn!(address = %self.address, timeout = ?self.timeout, "Rule store did not answer");
                self.conn = None;
                Err(StoreError::Timeout(self.address.clone(), self.timeout))
            }
        }
    }

    fn check<T>(&mut self, result: Result<T, RedisError>) -> Result<T, StoreError> {
        result.map_err(|e| {
            if e.is_io_error() || e.is_connection_dropped() || e.is_connection_refusal() {
                tracing::warn!(address = %self.address, error = %e, "Rule store connection lost");
                self.conn = None;
            }
            StoreError::Redis(e)
        })
    }
}

impl RuleSource for RedisRuleSource {
    async fn connect(&mut self) -> Result<(), StoreError> {
        self.conn = None;

        let client = Client::open(format!("redis://{}/", self.address))?;
        let mut conn = self
            .bounded(client.get_multiplexed_async_connection())
            .await?;

        if !self.password.is_empty() {
            let mut auth = conn.clone();
            let password = self.password.clone();
            let _: () = self
                .bounded(async move { redis::cmd("AUTH").arg(password).query_async(&mut auth).await })
                .await?;
        }

        tracing::info!(address = %self.address, "Connected to rule store");
        self.conn = Some(conn);
        Ok(())
    }

    async fn rule_keys(&mut self, list_key: &str, max_len: i64) -> Result<Vec<String>, StoreError> {
        let mut conn = self.connection().await?;
        let mut cmd = redis::cmd("LRANGE");
        cmd.arg(list_key).arg(0).arg(max_len);
        self.bounded(async move { cmd.query_async(&mut conn).await })
            .await
    }

    async fn rule_fields(&mut self, rule_key: &str) -> Result<Vec<String>, StoreError> {
        let mut conn = self.connection().await?;
        let mut cmd = redis::cmd("HGETALL");
        cmd.arg(rule_key);
        self.bounded(async move { cmd.query_async(&mut conn).await })
            .await
    }
}
