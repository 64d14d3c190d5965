//! Periodic rule refresh.
//!
//! # Responsibilities
//! - Pull rule records from the store on a fixed interval
//! - Parse records, skipping the ones that fail
//! - Install the sorted result into the [`RuleStore`]
//!
//! # Design Decisions
//! - A cycle that yields no rules (empty key list, or no record parsed)
//!   is a failed cycle: the previous snapshot stays in force
//! - A failed cycle never stops the loop; only shutdown does
//! - Shutdown is observed while waiting for the tick and mid-cycle

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::broadcast;
use tokio::time::{self, MissedTickBehavior};

use crate::config::RedisConfig;
use crate::observability::metrics;
use crate::refresh::source::{RuleSource, StoreError};
use crate::rules::parser::parse_rule;
use crate::rules::store::{RuleSnapshot, RuleStore};

/// Why a refresh cycle installed nothing.
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("rule key list `{0}` is empty")]
    EmptyKeyList(String),

    #[error("none of the {0} rule records could be loaded")]
    NoParseableRules(usize),
}

/// Outcome of a successful refresh cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshReport {
    /// Rules installed.
    pub loaded: usize,
    /// Records skipped because they could not be fetched or parsed.
    pub skipped: usize,
}

/// Background task keeping a [`RuleStore`] in sync with the rule store.
pub struct Refresher<S> {
    source: S,
    store: Arc<RuleStore>,
    config: RedisConfig,
}

impl<S: RuleSource> Refresher<S> {
    pub fn new(source: S, store: Arc<RuleStore>, config: RedisConfig) -> Self {
        Self {
            source,
            store,
            config,
        }
    }

    /// Dial the store once.
    ///
    /// A failure is logged and otherwise ignored: the service keeps its
    /// current rules and the next cycle dials again.
    pub async fn connect(&mut self) -> bool {
        match self.source.connect().await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(
                    address = %self.config.address,
                    error = %e,
                    "Rule store unreachable, serving current rules until it recovers"
                );
                false
            }
        }
    }

    /// Run one refresh cycle.
    pub async fn refresh_once(&mut self) -> Result<RefreshReport, RefreshError> {
        let keys = self
            .source
            .rule_keys(&self.config.rules_key, self.config.rule_max_len)
            .await?;

        if keys.is_empty() {
            return Err(RefreshError::EmptyKeyList(self.config.rules_key.clone()));
        }

        let mut rules = Vec::with_capacity(keys.len());
        for key in &keys {
            let fields = match self.source.rule_fields(key).await {
                Ok(fields) => fields,
                Err(e) => {
                    tracing::error!(key = %key, error = %e, "Failed to fetch rule");
                    continue;
                }
            };

            match parse_rule(&fields) {
                Ok(rule) => rules.push(rule),
                Err(e) => {
                    tracing::error!(key = %key, error = %e, "Failed to parse rule");
                    metrics::record_parse_failure();
                }
            }
        }

        if rules.is_empty() {
            return Err(RefreshError::NoParseableRules(keys.len()));
        }

        let report = RefreshReport {
            loaded: rules.len(),
            skipped: keys.len() - rules.len(),
        };
        self.store.replace(RuleSnapshot::new(rules));
        Ok(report)
    }

    /// Run the refresh loop until shutdown.
    ///
    /// The first cycle runs immediately.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval = self.config.load_interval_secs,
            rules_key = %self.config.rules_key,
            "Rule refresher starting"
        );

        let interval = Duration::from_secs(self.config.load_interval_secs.max(1));
        let mut ticker = time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tokio::select! {
            _ = self.connect() => {}
            _ = shutdown.recv() => {
                tracing::info!("Rule refresher stopped before first refresh");
                return;
            }
        }

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.recv() => break,
            }

            let result = tokio::select! {
                result = self.refresh_once() => result,
                _ = shutdown.recv() => break,
            };

            match result {
                Ok(report) => {
                    tracing::debug!(rules = report.loaded, skipped = report.skipped, "Rules reloaded");
                    metrics::record_refresh(true);
                    metrics::record_active_rules(report.loaded);
                }
                Err(e) => {
                    tracing::error!(error = %e, rules = self.store.len(), "Rule refresh failed, keeping current rules");
                    metrics::record_refresh(false);
                }
            }
        }

        tracing::info!("Rule refresher received shutdown signal, exiting loop");
    }
}
