//! Request marking engine.
//!
//! Binds the static settings (service name, mark header, lookup field names)
//! to the shared [`RuleStore`] and applies the winning mark to a request.

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, Request};

use crate::config::MarkConfig;
use crate::observability::metrics;
use crate::rules::evaluator;
use crate::rules::identity::{LookupFields, RequestContext};
use crate::rules::store::{RuleSnapshot, RuleStore};
use crate::rules::types::Mark;

/// Static settings consulted on every evaluation.
#[derive(Debug, Clone)]
pub struct MarkSettings {
    pub service_name: String,
    pub mark_key: HeaderName,
    pub fields: LookupFields,
}

impl MarkSettings {
    /// Extract settings from a validated config.
    ///
    /// Falls back to `x-mark` if the configured key is not a header name,
    /// which validation already reports.
    pub fn from_config(config: &MarkConfig) -> Self {
        let mark_key = HeaderName::try_from(config.mark_key.as_str()).unwrap_or_else(|_| {
            tracing::warn!(mark_key = %config.mark_key, "Invalid mark key, using x-mark");
            HeaderName::from_static("x-mark")
        });

        Self {
            service_name: config.service_name.clone(),
            mark_key,
            fields: LookupFields {
                header_version: config.header_version.clone(),
                header_identify: config.header_identify.clone(),
                cookie_identify: config.cookie_identify.clone(),
                query_identify: config.query_identify.clone(),
            },
        }
    }
}

/// Evaluates the active rules against requests.
#[derive(Debug)]
pub struct MarkEngine {
    settings: MarkSettings,
    store: Arc<RuleStore>,
}

impl MarkEngine {
    pub fn new(settings: MarkSettings, store: Arc<RuleStore>) -> Self {
        Self { settings, store }
    }

    /// Build an engine whose store starts with the config's inline rules.
    pub fn from_config(config: &MarkConfig) -> Self {
        let store = RuleStore::new(RuleSnapshot::new(config.rules.clone()));
        metrics::record_active_rules(store.len());
        Self::new(MarkSettings::from_config(config), Arc::new(store))
    }

    pub fn store(&self) -> &Arc<RuleStore> {
        &self.store
    }

    pub fn settings(&self) -> &MarkSettings {
        &self.settings
    }

    /// Evaluate the current snapshot against a request.
    pub fn evaluate<B>(&self, req: &Request<B>) -> Option<Mark> {
        let snapshot = self.store.load();
        let ctx = RequestContext::from_request(req, &self.settings.fields);

        evaluator::first_match(snapshot.rules(), &ctx, &self.settings.service_name).map(|rule| {
            Mark {
                key: self.settings.mark_key.as_str().to_string(),
                value: rule.mark_value.clone(),
                rule: rule.name.clone(),
            }
        })
    }

    /// Evaluate and write the mark header onto the request.
    ///
    /// Returns the applied mark. An existing mark header is overwritten. A
    /// mark value that is not a valid header value leaves the request as is.
    pub fn apply<B>(&self, req: &mut Request<B>) -> Option<Mark> {
        let mark = self.evaluate(req)?;

        match HeaderValue::from_str(&mark.value) {
            Ok(value) => {
                req.headers_mut().insert(self.settings.mark_key.clone(), value);
                Some(mark)
            }
            Err(_) => {
                tracing::warn!(rule = %mark.rule, mark = %mark.value, "Mark value is not a valid header value");
                None
            }
        }
    }
}
