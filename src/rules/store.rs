//! Active rule list with atomic replacement.
//!
//! ```text
//! Request  -> RuleStore::load()    -> ArcSwap::load()  -> RuleSnapshot
//!                                        (lock-free read)
//! Refresh  -> RuleStore::replace() -> ArcSwap::store() -> old snapshot dropped
//!                                                         when readers finish
//! ```

use std::sync::Arc;

use arc_swap::{ArcSwap, Guard};

use crate::rules::types::{sort_by_priority, Rule};

/// An immutable, priority-sorted rule list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSnapshot {
    rules: Vec<Rule>,
}

impl RuleSnapshot {
    /// Build a snapshot, sorting `rules` by descending priority.
    pub fn new(mut rules: Vec<Rule>) -> Self {
        sort_by_priority(&mut rules);
        Self { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Holds the snapshot in force.
///
/// One writer (the refresher) and any number of readers. Readers never
/// block and always see a complete snapshot.
#[derive(Debug)]
pub struct RuleStore {
    current: ArcSwap<RuleSnapshot>,
}

impl RuleStore {
    pub fn new(snapshot: RuleSnapshot) -> Self {
        Self {
            current: ArcSwap::from_pointee(snapshot),
        }
    }

    /// Current snapshot. Hold the guard for the whole evaluation so the
    /// request sees one consistent list.
    pub fn load(&self) -> Guard<Arc<RuleSnapshot>> {
        self.current.load()
    }

    /// Install a new snapshot.
    pub fn replace(&self, snapshot: RuleSnapshot) {
        self.current.store(Arc::new(snapshot));
    }

    pub fn len(&self) -> usize {
        self.current.load().len()
    }
}

impl Default for RuleStore {
    fn default() -> Self {
        Self::new(RuleSnapshot::default())
    }
}
