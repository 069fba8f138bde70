/*!
 * Run-scoped state.
 *
 * A `RunContext` owns every catalog taking part in one run, keyed by its
 * (source, target) pair, along with the batches planned for each of them.
 * Independent runs use independent contexts.
 */

use std::collections::HashMap;

use log::warn;
use uuid::Uuid;

use super::planner::{Batch, Plan};
use super::task::CatalogPair;
use crate::catalog::{Catalog, SyncReport};
use crate::errors::CatalogError;

/// A target catalog registered in a run, with everything derived from it
#[derive(Debug, Clone)]
pub struct RegisteredPair {
    pub pair: CatalogPair,
    /// Target locale tag
    pub locale: String,
    pub source: Catalog,
    pub target: Catalog,
    /// Result of the last synchronization
    pub sync: SyncReport,
    /// Batches planned from the target backlog
    pub plan: Plan,
    /// Entries written by merged task outcomes
    pub keys_written: usize,
}

impl RegisteredPair {
    /// Batches planned for one context
    pub fn batches(&self, context: &str) -> Option<&[Batch]> {
        self.plan
            .contexts
            .iter()
            .find(|plan| plan.context == context)
            .map(|plan| plan.batches.as_slice())
    }

    /// Whether the target differs from what was loaded
    pub fn is_modified(&self) -> bool {
        self.sync.changed() || self.keys_written > 0
    }
}

/// All catalogs and planned batches of one run
#[derive(Debug, Clone)]
pub struct RunContext {
    id: Uuid,
    pairs: Vec<RegisteredPair>,
    index: HashMap<CatalogPair, usize>,
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RunContext {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            pairs: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Identifier used to correlate log lines of one run
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Register a target catalog and its source.
    ///
    /// Registering the same pair again replaces its catalogs in place and
    /// discards any previous plan.
    pub fn register(&mut self, pair: CatalogPair, locale: impl Into<String>, source: Catalog, target: Catalog) {
        let registered = RegisteredPair {
            pair: pair.clone(),
            locale: locale.into(),
            source,
            target,
            sync: SyncReport::default(),
            plan: Plan::default(),
            keys_written: 0,
        };

        match self.index.get(&pair) {
            Some(&position) => {
                warn!("Catalog pair {} registered twice; replacing it", pair);
                self.pairs[position] = registered;
            }
            None => {
                self.index.insert(pair, self.pairs.len());
                self.pairs.push(registered);
            }
        }
    }

    /// Registered pairs in registration order
    pub fn pairs(&self) -> std::slice::Iter<'_, RegisteredPair> {
        self.pairs.iter()
    }

    pub fn pairs_mut(&mut self) -> std::slice::IterMut<'_, RegisteredPair> {
        self.pairs.iter_mut()
    }

    pub fn get(&self, pair: &CatalogPair) -> Option<&RegisteredPair> {
        self.index.get(pair).map(|&position| &self.pairs[position])
    }

    pub fn get_mut(&mut self, pair: &CatalogPair) -> Option<&mut RegisteredPair> {
        match self.index.get(pair) {
            Some(&position) => Some(&mut self.pairs[position]),
            None => None,
        }
    }

    /// Target catalog of a pair
    pub fn catalog(&self, pair: &CatalogPair) -> Option<&Catalog> {
        self.get(pair).map(|registered| &registered.target)
    }

    /// Target catalog of a pair, failing when the pair is unknown
    pub fn catalog_mut(&mut self, pair: &CatalogPair) -> Result<&mut Catalog, CatalogError> {
        self.get_mut(pair)
            .map(|registered| &mut registered.target)
            .ok_or_else(|| CatalogError::Unregistered(pair.to_string()))
    }

    /// Batches planned for one context of a pair
    pub fn batches(&self, pair: &CatalogPair, context: &str) -> Option<&[Batch]> {
        self.get(pair).and_then(|registered| registered.batches(context))
    }

    /// Total number of planned batches
    pub fn task_count(&self) -> usize {
        self.pairs.iter().map(|registered| registered.plan.batch_count()).sum()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
