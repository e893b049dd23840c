use std::sync::Arc;

use crate::db::{AccumulationStore, Catalog};
use crate::services::BatchForwarder;

/// Shared state of the recommendation API
#[derive(Clone)]
pub struct RecommenderState {
    /// Read-only after startup, hence no lock
    pub catalog: Arc<Catalog>,
    pub forwarder: Arc<dyn BatchForwarder>,
}

impl RecommenderState {
    pub fn new(catalog: Catalog, forwarder: impl BatchForwarder + 'static) -> Self {
        Self {
            catalog: Arc::new(catalog),
            forwarder: Arc::new(forwarder),
        }
    }
}

/// Shared state of the aggregator dashboard
#[derive(Clone, Default)]
pub struct AggregatorState {
    pub store: Arc<AccumulationStore>,
}

impl AggregatorState {
    pub fn new(store: Arc<AccumulationStore>) -> Self {
        Self { store }
    }
}
