//! Fan-out retrieval across all registered sources.

use crate::passage::Passage;
use crate::sources::{adapters_from_config, SourceAdapter};
use futures::future::join_all;
use medquery_core::config::SourcesConfig;
use medquery_core::AppResult;
use std::sync::Arc;

/// Queries every adapter and concatenates their passages.
///
/// Adapters run concurrently, but the output is always grouped in
/// registration order, each adapter's passages in the order it returned
/// them. A failing or slow adapter contributes nothing and never fails the
/// merge. No deduplication is performed.
pub struct RetrievalMerger {
    adapters: Vec<Arc<dyn SourceAdapter>>,
}

impl RetrievalMerger {
    pub fn new(adapters: Vec<Arc<dyn SourceAdapter>>) -> Self {
        Self { adapters }
    }

    /// Merger over the enabled sources in the standard order.
    pub fn from_config(config: &SourcesConfig) -> AppResult<Self> {
        Ok(Self::new(adapters_from_config(config)?))
    }

    /// Names of the registered adapters, in order.
    pub fn adapter_names(&self) -> Vec<&str> {
        self.adapters.iter().map(|adapter| adapter.name()).collect()
    }

    pub async fn retrieve(&self, query: &str) -> Vec<Passage> {
        let results = join_all(self.adapters.iter().map(|adapter| adapter.retrieve(query))).await;

        let mut merged = Vec::new();
        for (adapter, passages) in self.adapters.iter().zip(results) {
            tracing::debug!(source = adapter.name(), count = passages.len(), "Merged passages");
            merged.extend(passages);
        }

        tracing::info!(
            sources = self.adapters.len(),
            passages = merged.len(),
            "Retrieval complete"
        );

        merged
    }
}
