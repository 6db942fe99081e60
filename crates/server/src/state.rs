//! Shared handler state.

use medquery_core::config::ServerConfig;
use medquery_retrieval::QueryPipeline;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<QueryPipeline>,

    /// End-to-end deadline for one `/query` request
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(pipeline: QueryPipeline, config: &ServerConfig) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }
}
