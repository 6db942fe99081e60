//! Knowledge source adapters.
//!
//! Each adapter turns a free-text query into zero or more [`Passage`]s
//! from one external source. Adapters report failures through
//! [`SourceAdapter::search`]; [`SourceAdapter::retrieve`] is what the
//! merger calls, and it never fails: errors and timeouts degrade to an
//! empty list.

pub mod duckduckgo;
pub mod openfda;
pub mod pubmed;
pub mod wikipedia;

pub use duckduckgo::DuckDuckGoSource;
pub use openfda::OpenFdaSource;
pub use pubmed::{PubMedArticle, PubMedClient, PubMedSource};
pub use wikipedia::WikipediaSource;

use crate::passage::Passage;
use async_trait::async_trait;
use medquery_core::config::SourcesConfig;
use medquery_core::{AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;

/// User agent sent to every external source.
pub const USER_AGENT: &str = concat!("medquery/", env!("CARGO_PKG_VERSION"));

/// Deadline applied when an adapter does not declare its own.
pub const DEFAULT_SOURCE_TIMEOUT: Duration = Duration::from_secs(10);

/// A single external knowledge source.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Stable name used in logs.
    fn name(&self) -> &str;

    /// Deadline for one retrieval.
    fn timeout(&self) -> Duration {
        DEFAULT_SOURCE_TIMEOUT
    }

    /// Query the source, surfacing any failure.
    async fn search(&self, query: &str) -> AppResult<Vec<Passage>>;

    /// Query the source, degrading failures and timeouts to an empty list.
    async fn retrieve(&self, query: &str) -> Vec<Passage> {
        match tokio::time::timeout(self.timeout(), self.search(query)).await {
            Ok(Ok(passages)) => {
                tracing::debug!(source = self.name(), count = passages.len(), "Source returned passages");
                passages
            }
            Ok(Err(e)) => {
                tracing::warn!(source = self.name(), error = %e, "Source failed, continuing without it");
                Vec::new()
            }
            Err(_) => {
                tracing::warn!(
                    source = self.name(),
                    timeout_ms = self.timeout().as_millis() as u64,
                    "Source timed out, continuing without it"
                );
                Vec::new()
            }
        }
    }
}

/// Build an HTTP client for an adapter.
pub(crate) fn http_client(timeout: Duration) -> AppResult<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(|e| AppError::Http(format!("Failed to build HTTP client: {}", e)))
}

/// Build the enabled adapters in registration order: literature,
/// encyclopedia, web search, drug labels.
pub fn adapters_from_config(config: &SourcesConfig) -> AppResult<Vec<Arc<dyn SourceAdapter>>> {
    let mut adapters: Vec<Arc<dyn SourceAdapter>> = Vec::new();

    if config.pubmed.enabled {
        adapters.push(Arc::new(PubMedSource::from_config(&config.pubmed)?));
    }
    if config.wikipedia.enabled {
        adapters.push(Arc::new(WikipediaSource::from_config(&config.wikipedia)?));
    }
    if config.web.enabled {
        adapters.push(Arc::new(DuckDuckGoSource::from_config(&config.web)?));
    }
    if config.openfda.enabled {
        adapters.push(Arc::new(OpenFdaSource::from_config(&config.openfda)?));
    }

    Ok(adapters)
}

/// Serve `router` on an ephemeral local port and return its base URL.
#[cfg(test)]
pub(crate) async fn serve_locally(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
    format!("http://{}", addr)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing;

    #[async_trait]
    impl SourceAdapter for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        async fn search(&self, _query: &str) -> AppResult<Vec<Passage>> {
            Err(AppError::Retrieval("upstream returned 500".to_string()))
        }
    }

    struct Slow;

    #[async_trait]
    impl SourceAdapter for Slow {
        fn name(&self) -> &str {
            "slow"
        }

        fn timeout(&self) -> Duration {
            Duration::from_millis(20)
        }

        async fn search(&self, _query: &str) -> AppResult<Vec<Passage>> {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Ok(vec![Passage::new("too late")])
        }
    }

    #[tokio::test]
    async fn test_retrieve_swallows_errors() {
        assert!(Failing.retrieve("aspirin").await.is_empty());
    }

    #[tokio::test]
    async fn test_retrieve_enforces_timeout() {
        assert!(Slow.retrieve("aspirin").await.is_empty());
    }

    #[test]
    fn test_adapters_registration_order() {
        let adapters = adapters_from_config(&SourcesConfig::default()).unwrap();
        let names: Vec<&str> = adapters.iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["pubmed", "wikipedia", "duckduckgo", "openfda"]);
    }

    #[test]
    fn test_disabled_adapters_skipped() {
        let mut config = SourcesConfig::default();
        config.web.enabled = false;
        config.openfda.enabled = false;

        let adapters = adapters_from_config(&config).unwrap();
        let names: Vec<&str> = adapters.iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["pubmed", "wikipedia"]);
    }
}
