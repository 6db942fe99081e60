//! Bulk PubMed abstract export for offline corpus building.

use crate::sources::{PubMedArticle, PubMedClient};
use medquery_core::AppResult;
use std::path::Path;
use std::time::Duration;

/// Articles requested per efetch call.
pub const FETCH_BATCH_SIZE: usize = 200;

/// Pause between batches, keeping under the E-utilities rate limit.
pub const BATCH_PAUSE: Duration = Duration::from_millis(500);

/// Search PubMed and download up to `count` abstracts.
///
/// Articles without an abstract are dropped, so fewer than `count` may be
/// returned. Unlike live retrieval, failures propagate.
pub async fn fetch_abstracts(
    client: &PubMedClient,
    query: &str,
    count: usize,
) -> AppResult<Vec<PubMedArticle>> {
    let ids = client.search_ids(query, count).await?;
    tracing::info!(query, found = ids.len(), "PubMed search complete");

    let mut articles = Vec::with_capacity(ids.len());
    for (index, batch) in ids.chunks(FETCH_BATCH_SIZE).enumerate() {
        if index > 0 {
            tokio::time::sleep(BATCH_PAUSE).await;
        }

        let fetched = client.fetch_articles(batch).await?;
        tracing::info!(
            batch = index + 1,
            requested = batch.len(),
            kept = fetched.len(),
            "Fetched PubMed batch"
        );
        articles.extend(fetched);
    }

    Ok(articles)
}

/// Write articles as a pretty-printed JSON array of `{pmid, title, abstract}`.
pub fn write_articles(path: &Path, articles: &[PubMedArticle]) -> AppResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(articles)?;
    std::fs::write(path, json)?;

    tracing::info!(path = %path.display(), count = articles.len(), "Saved abstracts");
    Ok(())
}
