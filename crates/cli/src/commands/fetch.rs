//! Fetch-pubmed command handler.
//!
//! Downloads abstracts for offline corpus building.

use clap::Args;
use medquery_core::{config::AppConfig, AppResult};
use medquery_retrieval::bulk::{fetch_abstracts, write_articles};
use medquery_retrieval::sources::{PubMedArticle, PubMedClient};
use std::path::{Path, PathBuf};
use std::time::Duration;

const FETCH_TIMEOUT: Duration = Duration::from_secs(60);

/// Download PubMed abstracts to a JSON file
#[derive(Args, Debug)]
pub struct FetchPubMedCommand {
    /// PubMed search query
    pub query: String,

    /// Number of articles to request
    #[arg(short = 'n', long, default_value_t = 50)]
    pub count: usize,

    /// Output file
    #[arg(short, long, default_value = "pubmed_data.json")]
    pub output: PathBuf,
}

impl FetchPubMedCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!(query = %self.query, count = self.count, "Fetching PubMed abstracts");

        let client = PubMedClient::new(&config.sources.pubmed.base_url, FETCH_TIMEOUT)?;
        let articles = fetch_abstracts(&client, &self.query, self.count).await?;

        println!("{}", save_results(&self.output, &articles)?);

        Ok(())
    }
}

/// Write `articles` to `output` and return the summary line.
///
/// Nothing is written when the search came back empty.
fn save_results(output: &Path, articles: &[PubMedArticle]) -> AppResult<String> {
    if articles.is_empty() {
        tracing::warn!(path = %output.display(), "No abstracts found; nothing written");
        return Ok("No results found.".to_string());
    }

    write_articles(output, articles)?;
    Ok(format!(
        "Saved {} abstracts to {}",
        articles.len(),
        output.display()
    ))
}
