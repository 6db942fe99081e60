//! Wikipedia encyclopedia source (MediaWiki action API).

use super::{http_client, SourceAdapter};
use crate::passage::Passage;
use async_trait::async_trait;
use medquery_core::config::WikipediaSourceConfig;
use medquery_core::{AppError, AppResult};
use serde_json::Value;
use std::time::Duration;

/// Encyclopedia adapter.
///
/// Searches article titles, then fetches the plain-text extract of each hit.
pub struct WikipediaSource {
    lang: String,
    top_k: usize,
    max_chars: usize,
    timeout: Duration,
    client: reqwest::Client,
}

impl WikipediaSource {
    pub fn from_config(config: &WikipediaSourceConfig) -> AppResult<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);
        Ok(Self {
            lang: config.lang.clone(),
            top_k: config.top_k,
            max_chars: config.max_chars,
            timeout,
            client: http_client(timeout)?,
        })
    }

    fn api_url(&self) -> String {
        format!("https://{}.wikipedia.org/w/api.php", self.lang)
    }

    async fn get_json(&self, params: &[(&str, &str)]) -> AppResult<Value> {
        let response = self.client.get(self.api_url()).query(params).send().await?;

        if !response.status().is_success() {
            return Err(AppError::Retrieval(format!(
                "Wikipedia API returned {}",
                response.status()
            )));
        }

        Ok(response.json().await?)
    }

    async fn search_titles(&self, query: &str) -> AppResult<Vec<String>> {
        let limit = self.top_k.to_string();
        let body = self
            .get_json(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query),
                ("srlimit", limit.as_str()),
                ("format", "json"),
                ("formatversion", "2"),
            ])
            .await?;

        Ok(parse_search_titles(&body))
    }

    async fn fetch_page(&self, title: &str) -> AppResult<Option<Passage>> {
        let body = self
            .get_json(&[
                ("action", "query"),
                ("prop", "extracts|info"),
                ("explaintext", "1"),
                ("inprop", "url"),
                ("redirects", "1"),
                ("titles", title),
                ("format", "json"),
                ("formatversion", "2"),
            ])
            .await?;

        Ok(parse_page(&body, &self.lang, self.max_chars))
    }
}

/// Article titles from a `list=search` response, in rank order.
pub fn parse_search_titles(body: &Value) -> Vec<String> {
    body.pointer("/query/search")
        .and_then(Value::as_array)
        .map(|hits| {
            hits.iter()
                .filter_map(|hit| hit.get("title").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Passage for the first page of a `prop=extracts` response.
///
/// Content is the article text cut to `max_chars` characters; `summary`
/// holds the lead paragraph and `source` the article URL.
pub fn parse_page(body: &Value, lang: &str, max_chars: usize) -> Option<Passage> {
    let page = body.pointer("/query/pages")?.as_array()?.first()?;
    if page.get("missing").is_some() {
        return None;
    }

    let title = page.get("title").and_then(Value::as_str)?;
    let extract = page.get("extract").and_then(Value::as_str).unwrap_or_default();
    if extract.trim().is_empty() {
        return None;
    }

    let url = page
        .get("fullurl")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| article_url(lang, title));

    let summary = extract
        .split("\n\n")
        .map(str::trim)
        .find(|paragraph| !paragraph.is_empty())
        .unwrap_or_default();

    Some(
        Passage::new(extract.chars().take(max_chars).collect::<String>())
            .with_meta("title", title)
            .with_meta("summary", summary)
            .with_meta("source", url),
    )
}

/// Canonical article URL for a title.
pub fn article_url(lang: &str, title: &str) -> String {
    format!(
        "https://{}.wikipedia.org/wiki/{}",
        lang,
        urlencoding::encode(&title.replace(' ', "_"))
    )
}

#[async_trait]
impl SourceAdapter for WikipediaSource {
    fn name(&self) -> &str {
        "wikipedia"
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn search(&self, query: &str) -> AppResult<Vec<Passage>> {
        let titles = self.search_titles(query).await?;

        let mut passages = Vec::with_capacity(titles.len());
        for title in titles.iter().take(self.top_k) {
            if let Some(passage) = self.fetch_page(title).await? {
                passages.push(passage);
            }
        }

        Ok(passages)
    }
}
