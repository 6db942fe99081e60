//! OpenFDA drug label source.

use super::{http_client, SourceAdapter};
use crate::passage::Passage;
use async_trait::async_trait;
use medquery_core::config::OpenFdaSourceConfig;
use medquery_core::AppResult;
use serde_json::Value;
use std::time::Duration;

const DRUG_SEARCH_URL: &str =
    "https://www.accessdata.fda.gov/scripts/cder/daf/index.cfm?event=BasicSearch.process&SearchTerm=";

const UNKNOWN_BRAND: &str = "Unknown";

/// Pick the drug name to look up: the last whitespace-delimited token.
///
/// "side effects of ibuprofen" searches for `ibuprofen`.
pub fn drug_search_term(query: &str) -> &str {
    query.split_whitespace().last().unwrap_or("")
}

/// The openFDA `search` expression matching brand or generic name.
pub fn label_search_expression(term: &str) -> String {
    format!(
        "openfda.brand_name:\"{}\" OR openfda.generic_name:\"{}\"",
        term, term
    )
}

/// Turn a `drug/label.json` response into at most one passage.
///
/// Error bodies and empty result sets produce nothing.
pub fn parse_label_response(body: &Value, warning_chars: usize) -> Option<Passage> {
    if body.get("error").is_some() {
        return None;
    }

    let result = body.get("results")?.as_array()?.first()?;

    let brand = result
        .pointer("/openfda/brand_name/0")
        .and_then(Value::as_str)
        .unwrap_or(UNKNOWN_BRAND);

    let warnings: String = result
        .pointer("/warnings/0")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .chars()
        .take(warning_chars)
        .collect();

    Some(
        Passage::new(format!("FDA LABEL: {}. WARNINGS: {}...", brand, warnings))
            .with_meta("source", "OpenFDA")
            .with_meta("title", format!("FDA Label: {}", brand))
            .with_meta(
                "url",
                format!("{}{}", DRUG_SEARCH_URL, urlencoding::encode(brand)),
            ),
    )
}

/// Drug label adapter.
pub struct OpenFdaSource {
    base_url: String,
    warning_chars: usize,
    timeout: Duration,
    client: reqwest::Client,
}

impl OpenFdaSource {
    pub fn from_config(config: &OpenFdaSourceConfig) -> AppResult<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);
        Ok(Self {
            base_url: config.base_url.clone(),
            warning_chars: config.warning_chars,
            timeout,
            client: http_client(timeout)?,
        })
    }
}

#[async_trait]
impl SourceAdapter for OpenFdaSource {
    fn name(&self) -> &str {
        "openfda"
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn search(&self, query: &str) -> AppResult<Vec<Passage>> {
        let term = drug_search_term(query);
        if term.is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!(term, "Looking up drug label");

        // No-match lookups come back as 404 with an `error` body.
        let body: Value = self
            .client
            .get(&self.base_url)
            .query(&[
                ("search", label_search_expression(term).as_str()),
                ("limit", "1"),
            ])
            .send()
            .await?
            .json()
            .await?;

        Ok(parse_label_response(&body, self.warning_chars)
            .into_iter()
            .collect())
    }
}
