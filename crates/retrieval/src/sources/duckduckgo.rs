//! DuckDuckGo web search source.
//!
//! Uses the HTML endpoint and scrapes result blocks, so there is no API key.

use super::{http_client, SourceAdapter};
use crate::attribution::clean_text;
use crate::passage::Passage;
use async_trait::async_trait;
use medquery_core::config::WebSourceConfig;
use medquery_core::{AppError, AppResult};
use scraper::{Html, Selector};
use std::time::Duration;

const SEARCH_URL: &str = "https://html.duckduckgo.com/html/";

/// Web search adapter.
pub struct DuckDuckGoSource {
    top_k: usize,
    region: String,
    time: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl DuckDuckGoSource {
    pub fn from_config(config: &WebSourceConfig) -> AppResult<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);
        Ok(Self {
            top_k: config.top_k,
            region: config.region.clone(),
            time: config.time.clone(),
            timeout,
            client: http_client(timeout)?,
        })
    }
}

fn selector(css: &str) -> AppResult<Selector> {
    Selector::parse(css).map_err(|e| AppError::Retrieval(format!("Invalid selector {}: {}", css, e)))
}

/// Extract up to `top_k` organic results from a results page.
///
/// Ads and results without a link are skipped.
pub fn parse_results(html: &str, top_k: usize) -> AppResult<Vec<Passage>> {
    let result_selector = selector("div.result")?;
    let link_selector = selector("a.result__a")?;
    let snippet_selector = selector(".result__snippet")?;

    let document = Html::parse_document(html);
    let mut passages = Vec::new();

    for result in document.select(&result_selector) {
        if passages.len() >= top_k {
            break;
        }

        let is_ad = result
            .value()
            .classes()
            .any(|class| class == "result--ad");
        if is_ad {
            continue;
        }

        let Some(link) = result.select(&link_selector).next() else {
            continue;
        };
        let Some(url) = link.value().attr("href").and_then(resolve_link) else {
            continue;
        };

        let title = clean_text(&link.text().collect::<String>());
        let snippet = result
            .select(&snippet_selector)
            .next()
            .map(|s| clean_text(&s.text().collect::<String>()))
            .unwrap_or_default();

        passages.push(
            Passage::new(snippet)
                .with_meta("source", "DuckDuckGo")
                .with_meta("title", title)
                .with_meta("url", url),
        );
    }

    Ok(passages)
}

/// Unwrap DuckDuckGo's redirect links (`//duckduckgo.com/l/?uddg=...`).
pub fn resolve_link(href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    if let Some((_, rest)) = href.split_once("uddg=") {
        let encoded = rest.split('&').next().unwrap_or_default();
        return urlencoding::decode(encoded)
            .ok()
            .map(|decoded| decoded.into_owned())
            .filter(|url| !url.is_empty());
    }

    if href.starts_with("//") {
        return Some(format!("https:{}", href));
    }

    href.starts_with("http").then(|| href.to_string())
}

#[async_trait]
impl SourceAdapter for DuckDuckGoSource {
    fn name(&self) -> &str {
        "duckduckgo"
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn search(&self, query: &str) -> AppResult<Vec<Passage>> {
        let response = self
            .client
            .post(SEARCH_URL)
            .form(&[
                ("q", query),
                ("kl", self.region.as_str()),
                ("df", self.time.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::Retrieval(format!(
                "DuckDuckGo returned {}",
                response.status()
            )));
        }

        let html = response.text().await?;
        parse_results(&html, self.top_k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribution::{resolve_citation, SourceLabel};

    const RESULTS_HTML: &str = r#"
<html><body>
<div class="results">
  <div class="result results_links result--ad">
    <a class="result__a" href="https://ads.example/buy">Buy pills</a>
    <a class="result__snippet">Sponsored</a>
  </div>
  <div class="result results_links results_links_deep web-result">
    <h2 class="result__title">
      <a rel="nofollow" class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.mayoclinic.org%2Fdiseases%2Fdiabetes&amp;rut=abc">Diabetes - <b>Symptoms</b> and causes</a>
    </h2>
    <a class="result__snippet" href="x">Learn about   type 2 <b>diabetes</b> symptoms.</a>
  </div>
  <div class="result results_links web-result">
    <a class="result__a" href="https://www.cdc.gov/diabetes/">CDC Diabetes</a>
    <div class="result__snippet">Basics.</div>
  </div>
  <div class="result results_links web-result">
    <span>No link here</span>
  </div>
  <div class="result results_links web-result">
    <a class="result__a" href="https://www.nih.gov/">NIH</a>
  </div>
</div>
</body></html>"#;

    #[test]
    fn test_parse_results() {
        let passages = parse_results(RESULTS_HTML, 3).unwrap();
        assert_eq!(passages.len(), 3);

        let first = &passages[0];
        assert_eq!(first.content, "Learn about type 2 diabetes symptoms.");
        assert_eq!(first.meta("title"), Some("Diabetes - Symptoms and causes"));
        assert_eq!(
            first.meta("url"),
            Some("https://www.mayoclinic.org/diseases/diabetes")
        );
        assert_eq!(first.meta("source"), Some("DuckDuckGo"));

        assert_eq!(passages[1].meta("url"), Some("https://www.cdc.gov/diabetes/"));
        assert_eq!(passages[2].content, "");
    }

    #[test]
    fn test_parse_results_respects_top_k() {
        assert_eq!(parse_results(RESULTS_HTML, 1).unwrap().len(), 1);
        assert!(parse_results(RESULTS_HTML, 0).unwrap().is_empty());
    }

    #[test]
    fn test_parse_no_results() {
        let passages = parse_results("<html><body><div class=\"no-results\"></div></body></html>", 3).unwrap();
        assert!(passages.is_empty());
    }

    #[test]
    fn test_resolve_link() {
        assert_eq!(
            resolve_link("//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2Fa%3Fb%3Dc&rut=1"),
            Some("https://example.com/a?b=c".to_string())
        );
        assert_eq!(
            resolve_link("https://example.com"),
            Some("https://example.com".to_string())
        );
        assert_eq!(resolve_link("//example.com/x"), Some("https://example.com/x".to_string()));
        assert_eq!(resolve_link("/relative"), None);
        assert_eq!(resolve_link(""), None);
    }

    #[test]
    fn test_web_result_cites_duckduckgo() {
        let passages = parse_results(RESULTS_HTML, 1).unwrap();
        let citation = resolve_citation(&passages[0]);
        assert_eq!(citation.source_label, SourceLabel::DuckDuckGo);
        assert_eq!(citation.url, "https://www.mayoclinic.org/diseases/diabetes");
    }
}
