//! PubMed literature source (NCBI E-utilities).
//!
//! Retrieval is two calls: `esearch` for the most relevant PMIDs, then
//! `efetch` for the article XML. The same client backs the bulk abstract
//! export in [`crate::bulk`].

use super::{http_client, SourceAdapter};
use crate::attribution::clean_text;
use crate::passage::Passage;
use async_trait::async_trait;
use medquery_core::config::PubMedSourceConfig;
use medquery_core::{AppError, AppResult};
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Title used for articles whose XML has none.
pub const UNTITLED_ARTICLE: &str = "No Title";

/// One article from an efetch response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PubMedArticle {
    pub pmid: String,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    /// Publication date as given in the journal issue, e.g. `2021-Mar-15`
    #[serde(skip)]
    pub published: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ESearchResponse {
    esearchresult: ESearchResult,
}

#[derive(Debug, Deserialize)]
struct ESearchResult {
    #[serde(default)]
    idlist: Vec<String>,
    #[serde(rename = "ERROR")]
    error: Option<String>,
}

/// Thin client for the E-utilities endpoints.
#[derive(Clone)]
pub struct PubMedClient {
    base_url: String,
    client: reqwest::Client,
}

impl PubMedClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: http_client(timeout)?,
        })
    }

    /// Return up to `max` PMIDs for `term`, most relevant first.
    pub async fn search_ids(&self, term: &str, max: usize) -> AppResult<Vec<String>> {
        let max = max.to_string();
        let response = self
            .client
            .get(format!("{}/esearch.fcgi", self.base_url))
            .query(&[
                ("db", "pubmed"),
                ("term", term),
                ("retmode", "json"),
                ("retmax", max.as_str()),
                ("sort", "relevance"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::Retrieval(format!(
                "PubMed esearch returned {}",
                response.status()
            )));
        }

        let body: ESearchResponse = response.json().await?;
        if let Some(error) = body.esearchresult.error {
            return Err(AppError::Retrieval(format!("PubMed esearch error: {}", error)));
        }

        Ok(body.esearchresult.idlist)
    }

    /// Fetch and parse the articles for `ids`.
    pub async fn fetch_articles(&self, ids: &[String]) -> AppResult<Vec<PubMedArticle>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let id_list = ids.join(",");
        let response = self
            .client
            .post(format!("{}/efetch.fcgi", self.base_url))
            .form(&[("db", "pubmed"), ("retmode", "xml"), ("id", id_list.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::Retrieval(format!(
                "PubMed efetch returned {}",
                response.status()
            )));
        }

        let xml = response.text().await?;
        parse_articles(&xml)
    }
}

/// Parse an efetch `PubmedArticleSet` document.
///
/// Articles without an abstract are skipped. Inline markup inside titles
/// and abstracts is flattened to text, and multiple `AbstractText`
/// sections are joined with a space.
pub fn parse_articles(xml: &str) -> AppResult<Vec<PubMedArticle>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut articles = Vec::new();
    let mut path: Vec<String> = Vec::new();
    let mut current: Option<ArticleBuilder> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                if name == "PubmedArticle" {
                    current = Some(ArticleBuilder::default());
                }
                path.push(name);
            }
            Ok(Event::End(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                path.pop();

                match name.as_str() {
                    "AbstractText" => {
                        if let Some(article) = current.as_mut() {
                            article.finish_section();
                        }
                    }
                    "PubmedArticle" => {
                        if let Some(article) = current.take().and_then(ArticleBuilder::build) {
                            articles.push(article);
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Text(e)) => {
                if let Some(article) = current.as_mut() {
                    let text = e
                        .unescape()
                        .map_err(|e| AppError::Retrieval(format!("Malformed PubMed XML: {}", e)))?;
                    article.push_text(&path, &text);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(article) = current.as_mut() {
                    let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                    article.push_text(&path, &text);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(AppError::Retrieval(format!(
                    "Malformed PubMed XML at position {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
    }

    Ok(articles)
}

#[derive(Default)]
struct ArticleBuilder {
    pmid: String,
    title: String,
    sections: Vec<String>,
    section: String,
    date: Vec<(String, String)>,
}

impl ArticleBuilder {
    fn push_text(&mut self, path: &[String], text: &str) {
        let within = |tag: &str| path.iter().any(|p| p == tag);
        let leaf = path.last().map(String::as_str).unwrap_or_default();

        if within("AbstractText") {
            self.section.push_str(text);
        } else if within("ArticleTitle") {
            self.title.push_str(text);
        } else if leaf == "PMID" && self.pmid.is_empty() {
            self.pmid = text.trim().to_string();
        } else if within("PubDate") && matches!(leaf, "Year" | "Month" | "Day") {
            self.date.push((leaf.to_string(), text.trim().to_string()));
        }
    }

    fn finish_section(&mut self) {
        let section = clean_text(&self.section);
        if !section.is_empty() {
            self.sections.push(section);
        }
        self.section.clear();
    }

    fn build(self) -> Option<PubMedArticle> {
        if self.pmid.is_empty() || self.sections.is_empty() {
            return None;
        }

        let title = clean_text(&self.title);
        let published = ["Year", "Month", "Day"]
            .iter()
            .filter_map(|part| {
                self.date
                    .iter()
                    .find(|(name, value)| name == part && !value.is_empty())
                    .map(|(_, value)| value.as_str())
            })
            .collect::<Vec<_>>();

        Some(PubMedArticle {
            pmid: self.pmid,
            title: if title.is_empty() {
                UNTITLED_ARTICLE.to_string()
            } else {
                title
            },
            abstract_text: self.sections.join(" "),
            published: (!published.is_empty()).then(|| published.join("-")),
        })
    }
}

impl PubMedArticle {
    /// Passage carrying the abstract, keyed by PMID.
    pub fn into_passage(self) -> Passage {
        let mut passage = Passage::new(self.abstract_text)
            .with_meta("uid", self.pmid)
            .with_meta("Title", self.title);
        if let Some(published) = self.published {
            passage = passage.with_meta("Published", published);
        }
        passage
    }
}

/// Biomedical literature adapter.
pub struct PubMedSource {
    client: PubMedClient,
    top_k: usize,
    timeout: Duration,
}

impl PubMedSource {
    pub fn from_config(config: &PubMedSourceConfig) -> AppResult<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);
        Ok(Self {
            client: PubMedClient::new(&config.base_url, timeout)?,
            top_k: config.top_k,
            timeout,
        })
    }
}

#[async_trait]
impl SourceAdapter for PubMedSource {
    fn name(&self) -> &str {
        "pubmed"
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn search(&self, query: &str) -> AppResult<Vec<Passage>> {
        let ids = self.client.search_ids(query, self.top_k).await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let articles = self.client.fetch_articles(&ids).await?;
        Ok(articles
            .into_iter()
            .take(self.top_k)
            .map(PubMedArticle::into_passage)
            .collect())
    }
}
