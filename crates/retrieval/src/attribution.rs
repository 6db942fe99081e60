//! Attribution: turning a passage's metadata into a user-facing citation.
//!
//! Every source reports provenance through a different metadata shape, so
//! the metadata is first classified into a [`Provenance`] variant using a
//! fixed precedence (first match wins):
//!
//! 1. a literature identifier under `uid` or `UID`
//! 2. any key or value mentioning `openfda`
//! 3. a `source` field holding a URL
//! 4. a `url` field
//! 5. anything else
//!
//! [`resolve_citation`] then maps each variant to a label and canonical URL.
//! Resolution never fails.

use crate::passage::{Metadata, Passage};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum characters kept in a citation title.
pub const TITLE_MAX_CHARS: usize = 80;

/// Maximum characters of passage content kept in a citation snippet.
pub const SNIPPET_MAX_CHARS: usize = 200;

/// Title used when the metadata carries none.
pub const DEFAULT_TITLE: &str = "Medical Source";

const PUBMED_ARTICLE_URL: &str = "https://pubmed.ncbi.nlm.nih.gov";
const OPENFDA_HOME_URL: &str = "https://open.fda.gov";
const FALLBACK_SEARCH_URL: &str = "https://www.google.com/search?q=";

/// The closed set of citation labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceLabel {
    #[serde(rename = "PubMed")]
    PubMed,
    #[serde(rename = "OpenFDA")]
    OpenFda,
    Wikipedia,
    Web,
    DuckDuckGo,
    /// Provenance could not be recognised
    Source,
}

impl SourceLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PubMed => "PubMed",
            Self::OpenFda => "OpenFDA",
            Self::Wikipedia => "Wikipedia",
            Self::Web => "Web",
            Self::DuckDuckGo => "DuckDuckGo",
            Self::Source => "Source",
        }
    }
}

impl fmt::Display for SourceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The recognised shapes of passage metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance<'a> {
    /// Biomedical literature record with its identifier
    Literature { uid: &'a str },
    /// Drug label, optionally with its own link
    DrugLabel { url: Option<&'a str> },
    /// A `source` field that is itself a link
    Linked { url: &'a str },
    /// A web search hit with a direct link
    WebResult { url: &'a str },
    Unknown,
}

impl<'a> Provenance<'a> {
    /// Classify metadata using the attribution precedence.
    pub fn classify(metadata: &'a Metadata) -> Self {
        if let Some(uid) = literature_id(metadata) {
            return Self::Literature { uid };
        }

        if mentions_openfda(metadata) {
            return Self::DrugLabel {
                url: metadata.get("url").map(String::as_str),
            };
        }

        if let Some(source) = metadata
            .get("source")
            .map(String::as_str)
            .filter(|s| s.contains("http"))
        {
            return Self::Linked { url: source };
        }

        if let Some(url) = metadata.get("url").map(String::as_str) {
            return Self::WebResult { url };
        }

        Self::Unknown
    }
}

fn literature_id(metadata: &Metadata) -> Option<&str> {
    ["uid", "UID"]
        .iter()
        .filter_map(|key| metadata.get(*key))
        .map(|value| value.trim())
        .find(|value| !value.is_empty())
}

fn mentions_openfda(metadata: &Metadata) -> bool {
    metadata.iter().any(|(key, value)| {
        key.to_lowercase().contains("openfda") || value.to_lowercase().contains("openfda")
    })
}

/// User-facing provenance record for a passage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// Whitespace-normalised title, at most [`TITLE_MAX_CHARS`] characters
    pub title: String,

    #[serde(rename = "source")]
    pub source_label: SourceLabel,

    /// Whitespace-normalised content, at most [`SNIPPET_MAX_CHARS`] characters plus `...`
    #[serde(rename = "content")]
    pub snippet: String,

    /// Best-effort canonical link
    pub url: String,
}

/// Derive the citation for a passage.
pub fn resolve_citation(passage: &Passage) -> Citation {
    let metadata = &passage.metadata;
    let raw_title = raw_title(metadata);

    let (source_label, url) = match Provenance::classify(metadata) {
        Provenance::Literature { uid } => {
            (SourceLabel::PubMed, format!("{}/{}/", PUBMED_ARTICLE_URL, uid))
        }
        Provenance::DrugLabel { url } => (
            SourceLabel::OpenFda,
            url.unwrap_or(OPENFDA_HOME_URL).to_string(),
        ),
        Provenance::Linked { url } => {
            let label = if url.contains("wiki") {
                SourceLabel::Wikipedia
            } else {
                SourceLabel::Web
            };
            (label, url.to_string())
        }
        Provenance::WebResult { url } => (SourceLabel::DuckDuckGo, url.to_string()),
        Provenance::Unknown => {
            let query = raw_title.map(clean_text).unwrap_or_default();
            (
                SourceLabel::Source,
                format!("{}{}", FALLBACK_SEARCH_URL, urlencoding::encode(&query)),
            )
        }
    };

    Citation {
        title: truncate_title(raw_title.unwrap_or(DEFAULT_TITLE)),
        source_label,
        snippet: truncate_snippet(&passage.content),
        url,
    }
}

/// Resolve citations for passages, preserving order.
pub fn resolve_citations(passages: &[Passage]) -> Vec<Citation> {
    passages.iter().map(resolve_citation).collect()
}

fn raw_title(metadata: &Metadata) -> Option<&str> {
    ["Title", "title"]
        .iter()
        .filter_map(|key| metadata.get(*key))
        .map(String::as_str)
        .find(|title| !title.trim().is_empty())
}

/// Collapse runs of whitespace into single spaces and trim the ends.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalise and cut a title to [`TITLE_MAX_CHARS`] characters.
pub fn truncate_title(title: &str) -> String {
    let cut: String = clean_text(title).chars().take(TITLE_MAX_CHARS).collect();
    cut.trim_end().to_string()
}

/// Normalise content and cut it to [`SNIPPET_MAX_CHARS`] characters,
/// appending `...` when anything was removed.
pub fn truncate_snippet(content: &str) -> String {
    let cleaned = clean_text(content);
    if cleaned.chars().count() <= SNIPPET_MAX_CHARS {
        return cleaned;
    }

    let mut cut: String = cleaned.chars().take(SNIPPET_MAX_CHARS).collect();
    cut.push_str("...");
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passage(content: &str, fields: &[(&str, &str)]) -> Passage {
        fields
            .iter()
            .fold(Passage::new(content), |p, (k, v)| p.with_meta(*k, *v))
    }

    #[test]
    fn test_pubmed_uid() {
        let citation = resolve_citation(&passage(
            "Salicylate poisoning is treated with...",
            &[("uid", "12345"), ("Title", "Aspirin overdose management")],
        ));

        assert_eq!(citation.source_label, SourceLabel::PubMed);
        assert_eq!(citation.url, "https://pubmed.ncbi.nlm.nih.gov/12345/");
        assert_eq!(citation.title, "Aspirin overdose management");
    }

    #[test]
    fn test_pubmed_upper_uid() {
        let citation = resolve_citation(&passage("text", &[("UID", "987")]));
        assert_eq!(citation.source_label, SourceLabel::PubMed);
        assert!(citation.url.contains("987"));
    }

    #[test]
    fn test_empty_uid_falls_through() {
        let citation = resolve_citation(&passage("text", &[("uid", " "), ("UID", "42")]));
        assert_eq!(citation.url, "https://pubmed.ncbi.nlm.nih.gov/42/");

        let citation = resolve_citation(&passage("text", &[("uid", ""), ("url", "https://x.org")]));
        assert_eq!(citation.source_label, SourceLabel::DuckDuckGo);
    }

    #[test]
    fn test_uid_beats_other_fields() {
        let citation = resolve_citation(&passage(
            "text",
            &[
                ("uid", "1"),
                ("source", "OpenFDA"),
                ("url", "https://example.com"),
            ],
        ));
        assert_eq!(citation.source_label, SourceLabel::PubMed);
    }

    #[test]
    fn test_openfda_with_url() {
        let citation = resolve_citation(&passage(
            "FDA LABEL: Tylenol. WARNINGS: Liver warning...",
            &[
                ("source", "OpenFDA"),
                ("title", "FDA Label: Tylenol"),
                ("url", "https://www.accessdata.fda.gov/x"),
            ],
        ));

        assert_eq!(citation.source_label, SourceLabel::OpenFda);
        assert_eq!(citation.url, "https://www.accessdata.fda.gov/x");
        assert_eq!(citation.title, "FDA Label: Tylenol");
    }

    #[test]
    fn test_openfda_without_url() {
        let citation = resolve_citation(&passage("text", &[("origin", "openFDA label")]));
        assert_eq!(citation.source_label, SourceLabel::OpenFda);
        assert_eq!(citation.url, "https://open.fda.gov");
    }

    #[test]
    fn test_wikipedia_source() {
        let citation = resolve_citation(&passage(
            "Diabetes mellitus is...",
            &[("source", "https://en.wikipedia.org/wiki/Diabetes")],
        ));

        assert_eq!(citation.source_label, SourceLabel::Wikipedia);
        assert_eq!(citation.url, "https://en.wikipedia.org/wiki/Diabetes");
        assert_eq!(citation.title, DEFAULT_TITLE);
    }

    #[test]
    fn test_wiki_match_is_case_sensitive() {
        let citation = resolve_citation(&passage(
            "text",
            &[("source", "https://example.org/WIKI-page")],
        ));
        assert_eq!(citation.source_label, SourceLabel::Web);
        assert_eq!(citation.url, "https://example.org/WIKI-page");
    }

    #[test]
    fn test_web_source() {
        let citation = resolve_citation(&passage(
            "text",
            &[("source", "https://www.mayoclinic.org/diseases")],
        ));
        assert_eq!(citation.source_label, SourceLabel::Web);
        assert_eq!(citation.url, "https://www.mayoclinic.org/diseases");
    }

    #[test]
    fn test_url_only_is_duckduckgo() {
        let citation = resolve_citation(&passage("text", &[("url", "https://example.com/x")]));
        assert_eq!(citation.source_label, SourceLabel::DuckDuckGo);
        assert_eq!(citation.url, "https://example.com/x");
    }

    #[test]
    fn test_non_url_source_with_url_is_duckduckgo() {
        let citation = resolve_citation(&passage(
            "text",
            &[("source", "DuckDuckGo"), ("url", "https://example.com/y")],
        ));
        assert_eq!(citation.source_label, SourceLabel::DuckDuckGo);
    }

    #[test]
    fn test_fallback_search_url() {
        let citation = resolve_citation(&passage("text", &[("title", "Heart  failure")]));
        assert_eq!(citation.source_label, SourceLabel::Source);
        assert_eq!(citation.url, "https://www.google.com/search?q=Heart%20failure");
        assert_eq!(citation.title, "Heart failure");

        let citation = resolve_citation(&Passage::new("text"));
        assert_eq!(citation.source_label, SourceLabel::Source);
        assert_eq!(citation.url, "https://www.google.com/search?q=");
        assert_eq!(citation.title, DEFAULT_TITLE);
    }

    #[test]
    fn test_title_prefers_capitalised_key() {
        let citation = resolve_citation(&passage("text", &[("Title", "Upper"), ("title", "lower")]));
        assert_eq!(citation.title, "Upper");
    }

    #[test]
    fn test_title_truncated_to_80_chars() {
        let long_title = "word ".repeat(40);
        let citation = resolve_citation(&passage("text", &[("title", &long_title)]));
        assert!(citation.title.chars().count() <= TITLE_MAX_CHARS);
        assert!(!citation.title.ends_with(' '));
    }

    #[test]
    fn test_snippet_normalised_and_truncated() {
        let content = format!("Line one\n\n   line two {}", "x".repeat(300));
        let snippet = truncate_snippet(&content);
        assert!(snippet.starts_with("Line one line two "));
        assert!(snippet.ends_with("..."));
        assert_eq!(snippet.chars().count(), SNIPPET_MAX_CHARS + 3);
    }

    #[test]
    fn test_short_snippet_kept() {
        assert_eq!(truncate_snippet("  short\ttext "), "short text");
    }

    #[test]
    fn test_truncation_counts_characters() {
        let content = "é".repeat(250);
        let snippet = truncate_snippet(&content);
        assert_eq!(snippet.chars().count(), SNIPPET_MAX_CHARS + 3);

        let title = truncate_title(&"ü".repeat(100));
        assert_eq!(title.chars().count(), TITLE_MAX_CHARS);
    }

    #[test]
    fn test_truncation_is_idempotent() {
        let samples = [
            String::new(),
            "short".to_string(),
            "a ".repeat(150),
            format!("{} tail", "b".repeat(199)),
            "word ".repeat(100),
            "x".repeat(201),
            "\n\t mixed   whitespace \n".repeat(30),
        ];

        for sample in &samples {
            let once = truncate_snippet(sample);
            assert_eq!(truncate_snippet(&once), once, "snippet: {:?}", sample);

            let once = truncate_title(sample);
            assert_eq!(truncate_title(&once), once, "title: {:?}", sample);
        }
    }

    #[test]
    fn test_citation_wire_format() {
        let citation = resolve_citation(&passage("text", &[("uid", "12345")]));
        let json = serde_json::to_value(&citation).unwrap();

        assert_eq!(json["source"], "PubMed");
        assert_eq!(json["content"], "text");
        assert_eq!(json["title"], "Medical Source");
        assert_eq!(json["url"], "https://pubmed.ncbi.nlm.nih.gov/12345/");
    }

    #[test]
    fn test_label_display() {
        assert_eq!(SourceLabel::OpenFda.to_string(), "OpenFDA");
        assert_eq!(
            serde_json::to_string(&SourceLabel::OpenFda).unwrap(),
            "\"OpenFDA\""
        );
    }

    #[test]
    fn test_resolve_citations_preserves_order() {
        let passages = vec![
            passage("a", &[("url", "https://a.example")]),
            passage("b", &[("uid", "2")]),
        ];
        let citations = resolve_citations(&passages);
        assert_eq!(citations[0].source_label, SourceLabel::DuckDuckGo);
        assert_eq!(citations[1].source_label, SourceLabel::PubMed);
    }
}
