//! Retrieval-augmented answering for MedQuery.
//!
//! A question fans out to four knowledge sources (PubMed, Wikipedia,
//! DuckDuckGo, OpenFDA), the passages are merged in a fixed order, a single
//! LLM call composes a grounded answer, and every passage is turned into a
//! citation.
//!
//! # Example
//! ```no_run
//! use medquery_core::AppConfig;
//! use medquery_llm::client_from_config;
//! use medquery_retrieval::QueryPipeline;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load()?;
//! let pipeline = QueryPipeline::from_config(&config, client_from_config(&config)?)?;
//! let answer = pipeline.answer("What are the side effects of ibuprofen?").await?;
//! for citation in &answer.citations {
//!     println!("{} ({}) {}", citation.title, citation.source_label, citation.url);
//! }
//! # Ok(())
//! # }
//! ```

pub mod attribution;
pub mod bulk;
pub mod composer;
pub mod merger;
pub mod passage;
pub mod pipeline;
pub mod sources;

pub use attribution::{resolve_citation, resolve_citations, Citation, Provenance, SourceLabel};
pub use composer::{AnswerComposer, ComposedAnswer, ANSWER_TEMPERATURE};
pub use merger::RetrievalMerger;
pub use passage::{Metadata, Passage};
pub use pipeline::{Answer, QueryPipeline};
pub use sources::SourceAdapter;
