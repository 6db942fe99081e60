//! End-to-end query pipeline: retrieve, compose, attribute.

use crate::attribution::{resolve_citations, Citation};
use crate::composer::AnswerComposer;
use crate::merger::RetrievalMerger;
use medquery_core::{AppConfig, AppError, AppResult};
use medquery_llm::LlmClient;
use medquery_prompt::resolve_answer_prompt;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Response to a user question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    #[serde(rename = "answer")]
    pub text: String,

    /// One citation per passage fed to the model, in retrieval order
    #[serde(rename = "sources")]
    pub citations: Vec<Citation>,
}

pub struct QueryPipeline {
    merger: RetrievalMerger,
    composer: AnswerComposer,
}

impl QueryPipeline {
    pub fn new(merger: RetrievalMerger, composer: AnswerComposer) -> Self {
        Self { merger, composer }
    }

    /// Wire the configured sources, workspace prompt and model around `llm`.
    pub fn from_config(config: &AppConfig, llm: Arc<dyn LlmClient>) -> AppResult<Self> {
        let merger = RetrievalMerger::from_config(&config.sources)?;
        let prompt = resolve_answer_prompt(&config.workspace)?;
        let composer = AnswerComposer::with_prompt(llm, &config.model, prompt);

        tracing::info!(sources = ?merger.adapter_names(), model = %config.model, "Query pipeline ready");

        Ok(Self::new(merger, composer))
    }

    pub fn merger(&self) -> &RetrievalMerger {
        &self.merger
    }

    /// Answer a question with cited sources.
    ///
    /// Source failures only shrink the context; composition failures and
    /// blank questions are errors.
    pub async fn answer(&self, question: &str) -> AppResult<Answer> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AppError::InvalidRequest(
                "Question must not be empty".to_string(),
            ));
        }

        tracing::info!(question, "Answering question");

        let passages = self.merger.retrieve(question).await;
        let composed = self.composer.compose(question, passages).await?;
        let citations = resolve_citations(&composed.passages);

        Ok(Answer {
            text: composed.text,
            citations,
        })
    }

    /// [`QueryPipeline::answer`] bounded by `deadline`.
    pub async fn answer_within(&self, question: &str, deadline: Duration) -> AppResult<Answer> {
        tokio::time::timeout(deadline, self.answer(question))
            .await
            .map_err(|_| AppError::Timeout(deadline.as_secs()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribution::SourceLabel;
    use crate::passage::Passage;
    use crate::sources::SourceAdapter;
    use async_trait::async_trait;
    use medquery_llm::{LlmRequest, LlmResponse, LlmUsage};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Canned(Vec<Passage>);

    #[async_trait]
    impl SourceAdapter for Canned {
        fn name(&self) -> &str {
            "canned"
        }

        async fn search(&self, _query: &str) -> AppResult<Vec<Passage>> {
            Ok(self.0.clone())
        }
    }

    struct Down;

    #[async_trait]
    impl SourceAdapter for Down {
        fn name(&self) -> &str {
            "down"
        }

        async fn search(&self, _query: &str) -> AppResult<Vec<Passage>> {
            Err(AppError::Http("connection refused".to_string()))
        }
    }

    #[derive(Default)]
    struct Counting {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl LlmClient for Counting {
        fn provider_name(&self) -> &str {
            "counting"
        }

        async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AppError::Llm("model unavailable".to_string()));
            }
            Ok(LlmResponse {
                content: "I am an AI assistant. Metformin is first-line.".to_string(),
                model: request.model.clone(),
                usage: LlmUsage::default(),
            })
        }
    }

    struct Stalled;

    #[async_trait]
    impl LlmClient for Stalled {
        fn provider_name(&self) -> &str {
            "stalled"
        }

        async fn complete(&self, _request: &LlmRequest) -> AppResult<LlmResponse> {
            std::future::pending().await
        }
    }

    fn pipeline(adapters: Vec<Arc<dyn SourceAdapter>>, llm: Arc<Counting>) -> QueryPipeline {
        QueryPipeline::new(
            RetrievalMerger::new(adapters),
            AnswerComposer::new(llm, "test-model"),
        )
    }

    #[tokio::test]
    async fn test_answer_with_citations_in_order() {
        let literature = Passage::new("Metformin reduces hepatic glucose output.")
            .with_meta("uid", "111")
            .with_meta("Title", "Metformin review");
        let label = Passage::new("FDA LABEL: Glucophage. WARNINGS: Lactic acidosis...")
            .with_meta("source", "OpenFDA")
            .with_meta("title", "FDA Label: Glucophage")
            .with_meta("url", "https://www.accessdata.fda.gov/x");

        let llm = Arc::new(Counting::default());
        let pipeline = pipeline(
            vec![
                Arc::new(Canned(vec![literature])),
                Arc::new(Down),
                Arc::new(Canned(vec![label])),
            ],
            llm.clone(),
        );

        let answer = pipeline.answer("  What is metformin?  ").await.unwrap();

        assert_eq!(answer.text, "I am an AI assistant. Metformin is first-line.");
        assert_eq!(answer.citations.len(), 2);
        assert_eq!(answer.citations[0].source_label, SourceLabel::PubMed);
        assert_eq!(answer.citations[0].url, "https://pubmed.ncbi.nlm.nih.gov/111/");
        assert_eq!(answer.citations[1].source_label, SourceLabel::OpenFda);
        assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_all_sources_empty_still_answers() {
        let llm = Arc::new(Counting::default());
        let pipeline = pipeline(vec![Arc::new(Down), Arc::new(Canned(Vec::new()))], llm.clone());

        let answer = pipeline.answer("Is it safe?").await.unwrap();
        assert!(answer.citations.is_empty());
        assert!(!answer.text.is_empty());
        assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_llm_failure_is_error() {
        let llm = Arc::new(Counting {
            calls: AtomicUsize::new(0),
            fail: true,
        });
        let pipeline = pipeline(vec![Arc::new(Canned(vec![Passage::new("p")]))], llm);

        let result = pipeline.answer("q").await;
        assert!(matches!(result, Err(AppError::Llm(_))));
    }

    #[tokio::test]
    async fn test_answer_within_stalled_llm_times_out() {
        let pipeline = QueryPipeline::new(
            RetrievalMerger::new(vec![Arc::new(Canned(vec![Passage::new("p")]))]),
            AnswerComposer::new(Arc::new(Stalled), "test-model"),
        );

        let result = pipeline
            .answer_within("q", Duration::from_millis(50))
            .await;
        assert!(matches!(result, Err(AppError::Timeout(0))));
    }

    #[tokio::test]
    async fn test_answer_within_passes_answer_through() {
        let llm = Arc::new(Counting::default());
        let pipeline = pipeline(vec![Arc::new(Canned(vec![Passage::new("p")]))], llm);

        let answer = pipeline
            .answer_within("q", Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(answer.citations.len(), 1);
    }

    #[tokio::test]
    async fn test_blank_question_rejected() {
        let llm = Arc::new(Counting::default());
        let pipeline = pipeline(Vec::new(), llm.clone());

        let result = pipeline.answer("   ").await;
        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_answer_wire_format() {
        let answer = Answer {
            text: "text".to_string(),
            citations: resolve_citations(&[Passage::new("c").with_meta("url", "https://e.org")]),
        };
        let json = serde_json::to_value(&answer).unwrap();

        assert_eq!(json["answer"], "text");
        assert_eq!(json["sources"][0]["source"], "DuckDuckGo");
        assert_eq!(json["sources"][0]["url"], "https://e.org");
    }
}
