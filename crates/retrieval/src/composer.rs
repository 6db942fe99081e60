//! Answer composition: one grounded LLM call over the retrieved passages.

use crate::passage::Passage;
use medquery_core::AppResult;
use medquery_llm::{LlmClient, LlmRequest};
use medquery_prompt::{build_prompt, default_answer_prompt, PromptDefinition};
use std::collections::HashMap;
use std::sync::Arc;

/// Sampling temperature for answers.
pub const ANSWER_TEMPERATURE: f32 = 0.2;

/// Answer text plus the passages that grounded it, in retrieval order.
#[derive(Debug, Clone)]
pub struct ComposedAnswer {
    pub text: String,
    pub passages: Vec<Passage>,
}

/// Join passage contents into the prompt context.
pub fn build_context(passages: &[Passage]) -> String {
    passages
        .iter()
        .map(|p| p.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub struct AnswerComposer {
    llm: Arc<dyn LlmClient>,
    model: String,
    prompt: PromptDefinition,
}

impl AnswerComposer {
    /// Composer using the built-in answer prompt.
    pub fn new(llm: Arc<dyn LlmClient>, model: impl Into<String>) -> Self {
        Self::with_prompt(llm, model, default_answer_prompt())
    }

    pub fn with_prompt(
        llm: Arc<dyn LlmClient>,
        model: impl Into<String>,
        prompt: PromptDefinition,
    ) -> Self {
        Self {
            llm,
            model: model.into(),
            prompt,
        }
    }

    /// Compose an answer to `question` from `passages`.
    ///
    /// Exactly one LLM call is made, even when `passages` is empty; the
    /// prompt then tells the model to say the information is unavailable.
    /// LLM failures propagate.
    pub async fn compose(&self, question: &str, passages: Vec<Passage>) -> AppResult<ComposedAnswer> {
        let mut variables = HashMap::new();
        variables.insert("context".to_string(), build_context(&passages));
        variables.insert("question".to_string(), question.to_string());

        let built = build_prompt(&self.prompt, variables)?;

        let mut request = LlmRequest::new(built.user, &self.model).with_temperature(ANSWER_TEMPERATURE);
        if let Some(system) = built.system {
            request = request.with_system(system);
        }

        tracing::info!(
            provider = self.llm.provider_name(),
            model = %self.model,
            passages = passages.len(),
            "Composing answer"
        );

        let response = self.llm.complete(&request).await?;

        Ok(ComposedAnswer {
            text: response.content,
            passages,
        })
    }
}
