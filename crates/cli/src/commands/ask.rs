//! Ask command handler.
//!
//! Runs a single question through the full pipeline and prints the answer
//! with its sources.

use clap::Args;
use medquery_core::{config::AppConfig, AppError, AppResult};
use medquery_llm::client_from_config;
use medquery_retrieval::{Answer, QueryPipeline};
use std::path::PathBuf;
use std::time::Duration;

/// Ask a medical question
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: Option<String>,

    /// Read the question from a file
    #[arg(short, long, conflicts_with = "question")]
    pub file: Option<PathBuf>,

    /// Output as JSON (same shape as POST /query)
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");

        let question = self.get_question()?;
        config.validate()?;

        let llm = client_from_config(config)?;
        let pipeline = QueryPipeline::from_config(config, llm)?;
        let deadline = Duration::from_secs(config.server.request_timeout_secs);
        let answer = pipeline.answer_within(&question, deadline).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&answer)?);
        } else {
            print!("{}", render_text(&answer));
        }

        Ok(())
    }

    fn get_question(&self) -> AppResult<String> {
        if let Some(question) = &self.question {
            return Ok(question.clone());
        }

        if let Some(path) = &self.file {
            return std::fs::read_to_string(path).map_err(|e| {
                AppError::Config(format!("Failed to read question file {:?}: {}", path, e))
            });
        }

        Err(AppError::Config("No question provided".to_string()))
    }
}

fn render_text(answer: &Answer) -> String {
    let mut out = format!("{}\n", answer.text.trim_end());

    if !answer.citations.is_empty() {
        out.push_str("\nSources:\n");
        for (i, citation) in answer.citations.iter().enumerate() {
            out.push_str(&format!(
                "  [{}] {} ({})\n      {}\n",
                i + 1,
                citation.title,
                citation.source_label,
                citation.url
            ));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use medquery_retrieval::{resolve_citation, Passage};

    #[test]
    fn test_render_text_lists_sources() {
        let answer = Answer {
            text: "Metformin is first-line.\n".to_string(),
            citations: vec![resolve_citation(
                &Passage::new("text")
                    .with_meta("uid", "12345")
                    .with_meta("Title", "Metformin review"),
            )],
        };

        let text = render_text(&answer);
        assert!(text.starts_with("Metformin is first-line.\n\nSources:\n"));
        assert!(text.contains("[1] Metformin review (PubMed)"));
        assert!(text.contains("https://pubmed.ncbi.nlm.nih.gov/12345/"));
    }

    #[test]
    fn test_render_text_without_sources() {
        let answer = Answer {
            text: "No data.".to_string(),
            citations: Vec::new(),
        };
        assert_eq!(render_text(&answer), "No data.\n");
    }

    #[test]
    fn test_missing_question() {
        let cmd = AskCommand {
            question: None,
            file: None,
            json: false,
        };
        assert!(cmd.get_question().is_err());
    }
}
