//! LLM provider factory.
//!
//! Builds the single process-wide LLM client from configuration. The result
//! is handed to the answer composer at start-up and reused for every request.

use crate::client::LlmClient;
use crate::providers::{GeminiClient, OllamaClient};
use crate::types::ProviderType;
use medquery_core::{AppConfig, AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("gemini", "ollama")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - API key, required by Gemini
/// * `timeout` - Deadline applied to every completion request
///
/// # Errors
/// Returns error if the provider is unknown or a required key is missing.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
    timeout: Duration,
) -> Result<Arc<dyn LlmClient>, String> {
    match ProviderType::parse(provider) {
        Some(ProviderType::Gemini) => {
            let api_key = api_key
                .filter(|key| !key.trim().is_empty())
                .ok_or_else(|| "Gemini provider requires API key".to_string())?;
            let client = match endpoint {
                Some(base_url) => GeminiClient::with_base_url(base_url, api_key),
                None => GeminiClient::new(api_key),
            };
            let client = client.with_timeout(timeout).map_err(|e| e.to_string())?;
            Ok(Arc::new(client))
        }
        Some(ProviderType::Ollama) => {
            let client = match endpoint {
                Some(base_url) => OllamaClient::with_base_url(base_url),
                None => OllamaClient::new(),
            };
            let client = client.with_timeout(timeout).map_err(|e| e.to_string())?;
            Ok(Arc::new(client))
        }
        None => Err(format!("Unknown provider: {}", provider)),
    }
}

/// Create the client described by an [`AppConfig`].
pub fn client_from_config(config: &AppConfig) -> AppResult<Arc<dyn LlmClient>> {
    create_client(
        &config.provider,
        config.endpoint.as_deref(),
        config.api_key.as_deref(),
        Duration::from_secs(config.llm_timeout_secs),
    )
    .map_err(AppError::Config)
}
