//! Prompt loader for YAML prompt overrides.

use crate::defaults::{default_answer_prompt, ANSWER_PROMPT_ID};
use crate::types::PromptDefinition;
use medquery_core::{AppError, AppResult};
use std::path::{Path, PathBuf};

/// Path of the override file for `prompt_id` inside a workspace.
pub fn prompt_path(workspace_path: &Path, prompt_id: &str) -> PathBuf {
    workspace_path
        .join(".medquery/prompts")
        .join(format!("{}.yml", prompt_id))
}

/// Load a prompt definition by ID from the workspace.
///
/// Reads `.medquery/prompts/<id>.yml` and fails when it is missing or
/// invalid.
///
/// # Example
/// ```no_run
/// use medquery_prompt::load_prompt;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt(Path::new("."), "medquery.answer", &["context", "question"])?;
/// println!("Loaded prompt: {}", prompt.title);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt(
    workspace_path: &Path,
    prompt_id: &str,
    required_variables: &[&str],
) -> AppResult<PromptDefinition> {
    let prompt_file = prompt_path(workspace_path, prompt_id);

    tracing::debug!("Loading prompt from: {:?}", prompt_file);

    if !prompt_file.exists() {
        return Err(AppError::Prompt(format!(
            "Prompt file not found: {:?}",
            prompt_file
        )));
    }

    let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to read prompt file {:?}: {}",
            prompt_file, e
        ))
    })?;

    let definition: PromptDefinition = serde_yaml::from_str(&contents).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to parse prompt YAML {:?}: {}",
            prompt_file, e
        ))
    })?;

    validate_prompt(&definition, required_variables)?;

    tracing::info!("Loaded prompt: {} ({})", definition.id, definition.title);

    Ok(definition)
}

/// Resolve the answer prompt: the workspace override when present, the
/// built-in definition otherwise.
pub fn resolve_answer_prompt(workspace_path: &Path) -> AppResult<PromptDefinition> {
    if prompt_path(workspace_path, ANSWER_PROMPT_ID).exists() {
        load_prompt(
            workspace_path,
            ANSWER_PROMPT_ID,
            &crate::defaults::ANSWER_PROMPT_VARIABLES,
        )
    } else {
        tracing::debug!("No prompt override, using built-in {}", ANSWER_PROMPT_ID);
        Ok(default_answer_prompt())
    }
}

/// Validate a prompt definition.
pub fn validate_prompt(def: &PromptDefinition, required_variables: &[&str]) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.title.is_empty() {
        return Err(AppError::Prompt("Prompt title cannot be empty".to_string()));
    }

    if def.template.trim().is_empty() {
        return Err(AppError::Prompt(
            "Prompt template cannot be empty".to_string(),
        ));
    }

    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    let compact: String = def.template.chars().filter(|c| !c.is_whitespace()).collect();
    for variable in required_variables {
        if !compact.contains(&format!("{{{{{}}}}}", variable)) {
            return Err(AppError::Prompt(format!(
                "Prompt {} does not reference required variable '{}'",
                def.id, variable
            )));
        }
    }

    Ok(())
}
