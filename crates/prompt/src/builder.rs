//! Prompt builder for rendering templates.

use crate::types::{BuiltPrompt, PromptDefinition};
use handlebars::Handlebars;
use medquery_core::{AppError, AppResult};
use std::collections::HashMap;

/// Build a prompt from a definition and input variables.
///
/// Renders both the template and the optional system instruction with the
/// same variables. Values are inserted verbatim (no HTML escaping).
///
/// # Example
/// ```no_run
/// use medquery_prompt::{build_prompt, default_answer_prompt};
/// use std::collections::HashMap;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut vars = HashMap::new();
/// vars.insert("question".to_string(), "What is metformin?".to_string());
/// vars.insert("context".to_string(), "Metformin is a biguanide.".to_string());
///
/// let built = build_prompt(&default_answer_prompt(), vars)?;
/// println!("User prompt: {}", built.user);
/// # Ok(())
/// # }
/// ```
pub fn build_prompt(
    definition: &PromptDefinition,
    variables: HashMap<String, String>,
) -> AppResult<BuiltPrompt> {
    tracing::debug!("Building prompt: {}", definition.id);

    let user = render_template(&definition.template, &variables)?;
    let system = definition
        .system
        .as_deref()
        .map(|system| render_template(system, &variables))
        .transpose()?;

    Ok(BuiltPrompt::new(
        system,
        user,
        definition.id.clone(),
        variables,
    ))
}

/// Render a Handlebars template with variables.
fn render_template(template: &str, variables: &HashMap<String, String>) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Plain text output; passages routinely contain '<' and '&'
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    let rendered = handlebars
        .render("prompt", &variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))?;

    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_definition(system: Option<&str>) -> PromptDefinition {
        PromptDefinition {
            id: "test.prompt".to_string(),
            title: "Test".to_string(),
            api_version: "1.0".to_string(),
            created_by: "test".to_string(),
            system: system.map(str::to_string),
            template: "Context: {{context}}\nQuestion: {{question}}".to_string(),
        }
    }

    #[test]
    fn test_render_simple_template() {
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), "Hello, world!".to_string());

        let result = render_template("Question: {{question}}", &vars);
        assert_eq!(result.unwrap(), "Question: Hello, world!");
    }

    #[test]
    fn test_render_does_not_escape() {
        let mut vars = HashMap::new();
        vars.insert("context".to_string(), "HbA1c < 7% & stable".to_string());

        let result = render_template("{{context}}", &vars).unwrap();
        assert_eq!(result, "HbA1c < 7% & stable");
    }

    #[test]
    fn test_build_prompt_without_system() {
        let def = create_test_definition(None);
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), "Test question".to_string());
        vars.insert("context".to_string(), "Some context".to_string());

        let built = build_prompt(&def, vars).unwrap();
        assert_eq!(built.user, "Context: Some context\nQuestion: Test question");
        assert!(built.system.is_none());
        assert_eq!(built.metadata.source_prompt_id, "test.prompt");
    }

    #[test]
    fn test_build_prompt_renders_system() {
        let def = create_test_definition(Some("Answer about: {{question}}"));
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), "insulin".to_string());

        let built = build_prompt(&def, vars).unwrap();
        assert_eq!(built.system.as_deref(), Some("Answer about: insulin"));
    }

    #[test]
    fn test_render_template_missing_variable() {
        let vars = HashMap::new();
        let result = render_template("Question: {{missing}}", &vars);
        // Handlebars renders missing variables as empty string
        assert_eq!(result.unwrap(), "Question: ");
    }

    #[test]
    fn test_render_template_invalid_syntax() {
        let vars = HashMap::new();
        assert!(render_template("Question: {{#if}}", &vars).is_err());
    }
}
