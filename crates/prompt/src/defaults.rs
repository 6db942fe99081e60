//! Built-in prompt definitions.

use crate::types::PromptDefinition;

/// Identifier of the answer-composition prompt.
pub const ANSWER_PROMPT_ID: &str = "medquery.answer";

/// Variables every answer prompt must reference.
pub const ANSWER_PROMPT_VARIABLES: [&str; 2] = ["context", "question"];

const ANSWER_TEMPLATE: &str = r#"
You are MedQuery, an advanced AI Healthcare Assistant.
Your goal is to answer questions based strictly on the provided medical context.

STRICT SAFETY GUIDELINES:
1. You are NOT a doctor. Do not provide medical diagnoses or treatment recommendations.
2. Always begin or end your response with a disclaimer: "I am an AI assistant. Please consult a qualified healthcare professional for medical advice."
3. If the answer is not found in the context, state clearly: "I cannot find information regarding this in the provided medical database."
4. Cite your sources from the context provided.

CONTEXT:
{{context}}

QUESTION:
{{question}}

ANSWER:
"#;

/// The prompt used to compose grounded answers when the workspace does not
/// override it.
pub fn default_answer_prompt() -> PromptDefinition {
    PromptDefinition {
        id: ANSWER_PROMPT_ID.to_string(),
        title: "MedQuery grounded answer".to_string(),
        api_version: "1.0".to_string(),
        created_by: "medquery".to_string(),
        system: None,
        template: ANSWER_TEMPLATE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::validate_prompt;

    #[test]
    fn test_default_prompt_is_valid() {
        let prompt = default_answer_prompt();
        assert!(validate_prompt(&prompt, &ANSWER_PROMPT_VARIABLES).is_ok());
    }

    #[test]
    fn test_default_prompt_carries_safety_rules() {
        let template = default_answer_prompt().template;
        assert!(template.contains("You are NOT a doctor"));
        assert!(template.contains("cannot find information"));
        assert!(template.contains("Cite your sources"));
    }
}
