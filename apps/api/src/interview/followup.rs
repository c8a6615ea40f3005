use std::sync::Arc;

use crate::errors::AppError;
use crate::interview::prompts::FOLLOWUP_PROMPT_TEMPLATE;
use crate::llm_client::prompts::{INTERVIEWER_SYSTEM, PLAIN_TEXT_INSTRUCTION};
use crate::llm_client::{GenerationRequest, TextGenerator};

/// Produces exactly one follow-up question from a question/answer pair.
/// The whole (trimmed) response is the question; nothing is split or parsed.
pub struct FollowupGenerator {
    llm: Arc<dyn TextGenerator>,
}

impl FollowupGenerator {
    pub fn new(llm: Arc<dyn TextGenerator>) -> Self {
        Self { llm }
    }

    pub async fn generate(
        &self,
        previous_question: &str,
        answer_text: &str,
    ) -> Result<String, AppError> {
        let request = GenerationRequest {
            system: INTERVIEWER_SYSTEM.to_string(),
            prompt: FOLLOWUP_PROMPT_TEMPLATE
                .replace("{previous_question}", previous_question)
                .replace("{answer_text}", answer_text)
                .replace("{plain_text_instruction}", PLAIN_TEXT_INSTRUCTION),
            document: None,
        };

        let text = self
            .llm
            .generate(request)
            .await
            .map_err(|e| AppError::Generation(format!("Follow-up LLM call failed: {e}")))?;

        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::Generation(
                "Follow-up LLM call returned no text".to_string(),
            ));
        }

        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedGenerator;

    #[tokio::test]
    async fn test_whole_response_is_one_question() {
        let llm = Arc::new(ScriptedGenerator::with_responses([
            "  What trade-offs did you weigh?\nAnd what would you change?  ",
        ]));
        let generator = FollowupGenerator::new(llm.clone());

        let question = generator
            .generate("Tell me about a migration.", "We moved to Postgres.")
            .await
            .unwrap();

        assert_eq!(
            question,
            "What trade-offs did you weigh?\nAnd what would you change?"
        );

        let requests = llm.requests();
        assert!(requests[0].document.is_none());
        assert!(requests[0].prompt.contains("Tell me about a migration."));
        assert!(requests[0].prompt.contains("We moved to Postgres."));
    }

    #[tokio::test]
    async fn test_blank_response_is_error() {
        let generator = FollowupGenerator::new(Arc::new(ScriptedGenerator::with_responses(["  "])));
        let result = generator.generate("Q", "A").await;
        assert!(matches!(result, Err(AppError::Generation(_))));
    }

    #[tokio::test]
    async fn test_service_failure_is_error() {
        let generator = FollowupGenerator::new(Arc::new(ScriptedGenerator::failing()));
        let result = generator.generate("Q", "A").await;
        assert!(matches!(result, Err(AppError::Generation(_))));
    }
}
