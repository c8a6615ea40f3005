//! Question-set generation — résumé + company + role → five ordered questions.
//!
//! Flow: fetch document from object storage → build prompt with the document
//! attached → LLM generate → two-stage parse.

use std::sync::Arc;

use tracing::{info, warn};

use crate::errors::AppError;
use crate::interview::prompts::QUESTION_SET_PROMPT_TEMPLATE;
use crate::interview::question_parser::{
    parse_questions, ParseStage, ParsedQuestions, QUESTION_COUNT,
};
use crate::interview::validation::PDF_CONTENT_TYPE;
use crate::llm_client::prompts::{INTERVIEWER_SYSTEM, PLAIN_TEXT_INSTRUCTION};
use crate::llm_client::{DocumentAttachment, GenerationRequest, TextGenerator};
use crate::storage::ObjectStore;

pub struct QuestionSetGenerator {
    objects: Arc<dyn ObjectStore>,
    llm: Arc<dyn TextGenerator>,
}

impl QuestionSetGenerator {
    pub fn new(objects: Arc<dyn ObjectStore>, llm: Arc<dyn TextGenerator>) -> Self {
        Self { objects, llm }
    }

    /// Returns exactly `QUESTION_COUNT` `(index, text)` pairs in parsed order.
    ///
    /// `company` and `role` are validated by the caller.
    pub async fn generate(
        &self,
        document_key: &str,
        company: &str,
        role: &str,
    ) -> Result<ParsedQuestions, AppError> {
        let document = self.objects.fetch(document_key).await.map_err(|e| {
            AppError::Generation(format!("Could not load résumé {document_key}: {e}"))
        })?;

        let request = GenerationRequest {
            system: INTERVIEWER_SYSTEM.to_string(),
            prompt: build_question_set_prompt(company, role),
            document: Some(DocumentAttachment {
                media_type: PDF_CONTENT_TYPE.to_string(),
                bytes: document,
            }),
        };

        let text = self
            .llm
            .generate(request)
            .await
            .map_err(|e| AppError::Generation(format!("Question-set LLM call failed: {e}")))?;

        let parsed = parse_questions(&text);
        if parsed.stage == ParseStage::Fallback {
            warn!("Question-set response was not numbered; using positional fallback");
        }

        if parsed.items.len() < QUESTION_COUNT {
            return Err(AppError::Generation(format!(
                "Expected {} questions, parsed {}",
                QUESTION_COUNT,
                parsed.items.len()
            )));
        }

        info!(
            "Generated {} questions for {} / {} ({:?} stage)",
            parsed.items.len(),
            company,
            role,
            parsed.stage
        );

        Ok(parsed)
    }
}

fn build_question_set_prompt(company: &str, role: &str) -> String {
    QUESTION_SET_PROMPT_TEMPLATE
        .replace("{company}", company)
        .replace("{role}", role)
        .replace("{plain_text_instruction}", PLAIN_TEXT_INSTRUCTION)
}
