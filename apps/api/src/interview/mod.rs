// Interview Session Orchestration
// Implements: document validation, question-set generation, follow-ups,
// lifecycle state and persistence. All LLM calls go through llm_client.

pub mod followup;
pub mod handlers;
pub mod models;
pub mod prompts;
pub mod question_parser;
pub mod question_set;
pub mod service;
pub mod state_machine;
pub mod store;
pub mod validation;
