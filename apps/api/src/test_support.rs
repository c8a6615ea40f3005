//! In-memory fakes for every external seam, used by unit tests.
//!
//! Each fake records what it was asked to do so tests can assert on calls.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream;
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::models::{AnswerRow, InterviewRow, QuestionRow};
use crate::interview::state_machine::InterviewStatus;
use crate::interview::store::SessionStore;
use crate::llm_client::{GenerationRequest, LlmError, TextGenerator};
use crate::speech::{AudioStream, SpeechSynthesizer};
use crate::storage::{ObjectStore, StoredObject};

// ────────────────────────────────────────────────────────────────────────────
// Session store
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Tables {
    interviews: HashMap<Uuid, InterviewRow>,
    questions: Vec<QuestionRow>,
    answers: Vec<AnswerRow>,
}

#[derive(Default)]
pub struct InMemorySessionStore {
    tables: Mutex<Tables>,
}

impl InMemorySessionStore {
    pub fn interview_count(&self) -> usize {
        self.tables.lock().unwrap().interviews.len()
    }

    pub fn all_questions(&self) -> Vec<QuestionRow> {
        self.tables.lock().unwrap().questions.clone()
    }

    pub fn all_answers(&self) -> Vec<AnswerRow> {
        self.tables.lock().unwrap().answers.clone()
    }

    pub fn raw_status(&self, interview_id: Uuid) -> Option<String> {
        self.tables
            .lock()
            .unwrap()
            .interviews
            .get(&interview_id)
            .map(|i| i.status.clone())
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create_interview(
        &self,
        interview: &InterviewRow,
        questions: &[QuestionRow],
    ) -> Result<(), AppError> {
        // Mirrors the CHECK constraints on the questions table.
        if let Some(bad) = questions
            .iter()
            .find(|q| q.index_num <= 0 || q.text.trim().is_empty())
        {
            return Err(AppError::Internal(anyhow::anyhow!(
                "question row violates constraints: index {}",
                bad.index_num
            )));
        }
        let mut tables = self.tables.lock().unwrap();
        tables.interviews.insert(interview.id, interview.clone());
        tables.questions.extend(questions.iter().cloned());
        Ok(())
    }

    async fn find_interview(
        &self,
        interview_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<InterviewRow>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .interviews
            .get(&interview_id)
            .filter(|i| i.user_id == user_id)
            .cloned())
    }

    async fn find_question(
        &self,
        question_id: Uuid,
        interview_id: Uuid,
    ) -> Result<Option<QuestionRow>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .questions
            .iter()
            .find(|q| q.id == question_id && q.interview_id == interview_id)
            .cloned())
    }

    async fn list_questions(
        &self,
        interview_id: Uuid,
        include_followups: bool,
    ) -> Result<Vec<QuestionRow>, AppError> {
        let tables = self.tables.lock().unwrap();
        let mut rows: Vec<QuestionRow> = tables
            .questions
            .iter()
            .filter(|q| q.interview_id == interview_id)
            .filter(|q| include_followups || !q.is_followup)
            .cloned()
            .collect();
        rows.sort_by_key(|q| (q.index_num, q.is_followup, q.created_at));
        Ok(rows)
    }

    async fn create_answer(&self, answer: &AnswerRow) -> Result<(), AppError> {
        self.tables.lock().unwrap().answers.push(answer.clone());
        Ok(())
    }

    async fn create_followup(&self, question: &QuestionRow) -> Result<(), AppError> {
        let mut tables = self.tables.lock().unwrap();
        let duplicate = question.source_answer_id.is_some()
            && tables
                .questions
                .iter()
                .any(|q| q.source_answer_id == question.source_answer_id);
        if duplicate {
            return Err(AppError::Internal(anyhow::anyhow!(
                "answer already has a follow-up"
            )));
        }
        tables.questions.push(question.clone());
        Ok(())
    }

    async fn count_answers(&self, interview_id: Uuid) -> Result<i64, AppError> {
        let tables = self.tables.lock().unwrap();
        let count = tables
            .answers
            .iter()
            .filter(|a| {
                tables
                    .questions
                    .iter()
                    .any(|q| q.id == a.question_id && q.interview_id == interview_id)
            })
            .count();
        Ok(count as i64)
    }

    async fn set_status(
        &self,
        interview_id: Uuid,
        status: InterviewStatus,
    ) -> Result<(), AppError> {
        let mut tables = self.tables.lock().unwrap();
        if let Some(interview) = tables.interviews.get_mut(&interview_id) {
            if interview.status != InterviewStatus::Finished.as_str() {
                interview.status = status.as_str().to_string();
            }
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Object storage
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeObjectStore {
    objects: Mutex<HashMap<String, Bytes>>,
}

impl FakeObjectStore {
    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }
}

#[async_trait]
impl ObjectStore for FakeObjectStore {
    async fn store(
        &self,
        body: Bytes,
        _content_type: &str,
        folder: &str,
    ) -> Result<StoredObject, AppError> {
        let key = format!("{folder}/{}.pdf", Uuid::new_v4());
        self.objects.lock().unwrap().insert(key.clone(), body);
        Ok(StoredObject {
            url: format!("https://storage.test/{key}?signature=abc"),
            key,
        })
    }

    async fn fetch(&self, key: &str) -> Result<Bytes, AppError> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| AppError::Storage(format!("no such key {key}")))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Text generation
// ────────────────────────────────────────────────────────────────────────────

/// Returns pre-configured responses in order; an exhausted or failing script
/// yields an API error.
#[derive(Default)]
pub struct ScriptedGenerator {
    responses: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGenerator {
    pub fn with_responses<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<String, LlmError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(LlmError::Api {
                status: 529,
                message: "overloaded".to_string(),
            })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Speech
// ────────────────────────────────────────────────────────────────────────────

/// Hands out `https://media.test/{hint}-{n}.mp3`. Fails the `fail_on`-th call (1-based).
#[derive(Default)]
pub struct FakeSpeech {
    calls: AtomicUsize,
    fail_on: Option<usize>,
    hints: Mutex<Vec<String>>,
}

impl FakeSpeech {
    pub fn failing_on(call: usize) -> Self {
        Self {
            fail_on: Some(call),
            ..Self::default()
        }
    }

    pub fn hints(&self) -> Vec<String> {
        self.hints.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechSynthesizer for FakeSpeech {
    async fn synthesize_to_asset(
        &self,
        _text: &str,
        filename_hint: &str,
    ) -> Result<String, AppError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on == Some(n) {
            return Err(AppError::Speech("speech service timed out".to_string()));
        }
        self.hints.lock().unwrap().push(filename_hint.to_string());
        Ok(format!("https://media.test/{filename_hint}-{n}.mp3"))
    }

    async fn synthesize_stream(&self, text: &str) -> Result<AudioStream, AppError> {
        let chunks: Vec<Result<Bytes, AppError>> = text
            .as_bytes()
            .chunks(4)
            .map(|c| Ok(Bytes::copy_from_slice(c)))
            .collect();
        Ok(Box::pin(stream::iter(chunks)))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Wiring
// ────────────────────────────────────────────────────────────────────────────

pub struct Harness {
    pub store: Arc<InMemorySessionStore>,
    pub objects: Arc<FakeObjectStore>,
    pub llm: Arc<ScriptedGenerator>,
    pub speech: Arc<FakeSpeech>,
}

impl Harness {
    pub fn new(llm: ScriptedGenerator, speech: FakeSpeech) -> Self {
        Self {
            store: Arc::new(InMemorySessionStore::default()),
            objects: Arc::new(FakeObjectStore::default()),
            llm: Arc::new(llm),
            speech: Arc::new(speech),
        }
    }

    pub fn service(&self) -> crate::interview::service::InterviewService {
        crate::interview::service::InterviewService::new(
            self.store.clone(),
            self.objects.clone(),
            self.llm.clone(),
            self.speech.clone(),
        )
    }
}

pub const NUMBERED_QUESTIONS: &str = "1. Why Acme?\n2. Describe a hard bug.\n3. How do you test?\n4. Tell me about a conflict.\n5. Where do you see yourself?";

pub fn pdf_upload() -> crate::interview::validation::UploadedDocument {
    crate::interview::validation::UploadedDocument {
        file_name: Some("resume.pdf".to_string()),
        bytes: Bytes::from_static(b"%PDF-1.7\n%resume body"),
    }
}
