//! Interview orchestration — the façade the HTTP layer calls.
//!
//! create: validate → upload résumé → generate question set → synthesize all
//!         audio → persist interview + questions in one transaction.
//! answer: ownership checks → persist answer → generate follow-up →
//!         synthesize → persist follow-up with the parent's index.
//!
//! Nothing is written for a new interview until every external call has
//! succeeded, so a failed create never leaves a partial question set behind.

use std::sync::Arc;

use chrono::Utc;
use futures::future::try_join_all;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::followup::FollowupGenerator;
use crate::interview::models::{
    AnswerCreate, AnswerRow, FinishOut, FollowupOut, InterviewOut, InterviewRow, QuestionOut,
    QuestionRow,
};
use crate::interview::question_set::QuestionSetGenerator;
use crate::interview::state_machine::{InterviewStatus, Transition};
use crate::interview::store::SessionStore;
use crate::interview::validation::{
    require_text, validate_document, UploadedDocument, PDF_CONTENT_TYPE,
};
use crate::llm_client::TextGenerator;
use crate::speech::SpeechSynthesizer;
use crate::storage::ObjectStore;

const RESUME_FOLDER: &str = "resumes";
pub const FINISH_MESSAGE: &str = "Thank you. This concludes your mock interview.";

pub struct InterviewService {
    store: Arc<dyn SessionStore>,
    objects: Arc<dyn ObjectStore>,
    speech: Arc<dyn SpeechSynthesizer>,
    question_sets: QuestionSetGenerator,
    followups: FollowupGenerator,
}

impl InterviewService {
    pub fn new(
        store: Arc<dyn SessionStore>,
        objects: Arc<dyn ObjectStore>,
        llm: Arc<dyn TextGenerator>,
        speech: Arc<dyn SpeechSynthesizer>,
    ) -> Self {
        Self {
            question_sets: QuestionSetGenerator::new(objects.clone(), llm.clone()),
            followups: FollowupGenerator::new(llm),
            store,
            objects,
            speech,
        }
    }

    pub async fn create_interview(
        &self,
        user_id: Uuid,
        document: UploadedDocument,
        company: &str,
        role: &str,
    ) -> Result<InterviewOut, AppError> {
        let company = require_text("company", company)?;
        let role = require_text("role", role)?;
        validate_document(&document)?;

        let stored = self
            .objects
            .store(document.bytes, PDF_CONTENT_TYPE, RESUME_FOLDER)
            .await?;

        let parsed = self
            .question_sets
            .generate(&stored.key, &company, &role)
            .await?;

        let interview_id = Uuid::new_v4();

        // The five syntheses are independent once the text is known.
        let audio_urls = try_join_all(parsed.items.iter().map(|(index, text)| {
            let hint = format!("question-{index}-interview{interview_id}");
            let speech = self.speech.clone();
            async move { speech.synthesize_to_asset(text, &hint).await }
        }))
        .await
        .map_err(|e| {
            warn!(
                "Audio synthesis failed for interview {interview_id}; résumé {} left unreferenced",
                stored.key
            );
            e
        })?;

        let now = Utc::now();
        let interview = InterviewRow {
            id: interview_id,
            user_id,
            company,
            role,
            resume_file_path: stored.key,
            resume_file_url: stored.url,
            status: InterviewStatus::Created.as_str().to_string(),
            created_at: now,
        };

        let questions: Vec<QuestionRow> = parsed
            .items
            .into_iter()
            .zip(audio_urls)
            .map(|((index, text), audio_url)| QuestionRow {
                id: Uuid::new_v4(),
                interview_id,
                index_num: index,
                text,
                audio_url: Some(audio_url),
                is_followup: false,
                source_answer_id: None,
                created_at: now,
            })
            .collect();

        self.store.create_interview(&interview, &questions).await?;

        info!(
            "Created interview {} for user {} ({} / {})",
            interview.id, user_id, interview.company, interview.role
        );

        let mut questions: Vec<QuestionOut> = questions.iter().map(QuestionOut::from).collect();
        questions.sort_by_key(|q| q.index_num);

        Ok(InterviewOut {
            id: interview.id,
            company: interview.company,
            role: interview.role,
            resume_file_url: interview.resume_file_url,
            status: InterviewStatus::Created,
            created_at: interview.created_at,
            questions,
        })
    }

    /// The interview with every question, follow-ups included.
    pub async fn get_interview(
        &self,
        user_id: Uuid,
        interview_id: Uuid,
    ) -> Result<InterviewOut, AppError> {
        let interview = self.owned_interview(user_id, interview_id).await?;
        let questions = self.store.list_questions(interview_id, true).await?;
        let status = self.effective_status(&interview).await?;

        Ok(InterviewOut {
            id: interview.id,
            company: interview.company,
            role: interview.role,
            resume_file_url: interview.resume_file_url,
            status,
            created_at: interview.created_at,
            questions: questions.iter().map(QuestionOut::from).collect(),
        })
    }

    /// The initial question set only, ascending by index.
    pub async fn list_questions(
        &self,
        user_id: Uuid,
        interview_id: Uuid,
    ) -> Result<Vec<QuestionOut>, AppError> {
        self.owned_interview(user_id, interview_id).await?;
        let rows = self.store.list_questions(interview_id, false).await?;
        Ok(rows
            .iter()
            .filter(|q| !q.is_followup)
            .map(QuestionOut::from)
            .collect())
    }

    pub async fn submit_answer(
        &self,
        user_id: Uuid,
        request: AnswerCreate,
    ) -> Result<FollowupOut, AppError> {
        let answer_text = require_text("answer_text", &request.answer_text)?;

        let question = self
            .store
            .find_question(request.question_id, request.interview_id)
            .await?;
        let interview = self
            .store
            .find_interview(request.interview_id, user_id)
            .await?;
        let (question, interview) = match (question, interview) {
            (Some(q), Some(i)) => (q, i),
            _ => return Err(AppError::question_not_found()),
        };

        if !interview.stored_status().accepts_answers() {
            return Err(AppError::Validation(
                "This interview has already finished".to_string(),
            ));
        }

        let answer = AnswerRow {
            id: Uuid::new_v4(),
            question_id: question.id,
            user_id,
            text: answer_text,
            created_at: Utc::now(),
        };
        self.store.create_answer(&answer).await?;

        let followup_text = self.followups.generate(&question.text, &answer.text).await?;

        let hint = format!("followup-q{}-interview{}", question.index_num, interview.id);
        let audio_url = self
            .speech
            .synthesize_to_asset(&followup_text, &hint)
            .await?;

        let followup = QuestionRow {
            id: Uuid::new_v4(),
            interview_id: interview.id,
            index_num: question.index_num,
            text: followup_text,
            audio_url: Some(audio_url),
            is_followup: true,
            source_answer_id: Some(answer.id),
            created_at: Utc::now(),
        };
        self.store.create_followup(&followup).await?;

        info!(
            "Answer {} on question {} produced follow-up {}",
            answer.id, question.id, followup.id
        );

        Ok(FollowupOut {
            question: QuestionOut::from(&followup),
        })
    }

    pub async fn finish_interview(
        &self,
        user_id: Uuid,
        interview_id: Uuid,
    ) -> Result<FinishOut, AppError> {
        let interview = self.owned_interview(user_id, interview_id).await?;

        let transition = interview.stored_status().finish();
        match transition {
            Transition::Changed(status) => {
                self.store.set_status(interview_id, status).await?;
                info!("Interview {interview_id} finished");
            }
            Transition::Unchanged(_) => {
                info!("Interview {interview_id} was already finished");
            }
        }

        Ok(FinishOut {
            message: FINISH_MESSAGE.to_string(),
            status: transition.status(),
        })
    }

    async fn owned_interview(
        &self,
        user_id: Uuid,
        interview_id: Uuid,
    ) -> Result<InterviewRow, AppError> {
        self.store
            .find_interview(interview_id, user_id)
            .await?
            .ok_or_else(AppError::interview_not_found)
    }

    async fn effective_status(&self, interview: &InterviewRow) -> Result<InterviewStatus, AppError> {
        let stored = interview.stored_status();
        if stored.is_finished() {
            return Ok(stored);
        }
        let answers = self.store.count_answers(interview.id).await?;
        Ok(InterviewStatus::effective(stored, answers))
    }
}
