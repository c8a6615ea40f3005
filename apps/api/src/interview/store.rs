//! Session Store — persistence for interviews, questions and answers.
//!
//! Every method acquires a pooled connection for one statement (or one
//! transaction) and releases it before returning; nothing here is held across
//! an LLM, speech or storage call.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::models::{AnswerRow, InterviewRow, QuestionRow};
use crate::interview::state_machine::InterviewStatus;

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Inserts the interview and its initial questions atomically.
    async fn create_interview(
        &self,
        interview: &InterviewRow,
        questions: &[QuestionRow],
    ) -> Result<(), AppError>;

    /// The interview, only if it is owned by `user_id`.
    async fn find_interview(
        &self,
        interview_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<InterviewRow>, AppError>;

    /// The question, only if it belongs to `interview_id`.
    async fn find_question(
        &self,
        question_id: Uuid,
        interview_id: Uuid,
    ) -> Result<Option<QuestionRow>, AppError>;

    /// Ordered by `index_num`, then creation time. Follow-ups only when asked for.
    async fn list_questions(
        &self,
        interview_id: Uuid,
        include_followups: bool,
    ) -> Result<Vec<QuestionRow>, AppError>;

    async fn create_answer(&self, answer: &AnswerRow) -> Result<(), AppError>;

    /// Inserts a follow-up. Fails if the source answer already has one.
    async fn create_followup(&self, question: &QuestionRow) -> Result<(), AppError>;

    async fn count_answers(&self, interview_id: Uuid) -> Result<i64, AppError>;

    /// Moves the stored status forward. A finished interview is never changed.
    async fn set_status(&self, interview_id: Uuid, status: InterviewStatus)
        -> Result<(), AppError>;
}

pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const INSERT_QUESTION: &str = r#"
    INSERT INTO questions
        (id, interview_id, index_num, text, audio_url, is_followup, source_answer_id, created_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
"#;

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn create_interview(
        &self,
        interview: &InterviewRow,
        questions: &[QuestionRow],
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO interviews
                (id, user_id, company, role, resume_file_path, resume_file_url, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(interview.id)
        .bind(interview.user_id)
        .bind(&interview.company)
        .bind(&interview.role)
        .bind(&interview.resume_file_path)
        .bind(&interview.resume_file_url)
        .bind(&interview.status)
        .bind(interview.created_at)
        .execute(&mut *tx)
        .await?;

        for q in questions {
            sqlx::query(INSERT_QUESTION)
                .bind(q.id)
                .bind(q.interview_id)
                .bind(q.index_num)
                .bind(&q.text)
                .bind(&q.audio_url)
                .bind(q.is_followup)
                .bind(q.source_answer_id)
                .bind(q.created_at)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        info!(
            "Persisted interview {} with {} questions",
            interview.id,
            questions.len()
        );
        Ok(())
    }

    async fn find_interview(
        &self,
        interview_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<InterviewRow>, AppError> {
        let row = sqlx::query_as::<_, InterviewRow>(
            "SELECT * FROM interviews WHERE id = $1 AND user_id = $2",
        )
        .bind(interview_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_question(
        &self,
        question_id: Uuid,
        interview_id: Uuid,
    ) -> Result<Option<QuestionRow>, AppError> {
        let row = sqlx::query_as::<_, QuestionRow>(
            "SELECT * FROM questions WHERE id = $1 AND interview_id = $2",
        )
        .bind(question_id)
        .bind(interview_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_questions(
        &self,
        interview_id: Uuid,
        include_followups: bool,
    ) -> Result<Vec<QuestionRow>, AppError> {
        let rows = sqlx::query_as::<_, QuestionRow>(
            r#"
            SELECT * FROM questions
            WHERE interview_id = $1 AND ($2 OR is_followup = FALSE)
            ORDER BY index_num ASC, is_followup ASC, created_at ASC
            "#,
        )
        .bind(interview_id)
        .bind(include_followups)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn create_answer(&self, answer: &AnswerRow) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO answers (id, question_id, user_id, text, created_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(answer.id)
        .bind(answer.question_id)
        .bind(answer.user_id)
        .bind(&answer.text)
        .bind(answer.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn create_followup(&self, question: &QuestionRow) -> Result<(), AppError> {
        sqlx::query(INSERT_QUESTION)
            .bind(question.id)
            .bind(question.interview_id)
            .bind(question.index_num)
            .bind(&question.text)
            .bind(&question.audio_url)
            .bind(question.is_followup)
            .bind(question.source_answer_id)
            .bind(question.created_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn count_answers(&self, interview_id: Uuid) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM answers a
            JOIN questions q ON q.id = a.question_id
            WHERE q.interview_id = $1
            "#,
        )
        .bind(interview_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn set_status(
        &self,
        interview_id: Uuid,
        status: InterviewStatus,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE interviews SET status = $2 WHERE id = $1 AND status <> 'finished'")
            .bind(interview_id)
            .bind(status.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
