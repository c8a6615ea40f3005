use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::interview::state_machine::InterviewStatus;

// ────────────────────────────────────────────────────────────────────────────
// Rows
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InterviewRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company: String,
    pub role: String,
    pub resume_file_path: String,
    pub resume_file_url: String,
    /// Stored lifecycle status: `created` or `finished`.
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuestionRow {
    pub id: Uuid,
    pub interview_id: Uuid,
    /// 1-based. Follow-ups carry the index of the question they answer.
    pub index_num: i32,
    pub text: String,
    pub audio_url: Option<String>,
    pub is_followup: bool,
    /// The answer that produced this follow-up. Unique across the table.
    pub source_answer_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AnswerRow {
    pub id: Uuid,
    pub question_id: Uuid,
    pub user_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl InterviewRow {
    pub fn stored_status(&self) -> InterviewStatus {
        InterviewStatus::from_stored(&self.status)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuestionOut {
    pub id: Uuid,
    pub index_num: i32,
    pub text: String,
    pub audio_url: Option<String>,
    pub is_followup: bool,
}

impl From<&QuestionRow> for QuestionOut {
    fn from(row: &QuestionRow) -> Self {
        Self {
            id: row.id,
            index_num: row.index_num,
            text: row.text.clone(),
            audio_url: row.audio_url.clone(),
            is_followup: row.is_followup,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewOut {
    pub id: Uuid,
    pub company: String,
    pub role: String,
    pub resume_file_url: String,
    pub status: InterviewStatus,
    pub created_at: DateTime<Utc>,
    pub questions: Vec<QuestionOut>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnswerCreate {
    pub interview_id: Uuid,
    pub question_id: Uuid,
    pub answer_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowupOut {
    pub question: QuestionOut,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinishOut {
    pub message: String,
    pub status: InterviewStatus,
}
