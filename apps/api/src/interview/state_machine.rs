//! Interview lifecycle.
//!
//! Stored states are `created` (initial) and `finished` (terminal). `in_progress`
//! is never written: it is derived from "not finished and at least one answer".
//! Status never regresses.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewStatus {
    Created,
    InProgress,
    Finished,
}

/// Outcome of a transition request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Changed(InterviewStatus),
    /// Already in the requested state; nothing to write.
    Unchanged(InterviewStatus),
}

impl InterviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewStatus::Created => "created",
            InterviewStatus::InProgress => "in_progress",
            InterviewStatus::Finished => "finished",
        }
    }

    /// Reads the stored column. Anything other than `finished` is treated as `created`.
    pub fn from_stored(value: &str) -> Self {
        match value {
            "finished" => InterviewStatus::Finished,
            _ => InterviewStatus::Created,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, InterviewStatus::Finished)
    }

    /// Status as reported to callers.
    pub fn effective(stored: InterviewStatus, answer_count: i64) -> Self {
        match stored {
            InterviewStatus::Finished => InterviewStatus::Finished,
            _ if answer_count > 0 => InterviewStatus::InProgress,
            _ => InterviewStatus::Created,
        }
    }

    /// `finished` is reachable from any state; finishing twice is a no-op.
    pub fn finish(self) -> Transition {
        match self {
            InterviewStatus::Finished => Transition::Unchanged(InterviewStatus::Finished),
            InterviewStatus::Created | InterviewStatus::InProgress => {
                Transition::Changed(InterviewStatus::Finished)
            }
        }
    }

    /// Answers are accepted until the interview is finished.
    pub fn accepts_answers(&self) -> bool {
        !self.is_finished()
    }
}

impl Transition {
    pub fn status(&self) -> InterviewStatus {
        match self {
            Transition::Changed(s) | Transition::Unchanged(s) => *s,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finish_from_created() {
        assert_eq!(
            InterviewStatus::Created.finish(),
            Transition::Changed(InterviewStatus::Finished)
        );
    }

    #[test]
    fn test_finish_is_idempotent() {
        let first = InterviewStatus::Created.finish().status();
        let second = first.finish();
        assert_eq!(second, Transition::Unchanged(InterviewStatus::Finished));
        assert_eq!(second.status(), InterviewStatus::Finished);
    }

    #[test]
    fn test_effective_status_derives_in_progress() {
        assert_eq!(
            InterviewStatus::effective(InterviewStatus::Created, 0),
            InterviewStatus::Created
        );
        assert_eq!(
            InterviewStatus::effective(InterviewStatus::Created, 2),
            InterviewStatus::InProgress
        );
        assert_eq!(
            InterviewStatus::effective(InterviewStatus::Finished, 2),
            InterviewStatus::Finished
        );
    }

    #[test]
    fn test_stored_round_trip_never_yields_in_progress() {
        assert_eq!(InterviewStatus::from_stored("created"), InterviewStatus::Created);
        assert_eq!(InterviewStatus::from_stored("finished"), InterviewStatus::Finished);
        assert_eq!(InterviewStatus::from_stored("in_progress"), InterviewStatus::Created);
    }

    #[test]
    fn test_finished_rejects_answers() {
        assert!(InterviewStatus::Created.accepts_answers());
        assert!(!InterviewStatus::Finished.accepts_answers());
    }

    #[test]
    fn test_status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(InterviewStatus::InProgress).unwrap(),
            "in_progress"
        );
    }
}
