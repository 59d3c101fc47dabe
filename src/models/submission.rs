// src/models/submission.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::question::AnswerValue;

/// Outcome of grading one question. Unanswered questions are present with
/// `answer: None` and zero points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradedAnswer {
    pub question_index: usize,
    pub answer: Option<AnswerValue>,
    pub is_correct: bool,
    pub points_earned: i32,
}

/// How a session reached the Finalized state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalizedAs {
    Submitted,
    AutoSubmitted,
}

impl FinalizedAs {
    pub fn as_str(&self) -> &'static str {
        match self {
            FinalizedAs::Submitted => "submitted",
            FinalizedAs::AutoSubmitted => "auto_submitted",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "submitted" => Some(FinalizedAs::Submitted),
            "auto_submitted" => Some(FinalizedAs::AutoSubmitted),
            _ => None,
        }
    }
}

/// Represents the 'quiz_submissions' table.
/// Append-only: written once per finalized session, never updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: Uuid,
    pub quiz_id: Uuid,
    /// Idempotency key: at most one submission exists per session.
    pub session_id: Uuid,
    pub taker_id: String,
    pub taker_name: String,
    pub answers: Vec<GradedAnswer>,
    pub score: i32,
    pub total_points: i32,
    pub percentage: i32,
    pub time_spent_seconds: i64,
    pub finalized_as: FinalizedAs,
    pub submitted_at: DateTime<Utc>,
}

/// Result of the store's conditional append.
#[derive(Debug)]
pub enum AppendOutcome {
    /// This call wrote the submission.
    Inserted(Submission),
    /// The session was already finalized; the stored submission is returned.
    Duplicate(Submission),
    /// The taker already holds `attempts_allowed` submissions from other sessions.
    AttemptsExhausted,
}

/// Per-question feedback returned to a taker when `show_correct_answers` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerFeedback {
    pub question_index: usize,
    pub answer: Option<AnswerValue>,
    pub is_correct: bool,
    pub points_earned: i32,
    pub correct_answer: AnswerValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// What the taker receives after finalize, shaped by the quiz settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionResult {
    pub submission_id: Uuid,
    pub session_id: Uuid,
    pub finalized_as: FinalizedAs,
    pub submitted_at: DateTime<Utc>,
    pub time_spent_seconds: i64,
    /// True when this call hit an already finalized session.
    pub already_submitted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_points: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answers: Option<Vec<AnswerFeedback>>,
    pub message: String,
}
