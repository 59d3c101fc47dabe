// src/models/session.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{question::AnswerValue, quiz::TakerView};

/// DTO for starting a session.
/// Anonymous takers must provide a display name; authenticated takers may omit it.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct StartSessionRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StartSessionResponse {
    /// Signed session state. Must be sent back on submit.
    pub session_token: String,
    pub session_id: Uuid,
    pub taker_id: String,
    pub taker_name: String,
    pub started_at: DateTime<Utc>,
    /// When the client countdown should fire auto-submit.
    pub deadline: Option<DateTime<Utc>>,
    pub previous_attempts: i64,
    /// Questions in presentation order, answer key stripped.
    pub quiz: TakerView,
}

/// One recorded answer, keyed by the question's original index.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnswerInput {
    pub question_index: usize,
    pub answer: AnswerValue,
}

/// DTO for finalizing a session (both submit and auto-submit).
#[derive(Debug, Deserialize)]
pub struct SubmitSessionRequest {
    pub session_token: String,

    /// Recorded answers in the order they were given; later entries for the
    /// same question win.
    #[serde(default)]
    pub answers: Vec<AnswerInput>,
}
