// src/models/analytics.rs

use serde::{Deserialize, Serialize};

use crate::models::{quiz::Quiz, submission::Submission};

/// Summary statistics over a quiz's submissions, recomputed on every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analytics {
    pub total_submissions: usize,
    pub average_percentage: i32,
    pub highest_percentage: i32,
    pub lowest_percentage: i32,
    /// `None` unless a passing score is configured.
    pub pass_rate: Option<i32>,
    pub average_time_spent_seconds: i64,
    pub questions: Vec<QuestionStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionStats {
    pub question_index: usize,
    pub correct_count: usize,
    pub correct_rate: i32,
}

/// Response for the teacher's results page.
#[derive(Debug, Serialize, Deserialize)]
pub struct QuizResults {
    pub quiz: Quiz,
    pub submissions: Vec<Submission>,
    pub analytics: Analytics,
}

/// Response for the owner's quiz view: the full record with its submissions.
#[derive(Debug, Serialize, Deserialize)]
pub struct OwnedQuiz {
    #[serde(flatten)]
    pub quiz: Quiz,
    pub submissions: Vec<Submission>,
}
