// src/store/mod.rs

//! Persistence seam. Everything above this trait (grading, sessions,
//! analytics) is backend-agnostic; implementations only store and fetch.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        quiz::{NewQuiz, Quiz, QuizSummary, Settings},
        submission::{AppendOutcome, Submission},
    },
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryQuizStore;
pub use postgres::PgQuizStore;

/// Result of trying to persist a quiz under a freshly drawn link.
#[derive(Debug)]
pub enum LinkClaim {
    Claimed(Quiz),
    /// Another quiz already holds this link; draw again.
    Taken,
}

#[async_trait]
pub trait QuizStore: Send + Sync {
    /// Inserts the quiz if its link is unused. Never overwrites.
    async fn insert_quiz(&self, quiz: NewQuiz) -> Result<LinkClaim, AppError>;

    async fn find_by_id(&self, quiz_id: Uuid) -> Result<Option<Quiz>, AppError>;

    /// Resolves a link regardless of `is_active`; callers decide visibility.
    async fn find_by_link(&self, link: &str) -> Result<Option<Quiz>, AppError>;

    /// Newest first, with submission aggregates.
    async fn list_by_teacher(&self, teacher_id: &str) -> Result<Vec<QuizSummary>, AppError>;

    async fn update_settings(
        &self,
        quiz_id: Uuid,
        settings: &Settings,
        now: DateTime<Utc>,
    ) -> Result<Option<Quiz>, AppError>;

    /// Returns false when the quiz does not exist.
    async fn deactivate(&self, quiz_id: Uuid, now: DateTime<Utc>) -> Result<bool, AppError>;

    /// Submissions in append order.
    async fn list_submissions(&self, quiz_id: Uuid) -> Result<Vec<Submission>, AppError>;

    async fn count_submissions_for_taker(
        &self,
        quiz_id: Uuid,
        taker_id: &str,
    ) -> Result<i64, AppError>;

    /// Atomic insert-if-absent keyed by `submission.session_id`.
    ///
    /// With `attempt_cap = Some(n)`, the insert is refused when the taker
    /// already holds `n` submissions for this quiz. The duplicate check runs
    /// first, so retrying a finalized session always returns its submission.
    async fn append_submission(
        &self,
        submission: Submission,
        attempt_cap: Option<i32>,
    ) -> Result<AppendOutcome, AppError>;
}
