// src/store/memory.rs

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        quiz::{NewQuiz, Quiz, QuizSummary, Settings},
        submission::{AppendOutcome, Submission},
    },
    store::{LinkClaim, QuizStore},
};

#[derive(Default)]
struct Inner {
    quizzes: HashMap<Uuid, Quiz>,
    links: HashMap<String, Uuid>,
    submissions: HashMap<Uuid, Vec<Submission>>,
    /// session id -> (quiz id, position in that quiz's submission list)
    sessions: HashMap<Uuid, (Uuid, usize)>,
}

/// Process-local store. Every write takes the single write lock, so the
/// check-and-insert in `append_submission` is atomic.
#[derive(Default)]
pub struct MemoryQuizStore {
    inner: RwLock<Inner>,
}

impl MemoryQuizStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuizStore for MemoryQuizStore {
    async fn insert_quiz(&self, quiz: NewQuiz) -> Result<LinkClaim, AppError> {
        let mut inner = self.inner.write().await;
        if inner.links.contains_key(&quiz.shareable_link) {
            return Ok(LinkClaim::Taken);
        }
        if inner.quizzes.contains_key(&quiz.id) {
            return Err(AppError::Conflict("Quiz id already exists".to_string()));
        }

        let quiz = quiz.into_quiz();
        inner.links.insert(quiz.shareable_link.clone(), quiz.id);
        inner.submissions.insert(quiz.id, Vec::new());
        inner.quizzes.insert(quiz.id, quiz.clone());
        Ok(LinkClaim::Claimed(quiz))
    }

    async fn find_by_id(&self, quiz_id: Uuid) -> Result<Option<Quiz>, AppError> {
        Ok(self.inner.read().await.quizzes.get(&quiz_id).cloned())
    }

    async fn find_by_link(&self, link: &str) -> Result<Option<Quiz>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .links
            .get(link)
            .and_then(|id| inner.quizzes.get(id))
            .cloned())
    }

    async fn list_by_teacher(&self, teacher_id: &str) -> Result<Vec<QuizSummary>, AppError> {
        let inner = self.inner.read().await;
        let mut rows: Vec<QuizSummary> = inner
            .quizzes
            .values()
            .filter(|q| q.teacher.id == teacher_id)
            .map(|q| {
                let subs = inner.submissions.get(&q.id).map(Vec::as_slice).unwrap_or(&[]);
                let average_percentage = if subs.is_empty() {
                    0
                } else {
                    let sum: i64 = subs.iter().map(|s| i64::from(s.percentage)).sum();
                    (sum as f64 / subs.len() as f64).round() as i32
                };
                QuizSummary {
                    id: q.id,
                    title: q.title.clone(),
                    description: q.description.clone(),
                    shareable_link: q.shareable_link.clone(),
                    is_active: q.is_active,
                    settings: q.settings.clone(),
                    question_count: q.questions.len(),
                    total_points: q.total_points(),
                    submission_count: subs.len() as i64,
                    average_percentage,
                    created_at: q.created_at,
                    updated_at: q.updated_at,
                }
            })
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn update_settings(
        &self,
        quiz_id: Uuid,
        settings: &Settings,
        now: DateTime<Utc>,
    ) -> Result<Option<Quiz>, AppError> {
        let mut inner = self.inner.write().await;
        Ok(inner.quizzes.get_mut(&quiz_id).map(|quiz| {
            quiz.settings = settings.clone();
            quiz.updated_at = now;
            quiz.clone()
        }))
    }

    async fn deactivate(&self, quiz_id: Uuid, now: DateTime<Utc>) -> Result<bool, AppError> {
        let mut inner = self.inner.write().await;
        match inner.quizzes.get_mut(&quiz_id) {
            Some(quiz) => {
                quiz.is_active = false;
                quiz.updated_at = now;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_submissions(&self, quiz_id: Uuid) -> Result<Vec<Submission>, AppError> {
        Ok(self
            .inner
            .read()
            .await
            .submissions
            .get(&quiz_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn count_submissions_for_taker(
        &self,
        quiz_id: Uuid,
        taker_id: &str,
    ) -> Result<i64, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .submissions
            .get(&quiz_id)
            .map(|subs| subs.iter().filter(|s| s.taker_id == taker_id).count() as i64)
            .unwrap_or(0))
    }

    async fn append_submission(
        &self,
        submission: Submission,
        attempt_cap: Option<i32>,
    ) -> Result<AppendOutcome, AppError> {
        let mut inner = self.inner.write().await;

        if let Some((quiz_id, pos)) = inner.sessions.get(&submission.session_id).copied() {
            let existing = inner
                .submissions
                .get(&quiz_id)
                .and_then(|subs| subs.get(pos))
                .cloned()
                .ok_or_else(|| {
                    AppError::InternalServerError("Session index points nowhere".to_string())
                })?;
            return Ok(AppendOutcome::Duplicate(existing));
        }

        let Some(subs) = inner.submissions.get_mut(&submission.quiz_id) else {
            return Err(AppError::NotFound("Quiz not found".to_string()));
        };

        if let Some(cap) = attempt_cap {
            let held = subs.iter().filter(|s| s.taker_id == submission.taker_id).count();
            if held >= cap.max(0) as usize {
                return Ok(AppendOutcome::AttemptsExhausted);
            }
        }

        subs.push(submission.clone());
        let pos = subs.len() - 1;
        inner
            .sessions
            .insert(submission.session_id, (submission.quiz_id, pos));
        Ok(AppendOutcome::Inserted(submission))
    }
}
