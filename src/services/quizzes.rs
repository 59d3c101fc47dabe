// src/services/quizzes.rs

//! Quiz registry: definitions, shareable links and owner-only operations.

use chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        analytics::{OwnedQuiz, QuizResults},
        quiz::{CreateQuizRequest, CreateQuizResponse, NewQuiz, Quiz, QuizSummary, Settings, TakerView, TeacherRef},
    },
    services::{
        analytics,
        link_issuer::{LinkIssuer, MAX_LINK_DRAWS},
        policy::AccessPolicy,
    },
    store::{LinkClaim, QuizStore},
    utils::{
        html::{clean_html, clean_question},
        jwt::Claims,
    },
};

/// `createQuiz`: validates the definition, cleans markup and persists it
/// under a fresh link. Rejected definitions leave nothing behind.
pub async fn create_quiz(
    store: &dyn QuizStore,
    links: &LinkIssuer,
    teacher: &Claims,
    payload: CreateQuizRequest,
    now: DateTime<Utc>,
) -> Result<CreateQuizResponse, AppError> {
    payload.validate()?;
    payload.settings.check()?;
    for (index, question) in payload.questions.iter().enumerate() {
        question
            .check_answer_key()
            .map_err(|msg| AppError::ValidationError(format!("Question {}: {}", index + 1, msg)))?;
    }

    let title = clean_html(payload.title.trim());
    if title.is_empty() {
        return Err(AppError::ValidationError("Title cannot be empty".to_string()));
    }

    let teacher_ref = TeacherRef {
        id: teacher.sub.clone(),
        name: teacher.display_name(),
        contact: payload
            .contact
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(clean_html),
    };
    let description = clean_html(&payload.description);
    let questions: Vec<_> = payload.questions.into_iter().map(clean_question).collect();
    // Cleaning can empty markup-only text or options; check the stored form again.
    for (index, question) in questions.iter().enumerate() {
        question.validate().map_err(|_| {
            AppError::ValidationError(format!(
                "Question {}: text is empty or too long after removing markup",
                index + 1
            ))
        })?;
        question
            .check_answer_key()
            .map_err(|msg| AppError::ValidationError(format!("Question {}: {}", index + 1, msg)))?;
    }
    let id = Uuid::new_v4();

    for draw in 1..=MAX_LINK_DRAWS {
        let candidate = NewQuiz {
            id,
            title: title.clone(),
            description: description.clone(),
            teacher: teacher_ref.clone(),
            questions: questions.clone(),
            settings: payload.settings.clone(),
            shareable_link: links.issue(),
            created_at: now,
        };

        match store.insert_quiz(candidate).await? {
            LinkClaim::Claimed(quiz) => {
                tracing::info!(
                    quiz_id = %quiz.id,
                    teacher = %quiz.teacher.id,
                    questions = quiz.questions.len(),
                    "Quiz created"
                );
                return Ok(CreateQuizResponse {
                    quiz_id: quiz.id,
                    shareable_link: quiz.shareable_link,
                });
            }
            LinkClaim::Taken => {
                tracing::warn!(draw, "Shareable link collision, drawing again");
            }
        }
    }

    Err(AppError::InternalServerError(
        "Could not allocate a unique shareable link".to_string(),
    ))
}

/// Loads an active quiz and checks its availability window.
pub async fn load_for_taker(
    store: &dyn QuizStore,
    link: &str,
    now: DateTime<Utc>,
) -> Result<Quiz, AppError> {
    let not_found = || AppError::NotFound("Quiz not found".to_string());

    if !LinkIssuer::is_well_formed(link) {
        return Err(not_found());
    }

    let quiz = store
        .find_by_link(link)
        .await?
        .filter(|q| q.is_active)
        .ok_or_else(not_found)?;

    let settings = &quiz.settings;
    if settings.available_from.is_some_and(|from| now < from) {
        return Err(AppError::NotAvailable("This quiz is not open yet".to_string()));
    }
    if settings.available_until.is_some_and(|until| now > until) {
        return Err(AppError::NotAvailable("This quiz is no longer available".to_string()));
    }

    Ok(quiz)
}

/// `resolveForTaker`: the stripped, key-free view of a quiz.
pub async fn resolve_for_taker(
    store: &dyn QuizStore,
    link: &str,
    now: DateTime<Utc>,
) -> Result<TakerView, AppError> {
    let quiz = load_for_taker(store, link, now).await?;
    Ok(TakerView::in_original_order(&quiz))
}

async fn load_owned(
    store: &dyn QuizStore,
    policy: &AccessPolicy,
    quiz_id: Uuid,
    caller: &Claims,
) -> Result<Quiz, AppError> {
    let quiz = store
        .find_by_id(quiz_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Quiz not found".to_string()))?;
    policy.ensure_owner(caller, &quiz)?;
    Ok(quiz)
}

/// `getQuizForOwner`: the full record, answer keys and submissions included.
pub async fn get_quiz_for_owner(
    store: &dyn QuizStore,
    policy: &AccessPolicy,
    quiz_id: Uuid,
    caller: &Claims,
) -> Result<OwnedQuiz, AppError> {
    let quiz = load_owned(store, policy, quiz_id, caller).await?;
    let submissions = store.list_submissions(quiz.id).await?;
    Ok(OwnedQuiz { quiz, submissions })
}

pub async fn list_for_teacher(
    store: &dyn QuizStore,
    caller: &Claims,
) -> Result<Vec<QuizSummary>, AppError> {
    store.list_by_teacher(&caller.sub).await
}

/// Replaces the settings block. Questions, link and owner never change.
/// Sessions already in progress keep the deadline they started with.
pub async fn update_settings(
    store: &dyn QuizStore,
    policy: &AccessPolicy,
    quiz_id: Uuid,
    caller: &Claims,
    settings: Settings,
    now: DateTime<Utc>,
) -> Result<Quiz, AppError> {
    settings.check()?;
    load_owned(store, policy, quiz_id, caller).await?;

    let updated = store
        .update_settings(quiz_id, &settings, now)
        .await?
        .ok_or_else(|| AppError::NotFound("Quiz not found".to_string()))?;

    tracing::info!(quiz_id = %quiz_id, caller = %caller.sub, "Quiz settings updated");
    Ok(updated)
}

/// `deactivate`: soft delete. Idempotent; the link stays reserved.
pub async fn deactivate(
    store: &dyn QuizStore,
    policy: &AccessPolicy,
    quiz_id: Uuid,
    caller: &Claims,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    load_owned(store, policy, quiz_id, caller).await?;
    if !store.deactivate(quiz_id, now).await? {
        return Err(AppError::NotFound("Quiz not found".to_string()));
    }
    tracing::info!(quiz_id = %quiz_id, caller = %caller.sub, "Quiz deactivated");
    Ok(())
}

/// `getResults`: submissions plus analytics, owner only.
pub async fn get_results(
    store: &dyn QuizStore,
    policy: &AccessPolicy,
    quiz_id: Uuid,
    caller: &Claims,
) -> Result<QuizResults, AppError> {
    let quiz = load_owned(store, policy, quiz_id, caller).await?;
    let submissions = store.list_submissions(quiz.id).await?;
    let analytics = analytics::summarize(&quiz, &submissions);
    Ok(QuizResults { quiz, submissions, analytics })
}
