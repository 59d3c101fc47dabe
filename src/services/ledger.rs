// src/services/ledger.rs

//! Attempt ledger. Counts are always read from stored submissions, never
//! kept as separate state, so they cannot drift from what was persisted.

use uuid::Uuid;

use crate::{error::AppError, models::quiz::Settings, store::QuizStore};

pub async fn previous_attempts(
    store: &dyn QuizStore,
    quiz_id: Uuid,
    taker_id: &str,
) -> Result<i64, AppError> {
    store.count_submissions_for_taker(quiz_id, taker_id).await
}

/// Fails with `AttemptsExceeded` once the budget is spent.
pub fn ensure_attempt_available(settings: &Settings, previous: i64) -> Result<(), AppError> {
    if previous >= i64::from(settings.attempts_allowed) {
        return Err(AppError::AttemptsExceeded {
            allowed: settings.attempts_allowed,
        });
    }
    Ok(())
}
