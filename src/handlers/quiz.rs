// src/handlers/quiz.rs

//! Teacher-facing quiz management. Every route here sits behind `auth_middleware`.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::quiz::{CreateQuizRequest, Settings},
    services::quizzes,
    state::AppState,
    utils::jwt::Claims,
};

/// Creates a quiz owned by the caller and returns its shareable link.
pub async fn create_quiz(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    let created = quizzes::create_quiz(
        state.store.as_ref(),
        &state.links,
        &claims,
        payload,
        Utc::now(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// Lists the caller's quizzes, newest first, with submission aggregates.
pub async fn list_quizzes(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let summaries = quizzes::list_for_teacher(state.store.as_ref(), &claims).await?;
    Ok(Json(summaries))
}

pub async fn get_quiz(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let owned = quizzes::get_quiz_for_owner(state.store.as_ref(), &state.policy, id, &claims).await?;
    Ok(Json(owned))
}

pub async fn update_settings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(settings): Json<Settings>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = quizzes::update_settings(
        state.store.as_ref(),
        &state.policy,
        id,
        &claims,
        settings,
        Utc::now(),
    )
    .await?;
    Ok(Json(quiz))
}

/// Soft delete. Repeating it is harmless.
pub async fn delete_quiz(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    quizzes::deactivate(state.store.as_ref(), &state.policy, id, &claims, Utc::now()).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_results(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let results = quizzes::get_results(state.store.as_ref(), &state.policy, id, &claims).await?;
    Ok(Json(results))
}
