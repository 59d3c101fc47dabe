// src/handlers/take.rs

//! Taker-facing routes, addressed by shareable link. Signing in is optional
//! unless the quiz requires it.

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    error::AppError,
    models::session::{StartSessionRequest, SubmitSessionRequest},
    services::{
        quizzes,
        session::{self, FinalizeMode},
    },
    state::AppState,
    utils::jwt::Identity,
};

/// Resolves a link into the key-free view of the quiz.
pub async fn resolve_quiz(
    State(state): State<AppState>,
    Path(link): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let view = quizzes::resolve_for_taker(state.store.as_ref(), &link, Utc::now()).await?;
    Ok(Json(view))
}

pub async fn start_session(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(link): Path<String>,
    Json(payload): Json<StartSessionRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let started = session::start_session(
        state.store.as_ref(),
        &state.config,
        &link,
        identity.0.as_ref(),
        payload.name.as_deref(),
        Utc::now(),
    )
    .await?;

    Ok(Json(started))
}

pub async fn submit_session(
    State(state): State<AppState>,
    Path(link): Path<String>,
    Json(payload): Json<SubmitSessionRequest>,
) -> Result<impl IntoResponse, AppError> {
    finalize(state, link, payload, FinalizeMode::ManualSubmit).await
}

/// Deadline path. Converges on the same finalize as a manual submit.
pub async fn auto_submit_session(
    State(state): State<AppState>,
    Path(link): Path<String>,
    Json(payload): Json<SubmitSessionRequest>,
) -> Result<impl IntoResponse, AppError> {
    finalize(state, link, payload, FinalizeMode::AutoDeadline).await
}

async fn finalize(
    state: AppState,
    link: String,
    payload: SubmitSessionRequest,
    mode: FinalizeMode,
) -> Result<impl IntoResponse, AppError> {
    let result = session::finalize_session(
        state.store.as_ref(),
        &state.config,
        &link,
        payload,
        mode,
        Utc::now(),
    )
    .await?;

    Ok(Json(result))
}
