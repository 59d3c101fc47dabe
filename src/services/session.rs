// src/services/session.rs

//! Session controller: one taker's attempt from start to finalize.
//!
//! NotStarted -> InProgress -> Finalized(Submitted | AutoSubmitted).
//! Nothing is written before finalize; finalize is a single conditional
//! append keyed by the session id, so duplicate or racing calls persist at
//! most one submission.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};
use uuid::Uuid;

use crate::{
    config::Config,
    error::AppError,
    models::{
        question::AnswerValue,
        quiz::{Quiz, Settings, TakerView},
        session::{StartSessionResponse, SubmitSessionRequest},
        submission::{AnswerFeedback, AppendOutcome, FinalizedAs, Submission, SubmissionResult},
    },
    services::{grader, ledger, quizzes},
    store::QuizStore,
    utils::{
        jwt::Claims,
        session_token::{SessionClaims, sign_session, verify_session},
    },
};

const MAX_NAME_LEN: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NotStarted,
    InProgress,
    Finalized(FinalizedAs),
}

/// Which path triggered finalize. Both converge on `Session::finalize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalizeMode {
    ManualSubmit,
    AutoDeadline,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub taker_id: String,
    pub taker_name: String,
    pub authenticated: bool,
    pub started_at: Option<DateTime<Utc>>,
    pub deadline: Option<DateTime<Utc>>,
    pub seed: u64,
    question_count: usize,
    state: SessionState,
    answers: BTreeMap<usize, AnswerValue>,
}

impl Session {
    /// Resolves who is taking the quiz. Requires a signed-in taker when the
    /// quiz demands it, otherwise a display name for a fresh guest id.
    /// A signed-in taker keeps their own id even on open quizzes.
    pub fn new(
        quiz: &Quiz,
        identity: Option<&Claims>,
        guest_name: Option<&str>,
    ) -> Result<Self, AppError> {
        let (taker_id, taker_name, authenticated) = match identity {
            Some(claims) => (claims.sub.clone(), claims.display_name(), true),
            None if quiz.settings.require_login => return Err(AppError::LoginRequired),
            None => {
                let name = guest_name.map(str::trim).unwrap_or_default();
                if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
                    return Err(AppError::ValidationError(
                        "A display name between 1 and 100 characters is required".to_string(),
                    ));
                }
                (format!("guest_{}", Uuid::new_v4().simple()), name.to_string(), false)
            }
        };

        Ok(Self {
            id: Uuid::new_v4(),
            quiz_id: quiz.id,
            taker_id,
            taker_name,
            authenticated,
            started_at: None,
            deadline: None,
            seed: rand::random::<u64>(),
            question_count: quiz.questions.len(),
            state: SessionState::NotStarted,
            answers: BTreeMap::new(),
        })
    }

    /// Rebuilds an in-progress session from its verified token.
    pub fn resume(claims: &SessionClaims, quiz: &Quiz) -> Self {
        Self {
            id: claims.sid,
            quiz_id: claims.quiz_id,
            taker_id: claims.taker_id.clone(),
            taker_name: claims.taker_name.clone(),
            authenticated: claims.authenticated,
            started_at: Some(claims.started_at()),
            deadline: claims.deadline(),
            seed: claims.seed,
            question_count: quiz.questions.len(),
            state: SessionState::InProgress,
            answers: BTreeMap::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn answers(&self) -> &BTreeMap<usize, AnswerValue> {
        &self.answers
    }

    /// NotStarted -> InProgress. Leaves the session untouched on rejection.
    pub fn start(
        &mut self,
        settings: &Settings,
        previous_attempts: i64,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        if self.state != SessionState::NotStarted {
            return Err(AppError::Conflict("Session has already started".to_string()));
        }
        ledger::ensure_attempt_available(settings, previous_attempts)?;

        self.started_at = Some(now);
        self.deadline = settings
            .time_limit_minutes
            .map(|m| now + Duration::minutes(i64::from(m)));
        self.state = SessionState::InProgress;
        Ok(())
    }

    /// Last write wins; any order. No side effects outside the session.
    pub fn record_answer(&mut self, question_index: usize, answer: AnswerValue) -> Result<(), AppError> {
        match self.state {
            SessionState::InProgress => {}
            SessionState::NotStarted => {
                return Err(AppError::BadRequest("Session has not started".to_string()));
            }
            SessionState::Finalized(_) => return Err(AppError::AlreadySubmitted),
        }
        if question_index >= self.question_count {
            return Err(AppError::BadRequest(format!(
                "question_index {} is out of range (quiz has {} questions)",
                question_index, self.question_count
            )));
        }
        self.answers.insert(question_index, answer);
        Ok(())
    }

    /// InProgress -> Finalized. Grades every question and builds the one
    /// submission this session may produce.
    pub fn finalize(
        &mut self,
        quiz: &Quiz,
        mode: FinalizeMode,
        now: DateTime<Utc>,
    ) -> Result<Submission, AppError> {
        let started_at = match (self.state, self.started_at) {
            (SessionState::InProgress, Some(started_at)) => started_at,
            (SessionState::Finalized(_), _) => return Err(AppError::AlreadySubmitted),
            _ => return Err(AppError::BadRequest("Session has not started".to_string())),
        };

        let deadline_passed = self.deadline.is_some_and(|d| now >= d);
        let finalized_as = if mode == FinalizeMode::AutoDeadline || deadline_passed {
            FinalizedAs::AutoSubmitted
        } else {
            FinalizedAs::Submitted
        };

        let elapsed = (now - started_at).num_seconds().max(0);
        let time_spent_seconds = match quiz.settings.time_limit_seconds() {
            Some(limit) => elapsed.min(limit),
            None => elapsed,
        };

        let (answers, card) = grader::grade_all(&quiz.questions, &self.answers);
        self.state = SessionState::Finalized(finalized_as);

        Ok(Submission {
            id: Uuid::new_v4(),
            quiz_id: quiz.id,
            session_id: self.id,
            taker_id: self.taker_id.clone(),
            taker_name: self.taker_name.clone(),
            answers,
            score: card.score,
            total_points: card.total_points,
            percentage: card.percentage,
            time_spent_seconds,
            finalized_as,
            submitted_at: now,
        })
    }

    /// Original question indexes in the order this session presents them.
    pub fn presentation_order(&self, settings: &Settings) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.question_count).collect();
        if settings.randomize_questions {
            let mut rng = StdRng::seed_from_u64(self.seed);
            order.shuffle(&mut rng);
        }
        order
    }

    pub fn to_claims(&self, link: &str, retention_minutes: i64) -> Result<SessionClaims, AppError> {
        let started_at = self
            .started_at
            .ok_or_else(|| AppError::InternalServerError("Session not started".to_string()))?;
        let anchor = self.deadline.unwrap_or(started_at);
        let exp = (anchor + Duration::minutes(retention_minutes)).timestamp();

        Ok(SessionClaims {
            sid: self.id,
            quiz_id: self.quiz_id,
            link: link.to_string(),
            taker_id: self.taker_id.clone(),
            taker_name: self.taker_name.clone(),
            authenticated: self.authenticated,
            started_at: started_at.timestamp(),
            deadline: self.deadline.map(|d| d.timestamp()),
            seed: self.seed,
            exp: exp.max(0) as usize,
        })
    }
}

/// `startSession`: eligibility checks, attempt check, then a signed token.
/// Rejections leave nothing behind.
pub async fn start_session(
    store: &dyn QuizStore,
    config: &Config,
    link: &str,
    identity: Option<&Claims>,
    guest_name: Option<&str>,
    now: DateTime<Utc>,
) -> Result<StartSessionResponse, AppError> {
    let quiz = quizzes::load_for_taker(store, link, now).await?;

    let mut session = Session::new(&quiz, identity, guest_name)?;
    let previous = ledger::previous_attempts(store, quiz.id, &session.taker_id).await?;
    session.start(&quiz.settings, previous, now)?;

    let claims = session.to_claims(&quiz.shareable_link, config.session_retention_minutes)?;
    let session_token = sign_session(&claims, &config.session_secret)?;
    let view = TakerView::build(&quiz, &session.presentation_order(&quiz.settings));

    tracing::info!(
        quiz_id = %quiz.id,
        session_id = %session.id,
        taker = %session.taker_id,
        previous_attempts = previous,
        "Session started"
    );

    Ok(StartSessionResponse {
        session_token,
        session_id: session.id,
        taker_id: session.taker_id,
        taker_name: session.taker_name,
        started_at: now,
        deadline: session.deadline,
        previous_attempts: previous,
        quiz: view,
    })
}

/// `submitSession` / `autoSubmit`: replays recorded answers into the session,
/// finalizes it and appends the submission if this session has none yet.
pub async fn finalize_session(
    store: &dyn QuizStore,
    config: &Config,
    link: &str,
    request: SubmitSessionRequest,
    mode: FinalizeMode,
    now: DateTime<Utc>,
) -> Result<SubmissionResult, AppError> {
    let claims = verify_session(&request.session_token, &config.session_secret)?;
    if claims.link != link {
        return Err(AppError::BadRequest(
            "Session token does not belong to this quiz".to_string(),
        ));
    }

    let quiz = store
        .find_by_id(claims.quiz_id)
        .await?
        .filter(|q| q.is_active)
        .ok_or_else(|| AppError::NotFound("Quiz not found".to_string()))?;

    if quiz.settings.require_login && !claims.authenticated {
        return Err(AppError::LoginRequired);
    }

    let mut session = Session::resume(&claims, &quiz);
    for input in request.answers {
        session.record_answer(input.question_index, input.answer)?;
    }
    let submission = session.finalize(&quiz, mode, now)?;

    let outcome = store
        .append_submission(submission, Some(quiz.settings.attempts_allowed))
        .await?;

    let (stored, already_submitted) = match outcome {
        AppendOutcome::Inserted(s) => {
            tracing::info!(
                quiz_id = %quiz.id,
                session_id = %s.session_id,
                finalized_as = s.finalized_as.as_str(),
                percentage = s.percentage,
                "Session finalized"
            );
            (s, false)
        }
        AppendOutcome::Duplicate(s) => {
            tracing::warn!(session_id = %s.session_id, "Duplicate finalize ignored");
            (s, true)
        }
        AppendOutcome::AttemptsExhausted => {
            return Err(AppError::AttemptsExceeded {
                allowed: quiz.settings.attempts_allowed,
            });
        }
    };

    Ok(shape_result(&quiz, &stored, already_submitted))
}

/// Builds the taker-facing response. Purely presentational: the stored
/// submission is always complete.
pub fn shape_result(quiz: &Quiz, submission: &Submission, already_submitted: bool) -> SubmissionResult {
    let settings = &quiz.settings;
    let show_score = settings.show_score_immediately;

    let answers = settings.show_correct_answers.then(|| {
        submission
            .answers
            .iter()
            .filter_map(|graded| {
                quiz.questions.get(graded.question_index).map(|q| AnswerFeedback {
                    question_index: graded.question_index,
                    answer: graded.answer.clone(),
                    is_correct: graded.is_correct,
                    points_earned: graded.points_earned,
                    correct_answer: q.correct_answer.clone(),
                    explanation: q.explanation.clone(),
                })
            })
            .collect()
    });

    let message = match (already_submitted, submission.finalized_as) {
        (true, _) => "This session was already submitted",
        (false, FinalizedAs::AutoSubmitted) => "Time is up. Your answers were submitted automatically",
        (false, FinalizedAs::Submitted) => "Quiz submitted successfully",
    };

    SubmissionResult {
        submission_id: submission.id,
        session_id: submission.session_id,
        finalized_as: submission.finalized_as,
        submitted_at: submission.submitted_at,
        time_spent_seconds: submission.time_spent_seconds,
        already_submitted,
        score: show_score.then_some(submission.score),
        total_points: show_score.then_some(submission.total_points),
        percentage: show_score.then_some(submission.percentage),
        passed: grader::passed(settings, submission.percentage),
        answers,
        message: message.to_string(),
    }
}
