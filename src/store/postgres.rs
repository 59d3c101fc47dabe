// src/store/postgres.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, types::Json};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        question::Question,
        quiz::{NewQuiz, Quiz, QuizSummary, Settings, TeacherRef},
        submission::{AppendOutcome, FinalizedAs, GradedAnswer, Submission},
    },
    store::{LinkClaim, QuizStore},
};

const QUIZ_COLUMNS: &str = "id, title, description, teacher_id, teacher_name, teacher_contact, \
     questions, settings, shareable_link, is_active, created_at, updated_at";

const SUBMISSION_COLUMNS: &str = "id, quiz_id, session_id, taker_id, taker_name, answers, score, \
     total_points, percentage, time_spent_seconds, finalized_as, submitted_at";

/// Represents one row of the 'quizzes' table.
#[derive(sqlx::FromRow)]
struct QuizRow {
    id: Uuid,
    title: String,
    description: String,
    teacher_id: String,
    teacher_name: String,
    teacher_contact: Option<String>,
    questions: Json<Vec<Question>>,
    settings: Json<Settings>,
    shareable_link: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<QuizRow> for Quiz {
    fn from(row: QuizRow) -> Self {
        Quiz {
            id: row.id,
            title: row.title,
            description: row.description,
            teacher: TeacherRef {
                id: row.teacher_id,
                name: row.teacher_name,
                contact: row.teacher_contact,
            },
            questions: row.questions.0,
            settings: row.settings.0,
            shareable_link: row.shareable_link,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Quiz row joined with its submission aggregates.
#[derive(sqlx::FromRow)]
struct SummaryRow {
    #[sqlx(flatten)]
    quiz: QuizRow,
    submission_count: i64,
    average_percentage: i32,
}

/// Represents one row of the 'quiz_submissions' table.
#[derive(sqlx::FromRow)]
struct SubmissionRow {
    id: Uuid,
    quiz_id: Uuid,
    session_id: Uuid,
    taker_id: String,
    taker_name: String,
    answers: Json<Vec<GradedAnswer>>,
    score: i32,
    total_points: i32,
    percentage: i32,
    time_spent_seconds: i64,
    finalized_as: String,
    submitted_at: DateTime<Utc>,
}

impl TryFrom<SubmissionRow> for Submission {
    type Error = AppError;

    fn try_from(row: SubmissionRow) -> Result<Self, Self::Error> {
        let finalized_as = FinalizedAs::parse(&row.finalized_as).ok_or_else(|| {
            AppError::InternalServerError(format!(
                "Unknown finalized_as value '{}'",
                row.finalized_as
            ))
        })?;

        Ok(Submission {
            id: row.id,
            quiz_id: row.quiz_id,
            session_id: row.session_id,
            taker_id: row.taker_id,
            taker_name: row.taker_name,
            answers: row.answers.0,
            score: row.score,
            total_points: row.total_points,
            percentage: row.percentage,
            time_spent_seconds: row.time_spent_seconds,
            finalized_as,
            submitted_at: row.submitted_at,
        })
    }
}

/// Postgres-backed store. Link uniqueness and submission idempotency are
/// enforced by unique constraints, not by read-then-write checks.
#[derive(Clone)]
pub struct PgQuizStore {
    pool: PgPool,
}

impl PgQuizStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl QuizStore for PgQuizStore {
    async fn insert_quiz(&self, quiz: NewQuiz) -> Result<LinkClaim, AppError> {
        let sql = format!(
            r#"
            INSERT INTO quizzes
            (id, title, description, teacher_id, teacher_name, teacher_contact,
             questions, settings, shareable_link, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, TRUE, $10, $10)
            ON CONFLICT (shareable_link) DO NOTHING
            RETURNING {QUIZ_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, QuizRow>(&sql)
            .bind(quiz.id)
            .bind(&quiz.title)
            .bind(&quiz.description)
            .bind(&quiz.teacher.id)
            .bind(&quiz.teacher.name)
            .bind(&quiz.teacher.contact)
            .bind(Json(&quiz.questions))
            .bind(Json(&quiz.settings))
            .bind(&quiz.shareable_link)
            .bind(quiz.created_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to insert quiz: {:?}", e);
                AppError::from(e)
            })?;

        Ok(match row {
            Some(row) => LinkClaim::Claimed(row.into()),
            None => LinkClaim::Taken,
        })
    }

    async fn find_by_id(&self, quiz_id: Uuid) -> Result<Option<Quiz>, AppError> {
        let sql = format!("SELECT {QUIZ_COLUMNS} FROM quizzes WHERE id = $1");
        let row = sqlx::query_as::<_, QuizRow>(&sql)
            .bind(quiz_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Quiz::from))
    }

    async fn find_by_link(&self, link: &str) -> Result<Option<Quiz>, AppError> {
        let sql = format!("SELECT {QUIZ_COLUMNS} FROM quizzes WHERE shareable_link = $1");
        let row = sqlx::query_as::<_, QuizRow>(&sql)
            .bind(link)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Quiz::from))
    }

    async fn list_by_teacher(&self, teacher_id: &str) -> Result<Vec<QuizSummary>, AppError> {
        let rows = sqlx::query_as::<_, SummaryRow>(
            r#"
            SELECT
                q.id, q.title, q.description, q.teacher_id, q.teacher_name, q.teacher_contact,
                q.questions, q.settings, q.shareable_link, q.is_active, q.created_at, q.updated_at,
                COUNT(s.id) AS submission_count,
                COALESCE(ROUND(AVG(s.percentage))::INT4, 0) AS average_percentage
            FROM quizzes q
            LEFT JOIN quiz_submissions s ON s.quiz_id = q.id
            WHERE q.teacher_id = $1
            GROUP BY q.id
            ORDER BY q.created_at DESC
            "#,
        )
        .bind(teacher_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list quizzes: {:?}", e);
            AppError::from(e)
        })?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let quiz = Quiz::from(row.quiz);
                QuizSummary {
                    id: quiz.id,
                    question_count: quiz.questions.len(),
                    total_points: quiz.total_points(),
                    title: quiz.title,
                    description: quiz.description,
                    shareable_link: quiz.shareable_link,
                    is_active: quiz.is_active,
                    settings: quiz.settings,
                    submission_count: row.submission_count,
                    average_percentage: row.average_percentage,
                    created_at: quiz.created_at,
                    updated_at: quiz.updated_at,
                }
            })
            .collect())
    }

    async fn update_settings(
        &self,
        quiz_id: Uuid,
        settings: &Settings,
        now: DateTime<Utc>,
    ) -> Result<Option<Quiz>, AppError> {
        let sql = format!(
            "UPDATE quizzes SET settings = $1, updated_at = $2 WHERE id = $3 RETURNING {QUIZ_COLUMNS}"
        );
        let row = sqlx::query_as::<_, QuizRow>(&sql)
            .bind(Json(settings))
            .bind(now)
            .bind(quiz_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update quiz settings: {:?}", e);
                AppError::from(e)
            })?;
        Ok(row.map(Quiz::from))
    }

    async fn deactivate(&self, quiz_id: Uuid, now: DateTime<Utc>) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE quizzes SET is_active = FALSE, updated_at = $1 WHERE id = $2")
            .bind(now)
            .bind(quiz_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to deactivate quiz: {:?}", e);
                AppError::from(e)
            })?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_submissions(&self, quiz_id: Uuid) -> Result<Vec<Submission>, AppError> {
        let sql = format!(
            "SELECT {SUBMISSION_COLUMNS} FROM quiz_submissions WHERE quiz_id = $1 ORDER BY seq"
        );
        let rows = sqlx::query_as::<_, SubmissionRow>(&sql)
            .bind(quiz_id)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Submission::try_from).collect()
    }

    async fn count_submissions_for_taker(
        &self,
        quiz_id: Uuid,
        taker_id: &str,
    ) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM quiz_submissions WHERE quiz_id = $1 AND taker_id = $2",
        )
        .bind(quiz_id)
        .bind(taker_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn append_submission(
        &self,
        submission: Submission,
        attempt_cap: Option<i32>,
    ) -> Result<AppendOutcome, AppError> {
        let mut tx = self.pool.begin().await?;

        // Serializes appends per (quiz, taker) so the attempt count below stays exact.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(format!("{}:{}", submission.quiz_id, submission.taker_id))
            .execute(&mut *tx)
            .await?;

        let select_by_session =
            format!("SELECT {SUBMISSION_COLUMNS} FROM quiz_submissions WHERE session_id = $1");

        let existing = sqlx::query_as::<_, SubmissionRow>(&select_by_session)
            .bind(submission.session_id)
            .fetch_optional(&mut *tx)
            .await?;
        if let Some(row) = existing {
            tx.commit().await?;
            return Ok(AppendOutcome::Duplicate(row.try_into()?));
        }

        if let Some(cap) = attempt_cap {
            let held: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM quiz_submissions WHERE quiz_id = $1 AND taker_id = $2",
            )
            .bind(submission.quiz_id)
            .bind(&submission.taker_id)
            .fetch_one(&mut *tx)
            .await?;

            if held >= i64::from(cap) {
                tx.commit().await?;
                return Ok(AppendOutcome::AttemptsExhausted);
            }
        }

        let inserted: Option<Uuid> = sqlx::query_scalar(
            r#"
            INSERT INTO quiz_submissions
            (id, quiz_id, session_id, taker_id, taker_name, answers, score, total_points,
             percentage, time_spent_seconds, finalized_as, submitted_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (session_id) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(submission.id)
        .bind(submission.quiz_id)
        .bind(submission.session_id)
        .bind(&submission.taker_id)
        .bind(&submission.taker_name)
        .bind(Json(&submission.answers))
        .bind(submission.score)
        .bind(submission.total_points)
        .bind(submission.percentage)
        .bind(submission.time_spent_seconds)
        .bind(submission.finalized_as.as_str())
        .bind(submission.submitted_at)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to append submission: {:?}", e);
            AppError::from(e)
        })?;

        let outcome = match inserted {
            Some(_) => AppendOutcome::Inserted(submission),
            None => {
                let row = sqlx::query_as::<_, SubmissionRow>(&select_by_session)
                    .bind(submission.session_id)
                    .fetch_one(&mut *tx)
                    .await?;
                AppendOutcome::Duplicate(row.try_into()?)
            }
        };

        tx.commit().await?;
        Ok(outcome)
    }
}
