// src/models/quiz.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::question::{PublicQuestion, Question};

/// Timing, attempt and response-shaping rules of a quiz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Settings {
    /// Absent means untimed.
    #[validate(range(min = 1, max = 1440))]
    pub time_limit_minutes: Option<i32>,

    #[validate(range(min = 1, max = 100))]
    pub attempts_allowed: i32,

    pub show_correct_answers: bool,
    pub show_score_immediately: bool,
    pub randomize_questions: bool,
    pub require_login: bool,

    /// Sessions may only start inside this window.
    pub available_from: Option<DateTime<Utc>>,
    pub available_until: Option<DateTime<Utc>>,

    #[validate(range(min = 0, max = 100))]
    pub passing_score_percent: Option<i32>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            time_limit_minutes: None,
            attempts_allowed: 1,
            show_correct_answers: false,
            show_score_immediately: true,
            randomize_questions: false,
            require_login: false,
            available_from: None,
            available_until: None,
            passing_score_percent: None,
        }
    }
}

impl Settings {
    pub fn time_limit_seconds(&self) -> Option<i64> {
        self.time_limit_minutes.map(|m| i64::from(m) * 60)
    }

    /// Runs the derive checks plus the cross-field ones.
    pub fn check(&self) -> Result<(), validator::ValidationErrors> {
        self.validate()?;
        if let (Some(from), Some(until)) = (self.available_from, self.available_until) {
            if from >= until {
                let mut errors = validator::ValidationErrors::new();
                errors.add(
                    "available_until",
                    validator::ValidationError::new("available_until_before_available_from"),
                );
                return Err(errors);
            }
        }
        Ok(())
    }
}

/// The teacher who owns a quiz, as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeacherRef {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
}

/// Represents the 'quizzes' table: a full quiz definition, answer keys included.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub teacher: TeacherRef,
    pub questions: Vec<Question>,
    pub settings: Settings,
    /// Unique and immutable once assigned.
    pub shareable_link: String,
    /// Soft-delete flag. Inactive quizzes are invisible to takers.
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Quiz {
    pub fn total_points(&self) -> i32 {
        self.questions.iter().map(|q| q.points).sum()
    }
}

/// A quiz ready to be persisted; the store assigns nothing but checks link uniqueness.
#[derive(Debug, Clone)]
pub struct NewQuiz {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub teacher: TeacherRef,
    pub questions: Vec<Question>,
    pub settings: Settings,
    pub shareable_link: String,
    pub created_at: DateTime<Utc>,
}

impl NewQuiz {
    pub fn into_quiz(self) -> Quiz {
        Quiz {
            id: self.id,
            title: self.title,
            description: self.description,
            teacher: self.teacher,
            questions: self.questions,
            settings: self.settings,
            shareable_link: self.shareable_link,
            is_active: true,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

/// DTO for creating a new quiz.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuizRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[serde(default)]
    #[validate(length(max = 5000))]
    pub description: String,

    /// Optional contact shown to takers next to the teacher's name.
    #[validate(length(max = 200))]
    pub contact: Option<String>,

    #[validate(length(min = 1, max = 200), nested)]
    pub questions: Vec<Question>,

    #[serde(default)]
    #[validate(nested)]
    pub settings: Settings,
}

/// Returned once a quiz is created.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateQuizResponse {
    pub quiz_id: Uuid,
    pub shareable_link: String,
}

/// One row of the teacher's quiz list: definition metadata plus aggregates,
/// never raw submissions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizSummary {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub shareable_link: String,
    pub is_active: bool,
    pub settings: Settings,
    pub question_count: usize,
    pub total_points: i32,
    pub submission_count: i64,
    pub average_percentage: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// What a taker sees after resolving a link. The answer key never appears here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TakerView {
    pub title: String,
    pub description: String,
    pub teacher_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_contact: Option<String>,
    pub shareable_link: String,
    pub question_count: usize,
    pub total_points: i32,
    pub time_limit_minutes: Option<i32>,
    pub attempts_allowed: i32,
    pub require_login: bool,
    pub available_until: Option<DateTime<Utc>>,
    pub passing_score_percent: Option<i32>,
    pub questions: Vec<PublicQuestion>,
}

impl TakerView {
    /// Builds the stripped view in the given presentation order
    /// (a permutation of original question indexes).
    pub fn build(quiz: &Quiz, order: &[usize]) -> Self {
        let questions = order
            .iter()
            .filter_map(|&i| quiz.questions.get(i).map(|q| PublicQuestion::from_question(i, q)))
            .collect();

        Self {
            title: quiz.title.clone(),
            description: quiz.description.clone(),
            teacher_name: quiz.teacher.name.clone(),
            teacher_contact: quiz.teacher.contact.clone(),
            shareable_link: quiz.shareable_link.clone(),
            question_count: quiz.questions.len(),
            total_points: quiz.total_points(),
            time_limit_minutes: quiz.settings.time_limit_minutes,
            attempts_allowed: quiz.settings.attempts_allowed,
            require_login: quiz.settings.require_login,
            available_until: quiz.settings.available_until,
            passing_score_percent: quiz.settings.passing_score_percent,
            questions,
        }
    }

    pub fn in_original_order(quiz: &Quiz) -> Self {
        let order: Vec<usize> = (0..quiz.questions.len()).collect();
        Self::build(quiz, &order)
    }
}
