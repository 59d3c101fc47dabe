// src/services/grader.rs

//! Pure grading: no I/O, no failure mode. Every question, answered or not,
//! maps to exactly one `GradedAnswer`.

use std::collections::BTreeMap;

use crate::models::{
    question::{AnswerValue, Question, QuestionType, parse_bool},
    quiz::Settings,
    submission::GradedAnswer,
};

/// Totals derived from a set of graded answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreCard {
    pub score: i32,
    pub total_points: i32,
    pub percentage: i32,
}

/// Grades a single answer against its question.
pub fn grade(index: usize, question: &Question, submitted: Option<&AnswerValue>) -> GradedAnswer {
    let is_correct = submitted.is_some_and(|answer| is_correct(question, answer));

    GradedAnswer {
        question_index: index,
        answer: submitted.cloned(),
        is_correct,
        points_earned: if is_correct { question.points } else { 0 },
    }
}

fn is_correct(question: &Question, answer: &AnswerValue) -> bool {
    match question.question_type {
        QuestionType::MultipleChoice => match (answer.as_index(), question.correct_answer.as_index()) {
            (Some(given), Some(expected)) => given == expected,
            _ => false,
        },
        QuestionType::TrueFalse => match (parse_bool(answer), parse_bool(&question.correct_answer)) {
            (Some(given), Some(expected)) => given == expected,
            _ => false,
        },
        QuestionType::ShortAnswer => {
            normalize(&answer.as_text()) == normalize(&question.correct_answer.as_text())
        }
    }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Grades every question of the quiz in original order. Answers keyed by an
/// index with no matching question are ignored.
pub fn grade_all(
    questions: &[Question],
    answers: &BTreeMap<usize, AnswerValue>,
) -> (Vec<GradedAnswer>, ScoreCard) {
    let graded: Vec<GradedAnswer> = questions
        .iter()
        .enumerate()
        .map(|(i, q)| grade(i, q, answers.get(&i)))
        .collect();

    let card = score(questions, &graded);
    (graded, card)
}

/// Score over all questions. The denominator always counts every question,
/// answered or not.
pub fn score(questions: &[Question], graded: &[GradedAnswer]) -> ScoreCard {
    let total_points: i32 = questions.iter().map(|q| q.points).sum();
    let score: i32 = graded.iter().map(|g| g.points_earned).sum();

    ScoreCard {
        score,
        total_points,
        percentage: percentage(score, total_points),
    }
}

/// `round(100 * score / total)`, 0 for an empty denominator.
pub fn percentage(score: i32, total_points: i32) -> i32 {
    if total_points <= 0 {
        return 0;
    }
    (f64::from(score) * 100.0 / f64::from(total_points)).round() as i32
}

/// Pass verdict, or `None` when no passing score is configured.
pub fn passed(settings: &Settings, percentage: i32) -> Option<bool> {
    settings
        .passing_score_percent
        .map(|threshold| percentage >= threshold)
}
