// src/services/analytics.rs

use crate::models::{
    analytics::{Analytics, QuestionStats},
    quiz::Quiz,
    submission::Submission,
};

fn rounded_mean(sum: i64, count: usize) -> i64 {
    if count == 0 {
        return 0;
    }
    (sum as f64 / count as f64).round() as i64
}

fn rate(part: usize, whole: usize) -> i32 {
    if whole == 0 {
        return 0;
    }
    (part as f64 * 100.0 / whole as f64).round() as i32
}

/// Summary statistics, computed fresh from the submission list on every call.
/// An empty list yields zeroes (and `None` pass rate) rather than an error.
pub fn summarize(quiz: &Quiz, submissions: &[Submission]) -> Analytics {
    let total = submissions.len();
    let passing = quiz.settings.passing_score_percent;

    let percentage_sum: i64 = submissions.iter().map(|s| i64::from(s.percentage)).sum();
    let time_sum: i64 = submissions.iter().map(|s| s.time_spent_seconds).sum();

    let pass_rate = passing.map(|threshold| {
        let passed = submissions.iter().filter(|s| s.percentage >= threshold).count();
        rate(passed, total)
    });

    let questions = (0..quiz.questions.len())
        .map(|index| {
            let correct_count = submissions
                .iter()
                .filter(|s| {
                    s.answers
                        .iter()
                        .any(|a| a.question_index == index && a.is_correct)
                })
                .count();
            QuestionStats {
                question_index: index,
                correct_count,
                correct_rate: rate(correct_count, total),
            }
        })
        .collect();

    Analytics {
        total_submissions: total,
        average_percentage: rounded_mean(percentage_sum, total) as i32,
        highest_percentage: submissions.iter().map(|s| s.percentage).max().unwrap_or(0),
        lowest_percentage: submissions.iter().map(|s| s.percentage).min().unwrap_or(0),
        pass_rate,
        average_time_spent_seconds: rounded_mean(time_sum, total),
        questions,
    }
}
