// src/models/question.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Question type: multiple choice, true/false or short free-text answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    TrueFalse,
    ShortAnswer,
}

/// An answer as it travels over the wire.
///
/// Multiple-choice answers are option indexes, true/false answers may arrive
/// as a JSON boolean or as the strings "true"/"false", and short answers are
/// free text. Variant order matters for untagged deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Bool(bool),
    Index(i64),
    Text(String),
}

impl AnswerValue {
    /// Option index, accepting numeric strings such as `"2"`.
    pub fn as_index(&self) -> Option<i64> {
        match self {
            AnswerValue::Index(i) => Some(*i),
            AnswerValue::Text(t) => t.trim().parse().ok(),
            AnswerValue::Bool(_) => None,
        }
    }

    pub fn as_text(&self) -> String {
        match self {
            AnswerValue::Bool(b) => b.to_string(),
            AnswerValue::Index(i) => i.to_string(),
            AnswerValue::Text(t) => t.clone(),
        }
    }
}

fn default_points() -> i32 {
    1
}

/// A question as authored by the teacher, including its answer key.
/// Stored as part of the quiz's `questions` JSON array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Question {
    #[validate(length(min = 1, max = 2000))]
    pub text: String,

    /// Mapped from the JSON key 'type' since `type` is a reserved keyword in Rust.
    #[serde(rename = "type")]
    pub question_type: QuestionType,

    /// Options for multiple-choice questions; empty otherwise.
    #[serde(default)]
    pub options: Vec<String>,

    /// Option index, "true"/"false", or the expected text.
    pub correct_answer: AnswerValue,

    #[serde(default = "default_points")]
    #[validate(range(min = 1, max = 1000))]
    pub points: i32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 5000))]
    pub explanation: Option<String>,
}

impl Question {
    /// Checks that the answer key is usable for this question's type.
    pub fn check_answer_key(&self) -> Result<(), String> {
        match self.question_type {
            QuestionType::MultipleChoice => {
                if self.options.len() < 2 {
                    return Err("multiple-choice questions need at least two options".into());
                }
                if self.options.iter().any(|o| o.trim().is_empty() || o.chars().count() > 500) {
                    return Err("options must be between 1 and 500 characters".into());
                }
                match self.correct_answer.as_index() {
                    Some(i) if i >= 0 && (i as usize) < self.options.len() => Ok(()),
                    _ => Err(format!(
                        "correct_answer must be an option index between 0 and {}",
                        self.options.len() - 1
                    )),
                }
            }
            QuestionType::TrueFalse => match parse_bool(&self.correct_answer) {
                Some(_) => Ok(()),
                None => Err("true-false correct_answer must be \"true\" or \"false\"".into()),
            },
            QuestionType::ShortAnswer => match &self.correct_answer {
                AnswerValue::Text(t) if !t.trim().is_empty() && t.chars().count() <= 500 => Ok(()),
                _ => Err("short-answer correct_answer must be non-empty text".into()),
            },
        }
    }
}

/// Reads a true/false answer from either a JSON boolean or a string.
pub fn parse_bool(value: &AnswerValue) -> Option<bool> {
    match value {
        AnswerValue::Bool(b) => Some(*b),
        AnswerValue::Text(t) => match t.trim().to_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        AnswerValue::Index(_) => None,
    }
}

/// DTO for sending a question to a taker (excludes answer key and explanation).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicQuestion {
    /// Original position in the quiz. Answers are keyed by this index.
    pub index: usize,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    pub points: i32,
}

impl PublicQuestion {
    pub fn from_question(index: usize, q: &Question) -> Self {
        Self {
            index,
            question_type: q.question_type,
            text: q.text.clone(),
            options: q.options.clone(),
            points: q.points,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mc(correct: AnswerValue) -> Question {
        Question {
            text: "Pick one".into(),
            question_type: QuestionType::MultipleChoice,
            options: vec!["A".into(), "B".into(), "C".into()],
            correct_answer: correct,
            points: 1,
            explanation: None,
        }
    }

    #[test]
    fn test_answer_value_untagged_parsing() {
        let v: Vec<AnswerValue> = serde_json::from_str(r#"[true, 2, "Paris"]"#).unwrap();
        assert_eq!(v[0], AnswerValue::Bool(true));
        assert_eq!(v[1], AnswerValue::Index(2));
        assert_eq!(v[2], AnswerValue::Text("Paris".into()));
    }

    #[test]
    fn test_multiple_choice_index_in_range() {
        assert!(mc(AnswerValue::Index(2)).check_answer_key().is_ok());
        assert!(mc(AnswerValue::Text("1".into())).check_answer_key().is_ok());
        assert!(mc(AnswerValue::Index(3)).check_answer_key().is_err());
        assert!(mc(AnswerValue::Index(-1)).check_answer_key().is_err());
    }

    #[test]
    fn test_option_limit_counts_characters() {
        let mut q = mc(AnswerValue::Index(0));
        q.options[0] = "é".repeat(500);
        assert!(q.check_answer_key().is_ok());
        q.options[0] = "é".repeat(501);
        assert!(q.check_answer_key().is_err());
    }

    #[test]
    fn test_true_false_key() {
        let mut q = mc(AnswerValue::Text("TRUE".into()));
        q.question_type = QuestionType::TrueFalse;
        q.options.clear();
        assert!(q.check_answer_key().is_ok());
        q.correct_answer = AnswerValue::Text("yes".into());
        assert!(q.check_answer_key().is_err());
    }

    #[test]
    fn test_public_question_has_no_answer_key() {
        let q = mc(AnswerValue::Index(0));
        let json = serde_json::to_value(PublicQuestion::from_question(4, &q)).unwrap();
        assert!(json.get("correct_answer").is_none());
        assert!(json.get("explanation").is_none());
        assert_eq!(json["index"], 4);
        assert_eq!(json["type"], "multiple_choice");
    }
}
