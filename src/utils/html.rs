use ammonia;

use crate::models::question::Question;

/// Clean teacher-authored HTML using the ammonia library.
///
/// Whitelist-based: safe formatting tags (<b>, <p>, <code>) survive, while
/// <script>, <iframe> and event-handler attributes are stripped. Quiz text is
/// rendered to every taker who opens the link, so it is cleaned once on write.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}

/// Cleans the displayable parts of a question.
/// The answer key is left verbatim; grading compares against it.
pub fn clean_question(mut question: Question) -> Question {
    question.text = clean_html(&question.text);
    question.options = question.options.iter().map(|o| clean_html(o)).collect();
    question.explanation = question.explanation.as_deref().map(clean_html);
    question
}
