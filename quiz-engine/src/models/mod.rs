use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub mod achievement;
pub mod cache;
pub mod progress;
pub mod review;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deck {
    pub id: String,
    pub title: String,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    pub id: String,
    pub term: String,
    pub definition: String,
}

/// A question generated for one session. Only `Identification` is produced
/// today; the other variants exist so the scorer's handling of every kind
/// is checked at compile time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Question {
    #[serde(rename_all = "camelCase")]
    Identification {
        id: String,
        prompt: String,
        expected_answer: String,
    },
    #[serde(rename_all = "camelCase")]
    TrueFalse {
        id: String,
        prompt: String,
        expected_answer: bool,
    },
    #[serde(rename_all = "camelCase")]
    MultipleChoice {
        id: String,
        prompt: String,
        options: Vec<String>,
        expected_answer: String,
    },
}

impl Question {
    pub fn id(&self) -> &str {
        match self {
            Question::Identification { id, .. } => id,
            Question::TrueFalse { id, .. } => id,
            Question::MultipleChoice { id, .. } => id,
        }
    }

    pub fn prompt(&self) -> &str {
        match self {
            Question::Identification { prompt, .. } => prompt,
            Question::TrueFalse { prompt, .. } => prompt,
            Question::MultipleChoice { prompt, .. } => prompt,
        }
    }

    pub fn expected_answer_text(&self) -> String {
        match self {
            Question::Identification {
                expected_answer, ..
            } => expected_answer.clone(),
            Question::TrueFalse {
                expected_answer, ..
            } => expected_answer.to_string(),
            Question::MultipleChoice {
                expected_answer, ..
            } => expected_answer.clone(),
        }
    }

    pub fn kind(&self) -> QuestionKind {
        match self {
            Question::Identification { .. } => QuestionKind::Identification,
            Question::TrueFalse { .. } => QuestionKind::TrueFalse,
            Question::MultipleChoice { .. } => QuestionKind::MultipleChoice,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuestionKind {
    Identification,
    TrueFalse,
    MultipleChoice,
}

/// Submitted answers keyed by question id. Grows while the session runs;
/// never holds an entry for an unanswered question, so recording an empty
/// string clears any previous answer.
#[derive(Debug, Clone, Default)]
pub struct AnswerRecord {
    answers: HashMap<String, String>,
}

impl AnswerRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, question_id: &str, answer: &str) {
        if answer.is_empty() {
            self.answers.remove(question_id);
        } else {
            self.answers
                .insert(question_id.to_string(), answer.to_string());
        }
    }

    pub fn get(&self, question_id: &str) -> Option<&str> {
        self.answers.get(question_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }
}

/// The frozen outcome of one quiz session. Created exactly once when the
/// session enters tallying; every downstream write (progress, reviews,
/// achievements, summary) is derived from this value, never from live
/// session state, so a retried write can never observe drifted counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResult {
    pub deck_id: String,
    pub deck_title: String,
    pub user_id: String,
    pub total_questions: u32,
    pub correct_count: u32,
    pub incorrect_count: u32,
    pub score: u8,
    pub time_spent_seconds: u64,
    pub completed_at: DateTime<Utc>,
    pub per_question: Vec<PerQuestionResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerQuestionResult {
    pub flashcard_id: String,
    pub prompt: String,
    pub expected_answer: String,
    /// Empty when the question was never answered.
    pub submitted_answer: String,
    pub kind: QuestionKind,
    pub correct: bool,
}

impl PerQuestionResult {
    pub fn answered(&self) -> bool {
        !self.submitted_answer.is_empty()
    }
}

/// Coarse audit record always written to the local fallback cache at
/// session completion, readable without a network round trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSummary {
    pub deck_id: String,
    pub deck_title: String,
    pub score: u8,
    pub correct_count: u32,
    pub total_questions: u32,
    pub time_spent_seconds: u64,
}

impl From<&SessionResult> for QuizSummary {
    fn from(result: &SessionResult) -> Self {
        Self {
            deck_id: result.deck_id.clone(),
            deck_title: result.deck_title.clone(),
            score: result.score,
            correct_count: result.correct_count,
            total_questions: result.total_questions,
            time_spent_seconds: result.time_spent_seconds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_record_drops_cleared_answers() {
        let mut answers = AnswerRecord::new();
        answers.record("q1", "Paris");
        assert_eq!(answers.get("q1"), Some("Paris"));

        answers.record("q1", "");
        assert_eq!(answers.get("q1"), None);
        assert!(answers.is_empty());
    }

    #[test]
    fn answer_record_overwrites() {
        let mut answers = AnswerRecord::new();
        answers.record("q1", "first");
        answers.record("q1", "second");
        assert_eq!(answers.get("q1"), Some("second"));
        assert_eq!(answers.len(), 1);
    }

    #[test]
    fn question_serializes_with_kind_tag() {
        let question = Question::Identification {
            id: "card-1".to_string(),
            prompt: "Capital of France".to_string(),
            expected_answer: "Paris".to_string(),
        };
        let json = serde_json::to_value(&question).unwrap();
        assert_eq!(json["kind"], "identification");
        assert_eq!(json["expectedAnswer"], "Paris");
    }
}
