use serde::{Deserialize, Serialize};

/// A question/answer pair kept for later study. Emitted for every missed
/// question (the submitted answer rides along, empty when the question was
/// never answered) and for a small sample of correct ones
/// (`incorrect_answer` is `None` for those).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewEntry {
    pub flashcard_id: String,
    pub correct_answer: String,
    pub incorrect_answer: Option<String>,
}
