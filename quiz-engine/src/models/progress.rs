use serde::{Deserialize, Serialize};

/// Per-flashcard progress produced for every answered question of a
/// finished session. Unanswered questions never produce one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEntry {
    pub flashcard_id: String,
    /// 0 or 100 for a single question.
    pub score: u8,
    pub time_spent_seconds: u64,
    pub score_comparison: ScoreComparison,
}

/// Qualitative bucket derived from a numeric score; stored as the enum,
/// never as free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScoreComparison {
    Excellent,
    Good,
    Fair,
    NeedsImprovement,
}

impl ScoreComparison {
    pub fn from_score(score: u8) -> Self {
        if score >= 90 {
            ScoreComparison::Excellent
        } else if score >= 75 {
            ScoreComparison::Good
        } else if score >= 60 {
            ScoreComparison::Fair
        } else {
            ScoreComparison::NeedsImprovement
        }
    }
}
