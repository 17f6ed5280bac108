use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::achievement::AchievementUnlockRequest;
use super::progress::ProgressEntry;
use super::review::ReviewEntry;
use super::QuizSummary;

/// The entity kinds the fallback cache partitions by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    Progress,
    Review,
    Achievement,
    QuizSummary,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Progress => "progress",
            EntityKind::Review => "review",
            EntityKind::Achievement => "achievement",
            EntityKind::QuizSummary => "quizSummary",
        }
    }

    /// Per-kind bound on the local list; inserting beyond it evicts the
    /// oldest entry.
    pub fn storage_cap(&self) -> usize {
        match self {
            EntityKind::Progress => 100,
            EntityKind::Review => 50,
            EntityKind::Achievement => 100,
            EntityKind::QuizSummary => 50,
        }
    }
}

/// One locally cached record, written only when the corresponding remote
/// write failed (quiz summaries are the exception: always written).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub payload: CachePayload,
}

impl CacheEntry {
    pub fn new(user_id: &str, payload: CachePayload) -> Self {
        Self {
            user_id: user_id.to_string(),
            created_at: Utc::now(),
            payload,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.payload.kind()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CachePayload {
    Progress(ProgressEntry),
    Review(ReviewEntry),
    Achievement(AchievementUnlockRequest),
    QuizSummary(QuizSummary),
}

impl CachePayload {
    pub fn kind(&self) -> EntityKind {
        match self {
            CachePayload::Progress(_) => EntityKind::Progress,
            CachePayload::Review(_) => EntityKind::Review,
            CachePayload::Achievement(_) => EntityKind::Achievement,
            CachePayload::QuizSummary(_) => EntityKind::QuizSummary,
        }
    }
}
