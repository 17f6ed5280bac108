use serde::{Deserialize, Serialize};

/// Request to unlock one achievement. Uniqueness is by `(user_id, title)`
/// and is enforced by the record store; re-unlocking is a no-op there, so
/// the engine requests unconditionally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementUnlockRequest {
    pub user_id: String,
    pub title: String,
    pub description: String,
}

impl AchievementUnlockRequest {
    pub fn new(user_id: &str, title: &str, description: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
        }
    }
}
