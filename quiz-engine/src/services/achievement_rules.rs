use crate::models::achievement::AchievementUnlockRequest;
use crate::models::SessionResult;

pub const SPEED_LEARNER_MAX_SECONDS: u64 = 120;
pub const SPEED_LEARNER_MIN_QUESTIONS: u32 = 5;

/// Evaluate the fixed achievement rule set against a finished session.
/// Rules are independent; several can fire at once. "Quiz Taker" is
/// requested on every completion - the store's uniqueness rule decides
/// whether it is actually a first.
pub fn evaluate(result: &SessionResult) -> Vec<AchievementUnlockRequest> {
    let user_id = &result.user_id;
    let mut unlocks = vec![AchievementUnlockRequest::new(
        user_id,
        "Quiz Taker",
        "Completed your first quiz",
    )];

    if result.score == 100 {
        unlocks.push(AchievementUnlockRequest::new(
            user_id,
            "Perfect Score",
            "Achieved a perfect score on a quiz",
        ));
    }

    if result.score >= 80 {
        unlocks.push(AchievementUnlockRequest::new(
            user_id,
            "High Achiever",
            "Scored 80% or higher on a quiz",
        ));
    }

    if result.time_spent_seconds < SPEED_LEARNER_MAX_SECONDS
        && result.total_questions >= SPEED_LEARNER_MIN_QUESTIONS
    {
        unlocks.push(AchievementUnlockRequest::new(
            user_id,
            "Speed Learner",
            "Completed a quiz in record time",
        ));
    }

    unlocks
}
