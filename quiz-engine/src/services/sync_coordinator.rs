use futures::future::join_all;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

use crate::error::StoreError;
use crate::models::cache::{CacheEntry, CachePayload};
use crate::models::progress::{ProgressEntry, ScoreComparison};
use crate::models::review::ReviewEntry;
use crate::models::{QuizSummary, SessionResult};
use crate::services::achievement_rules;
use crate::services::fallback_cache::FallbackCache;
use crate::services::record_store::RecordStore;
use crate::utils::retry::{retry_if, RetryConfig};
use crate::utils::time::minutes_spent_ceil;

/// How many correctly answered questions are sampled into the review log
/// per session, on top of every miss.
pub const CORRECT_REVIEW_SAMPLE: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteOutcome {
    Remote,
    Cached,
}

/// What happened to each category of write. `fully_synced` distinguishes
/// "everything reached the server" from "some data is only local"; the
/// report never carries an error - partial failure is expected, not
/// exceptional.
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub quiz_completed_remotely: bool,
    pub progress_remote: u32,
    pub progress_cached: u32,
    pub reviews_remote: u32,
    pub reviews_cached: u32,
    pub achievements_remote: u32,
    pub achievements_cached: u32,
    pub summary_cached: bool,
}

impl SyncReport {
    pub fn fully_synced(&self) -> bool {
        self.quiz_completed_remotely
            && self.progress_cached == 0
            && self.reviews_cached == 0
            && self.achievements_cached == 0
    }

    pub fn cached_total(&self) -> u32 {
        self.progress_cached + self.reviews_cached + self.achievements_cached
    }
}

// Cosmetic tallying progress: bumps toward 100 as writes settle. Must not
// gate correctness, so send errors are ignored.
struct ProgressTicker {
    settled: AtomicUsize,
    total: usize,
    feed: Option<watch::Sender<u8>>,
}

impl ProgressTicker {
    fn new(total: usize, feed: Option<watch::Sender<u8>>) -> Self {
        Self {
            settled: AtomicUsize::new(0),
            total,
            feed,
        }
    }

    fn tick(&self) {
        let done = self.settled.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(feed) = &self.feed {
            let pct = (done * 100 / self.total.max(1)).min(100) as u8;
            feed.send_replace(pct);
        }
    }
}

/// Fans a finalized `SessionResult` out to the record store: one quiz
/// completion, one progress write per answered question, one review per
/// review entry, one unlock per achievement, all dispatched concurrently.
/// A transient failure is retried once; a write that still cannot reach
/// the store is downgraded to the local fallback cache instead of dropped.
/// `sync` returns only after every write has settled and never errors.
pub struct SyncCoordinator {
    store: Arc<dyn RecordStore>,
    cache: Arc<dyn FallbackCache>,
    retry: RetryConfig,
}

impl SyncCoordinator {
    pub fn new(store: Arc<dyn RecordStore>, cache: Arc<dyn FallbackCache>) -> Self {
        Self {
            store,
            cache,
            retry: RetryConfig::default(),
        }
    }

    pub async fn sync(
        &self,
        result: &SessionResult,
        progress_feed: Option<watch::Sender<u8>>,
    ) -> SyncReport {
        let progress_entries = derive_progress(result);
        let review_entries = derive_reviews(result);
        let achievements = achievement_rules::evaluate(result);

        let mut report = SyncReport::default();

        // Audit trail first: the summary is durable locally whatever the
        // remote store does.
        let summary = CacheEntry::new(
            &result.user_id,
            CachePayload::QuizSummary(QuizSummary::from(result)),
        );
        match self.cache.append(summary).await {
            Ok(()) => report.summary_cached = true,
            Err(err) => tracing::error!("Quiz summary cache write failed: {}", err),
        }

        let total_writes = 1 + progress_entries.len() + review_entries.len() + achievements.len();
        let ticker = ProgressTicker::new(total_writes, progress_feed);
        let user_id = result.user_id.as_str();

        let quiz_fut = self.settle(
            || {
                self.store
                    .complete_quiz(user_id, &result.deck_id, result.score)
            },
            None,
            user_id,
            &ticker,
        );

        let progress_futs = join_all(progress_entries.iter().map(|entry| {
            self.settle(
                move || self.store.create_progress(entry),
                Some(CachePayload::Progress(entry.clone())),
                user_id,
                &ticker,
            )
        }));

        let review_futs = join_all(review_entries.iter().map(|entry| {
            self.settle(
                move || self.store.create_review(entry),
                Some(CachePayload::Review(entry.clone())),
                user_id,
                &ticker,
            )
        }));

        let achievement_futs = join_all(achievements.iter().map(|request| {
            self.settle(
                move || self.store.unlock_achievement(request),
                Some(CachePayload::Achievement(request.clone())),
                user_id,
                &ticker,
            )
        }));

        // Best effort: failure is logged, never retried, never cached.
        let study_minutes = minutes_spent_ceil(result.time_spent_seconds);
        let study_fut = async {
            if let Err(err) = self.store.track_study_time(user_id, study_minutes).await {
                tracing::warn!("Study time write failed (best effort): {}", err);
            }
        };

        let (quiz_outcome, progress_outcomes, review_outcomes, achievement_outcomes, ()) = tokio::join!(
            quiz_fut,
            progress_futs,
            review_futs,
            achievement_futs,
            study_fut
        );

        report.quiz_completed_remotely = quiz_outcome == WriteOutcome::Remote;
        (report.progress_remote, report.progress_cached) = count_outcomes(&progress_outcomes);
        (report.reviews_remote, report.reviews_cached) = count_outcomes(&review_outcomes);
        (report.achievements_remote, report.achievements_cached) =
            count_outcomes(&achievement_outcomes);

        tracing::info!(
            "Session sync settled for user {}: {} writes, {} downgraded to cache",
            user_id,
            total_writes,
            report.cached_total() + u32::from(!report.quiz_completed_remotely)
        );

        report
    }

    // The single place the retry-once-then-fallback policy lives. Every
    // write settles: remote success, or a fallback-cache entry, or (for
    // the quiz completion, whose audit record is the always-written
    // summary) a log line. Nothing propagates.
    async fn settle<F, Fut>(
        &self,
        op: F,
        fallback: Option<CachePayload>,
        user_id: &str,
        ticker: &ProgressTicker,
    ) -> WriteOutcome
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<(), StoreError>>,
    {
        let outcome = match retry_if(&self.retry, op, StoreError::is_transient).await {
            Ok(()) => WriteOutcome::Remote,
            Err(err) => {
                match fallback {
                    Some(payload) => self.downgrade(user_id, payload, &err).await,
                    None => tracing::warn!(
                        "Quiz completion write failed, local summary stands in: {}",
                        err
                    ),
                }
                WriteOutcome::Cached
            }
        };
        ticker.tick();
        outcome
    }

    async fn downgrade(&self, user_id: &str, payload: CachePayload, err: &StoreError) {
        tracing::warn!(
            "Remote {} write failed, falling back to local cache: {}",
            payload.kind().as_str(),
            err
        );
        let entry = CacheEntry::new(user_id, payload);
        if let Err(cache_err) = self.cache.append(entry).await {
            // Losing the fallback must not interrupt the session flow.
            tracing::error!("Fallback cache write failed, entry dropped: {}", cache_err);
        }
    }
}

fn count_outcomes(outcomes: &[WriteOutcome]) -> (u32, u32) {
    let remote = outcomes
        .iter()
        .filter(|o| **o == WriteOutcome::Remote)
        .count() as u32;
    (remote, outcomes.len() as u32 - remote)
}

// Progress is issued per answered question only; per-question time is the
// session total spread evenly across all questions.
fn derive_progress(result: &SessionResult) -> Vec<ProgressEntry> {
    let per_question_seconds = if result.total_questions == 0 {
        0
    } else {
        (result.time_spent_seconds as f64 / result.total_questions as f64).round() as u64
    };

    result
        .per_question
        .iter()
        .filter(|q| q.answered())
        .map(|q| {
            let score = if q.correct { 100 } else { 0 };
            ProgressEntry {
                flashcard_id: q.flashcard_id.clone(),
                score,
                time_spent_seconds: per_question_seconds,
                score_comparison: ScoreComparison::from_score(score),
            }
        })
        .collect()
}

// Every miss is reviewed (the submitted answer rides along, empty when the
// question was skipped), plus a capped sample of correct answers.
fn derive_reviews(result: &SessionResult) -> Vec<ReviewEntry> {
    let misses = result.per_question.iter().filter(|q| !q.correct).map(|q| {
        ReviewEntry {
            flashcard_id: q.flashcard_id.clone(),
            correct_answer: q.expected_answer.clone(),
            incorrect_answer: Some(q.submitted_answer.clone()),
        }
    });

    let correct_sample = result
        .per_question
        .iter()
        .filter(|q| q.correct)
        .take(CORRECT_REVIEW_SAMPLE)
        .map(|q| ReviewEntry {
            flashcard_id: q.flashcard_id.clone(),
            correct_answer: q.expected_answer.clone(),
            incorrect_answer: None,
        });

    misses.chain(correct_sample).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PerQuestionResult, QuestionKind};
    use chrono::Utc;

    fn verdict(id: &str, submitted: &str, correct: bool) -> PerQuestionResult {
        PerQuestionResult {
            flashcard_id: id.to_string(),
            prompt: format!("prompt {}", id),
            expected_answer: format!("answer {}", id),
            submitted_answer: submitted.to_string(),
            kind: QuestionKind::Identification,
            correct,
        }
    }

    fn result_with(per_question: Vec<PerQuestionResult>) -> SessionResult {
        let correct_count = per_question.iter().filter(|q| q.correct).count() as u32;
        let total = per_question.len() as u32;
        SessionResult {
            deck_id: "deck-1".to_string(),
            deck_title: "Capitals".to_string(),
            user_id: "user-1".to_string(),
            total_questions: total,
            correct_count,
            incorrect_count: total - correct_count,
            score: 50,
            time_spent_seconds: 40,
            completed_at: Utc::now(),
            per_question,
        }
    }

    #[test]
    fn unanswered_questions_produce_no_progress() {
        let result = result_with(vec![
            verdict("q1", "right", true),
            verdict("q2", "", false),
            verdict("q3", "wrong", false),
        ]);

        let progress = derive_progress(&result);
        let ids: Vec<_> = progress.iter().map(|p| p.flashcard_id.as_str()).collect();
        assert_eq!(ids, vec!["q1", "q3"]);
        assert_eq!(progress[0].score, 100);
        assert_eq!(progress[1].score, 0);
    }

    #[test]
    fn per_question_time_is_spread_evenly() {
        let result = result_with(vec![
            verdict("q1", "right", true),
            verdict("q2", "right", true),
            verdict("q3", "right", true),
        ]);
        // 40s over 3 questions rounds to 13.
        assert!(derive_progress(&result)
            .iter()
            .all(|p| p.time_spent_seconds == 13));
    }

    #[test]
    fn reviews_cover_every_miss_and_sample_two_correct() {
        let result = result_with(vec![
            verdict("q1", "right", true),
            verdict("q2", "right", true),
            verdict("q3", "right", true),
            verdict("q4", "wrong", false),
            verdict("q5", "", false),
        ]);

        let reviews = derive_reviews(&result);
        assert_eq!(reviews.len(), 4);

        let misses: Vec<_> = reviews
            .iter()
            .filter(|r| r.incorrect_answer.is_some())
            .collect();
        assert_eq!(misses.len(), 2);
        // The skipped question carries an empty submitted answer.
        let skipped = misses.iter().find(|r| r.flashcard_id == "q5").unwrap();
        assert_eq!(skipped.incorrect_answer.as_deref(), Some(""));

        let sampled: Vec<_> = reviews
            .iter()
            .filter(|r| r.incorrect_answer.is_none())
            .map(|r| r.flashcard_id.as_str())
            .collect();
        assert_eq!(sampled, vec!["q1", "q2"]);
    }
}
