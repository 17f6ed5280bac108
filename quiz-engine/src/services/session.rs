use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::error::QuizError;
use crate::models::{AnswerRecord, Deck, Question, SessionResult};
use crate::services::question_generator;
use crate::services::record_store::RecordStore;
use crate::services::scorer;
use crate::services::sync_coordinator::{SyncCoordinator, SyncReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    InProgress,
    Tallying,
    Complete,
    Abandoned,
}

/// Outcome of advancing past the current question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Moved(usize),
    Finished,
}

/// One attempt at a quiz, from generated questions to a frozen result.
///
/// The loading phase is the async constructor: deck and flashcards are
/// fetched, questions generated, and the one-second timer started only
/// once that all succeeded. The timer is a spawned task owned by the
/// session and aborted on every exit from `InProgress` (tallying,
/// abandonment, or drop), so no recurring work outlives the session.
#[derive(Debug)]
pub struct QuizSession {
    session_id: String,
    user_id: String,
    deck: Deck,
    questions: Vec<Question>,
    answers: AnswerRecord,
    current_index: usize,
    phase: SessionPhase,
    elapsed: Arc<AtomicU64>,
    timer: Option<JoinHandle<()>>,
    result: Option<SessionResult>,
    report: Option<SyncReport>,
    progress_tx: watch::Sender<u8>,
}

impl QuizSession {
    pub async fn start(
        store: &dyn RecordStore,
        user_id: &str,
        deck_id: &str,
    ) -> Result<Self, QuizError> {
        let deck = store.get_deck(deck_id).await?;
        let flashcards = store.get_flashcards(deck_id).await?;

        // An empty deck fails here, before any timer exists.
        let questions = question_generator::generate(deck_id, &flashcards)?;

        let session_id = Uuid::new_v4().to_string();
        tracing::info!(
            "Quiz session {} started: user={}, deck={}, questions={}",
            session_id,
            user_id,
            deck_id,
            questions.len()
        );

        let elapsed = Arc::new(AtomicU64::new(0));
        let timer = spawn_timer(elapsed.clone());
        let (progress_tx, _) = watch::channel(0u8);

        Ok(Self {
            session_id,
            user_id: user_id.to_string(),
            deck,
            questions,
            answers: AnswerRecord::new(),
            current_index: 0,
            phase: SessionPhase::InProgress,
            elapsed,
            timer: Some(timer),
            result: None,
            report: None,
            progress_tx,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> &Question {
        &self.questions[self.current_index]
    }

    /// The answer previously recorded for the current question, if any.
    pub fn submitted_answer(&self) -> Option<&str> {
        self.answers.get(self.current_question().id())
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed.load(Ordering::Relaxed)
    }

    /// Record (or overwrite) the answer for the current question. An empty
    /// answer clears the entry, leaving the question unanswered.
    pub fn record_answer(&mut self, answer: &str) -> Result<(), QuizError> {
        self.ensure_in_progress()?;
        let question_id = self.current_question().id().to_string();
        self.answers.record(&question_id, answer);
        Ok(())
    }

    /// Step back one question, bounded at the first.
    pub fn previous(&mut self) -> Result<usize, QuizError> {
        self.ensure_in_progress()?;
        self.current_index = self.current_index.saturating_sub(1);
        Ok(self.current_index)
    }

    /// Step forward one question; moving past the last one stops the
    /// timer, runs the scorer, and freezes the `SessionResult`.
    pub fn next(&mut self) -> Result<Step, QuizError> {
        self.ensure_in_progress()?;
        if self.current_index + 1 < self.questions.len() {
            self.current_index += 1;
            Ok(Step::Moved(self.current_index))
        } else {
            self.enter_tallying();
            Ok(Step::Finished)
        }
    }

    /// User-initiated exit: stop the timer and discard all mutable state
    /// without writing anything anywhere.
    pub fn abandon(&mut self) -> Result<(), QuizError> {
        self.ensure_in_progress()?;
        self.stop_timer();
        self.answers = AnswerRecord::new();
        self.phase = SessionPhase::Abandoned;
        tracing::info!("Quiz session {} abandoned", self.session_id);
        Ok(())
    }

    /// Persist the frozen result through the sync coordinator and move to
    /// the terminal `Complete` phase. Returns once every write has
    /// settled remotely or in the fallback cache; the result itself is
    /// available and displayable regardless of how the writes went.
    pub async fn complete(
        &mut self,
        coordinator: &SyncCoordinator,
    ) -> Result<&SessionResult, QuizError> {
        if self.phase != SessionPhase::Tallying {
            return Err(QuizError::NothingToSync);
        }

        let report = {
            let result = self.result.as_ref().ok_or(QuizError::NothingToSync)?;
            coordinator
                .sync(result, Some(self.progress_tx.clone()))
                .await
        };

        self.report = Some(report);
        self.phase = SessionPhase::Complete;
        tracing::info!("Quiz session {} complete", self.session_id);

        self.result.as_ref().ok_or(QuizError::NothingToSync)
    }

    /// The frozen result, available from tallying onward.
    pub fn result(&self) -> Option<&SessionResult> {
        self.result.as_ref()
    }

    /// What happened to the completion writes, available once complete.
    pub fn sync_report(&self) -> Option<&SyncReport> {
        self.report.as_ref()
    }

    /// Cosmetic 0-100 feed that rises as completion writes settle.
    pub fn progress_feed(&self) -> watch::Receiver<u8> {
        self.progress_tx.subscribe()
    }

    fn ensure_in_progress(&self) -> Result<(), QuizError> {
        if self.phase == SessionPhase::InProgress {
            Ok(())
        } else {
            Err(QuizError::SessionNotActive)
        }
    }

    fn enter_tallying(&mut self) {
        self.stop_timer();
        let time_spent_seconds = self.elapsed_seconds();

        let tally = scorer::tally(&self.questions, &self.answers);
        let total_questions = self.questions.len() as u32;

        self.result = Some(SessionResult {
            deck_id: self.deck.id.clone(),
            deck_title: self.deck.title.clone(),
            user_id: self.user_id.clone(),
            total_questions,
            correct_count: tally.correct_count,
            incorrect_count: tally.incorrect_count,
            score: scorer::aggregate_score(tally.correct_count, total_questions),
            time_spent_seconds,
            completed_at: Utc::now(),
            per_question: tally.verdicts,
        });
        self.phase = SessionPhase::Tallying;

        tracing::info!(
            "Quiz session {} tallying: {}/{} correct in {}s",
            self.session_id,
            tally.correct_count,
            total_questions,
            time_spent_seconds
        );
    }

    fn stop_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl Drop for QuizSession {
    fn drop(&mut self) {
        // Navigating away without finishing must not leave the ticker
        // running.
        self.stop_timer();
    }
}

fn spawn_timer(elapsed: Arc<AtomicU64>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(1));
        // The first tick completes immediately; consume it so counting
        // starts from zero.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            elapsed.fetch_add(1, Ordering::Relaxed);
        }
    })
}
