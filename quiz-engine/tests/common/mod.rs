#![allow(dead_code)]

use async_trait::async_trait;
use reqwest::StatusCode;
use std::collections::HashSet;
use std::sync::Mutex;

use quizwhiz_engine::error::StoreError;
use quizwhiz_engine::models::achievement::AchievementUnlockRequest;
use quizwhiz_engine::models::progress::ProgressEntry;
use quizwhiz_engine::models::review::ReviewEntry;
use quizwhiz_engine::models::{Deck, Flashcard};
use quizwhiz_engine::services::record_store::RecordStore;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

#[derive(Clone, Copy, Debug)]
pub enum MockFailure {
    Transient,
    Permanent,
}

impl MockFailure {
    fn to_error(self) -> StoreError {
        match self {
            MockFailure::Transient => StoreError::Status(StatusCode::SERVICE_UNAVAILABLE),
            MockFailure::Permanent => StoreError::Status(StatusCode::BAD_REQUEST),
        }
    }
}

#[derive(Default)]
struct MockState {
    fail_all_writes: Option<MockFailure>,
    fail_progress_for: HashSet<String>,
    fail_once: HashSet<&'static str>,
    calls: Vec<String>,
}

/// In-memory stand-in for the remote record store with programmable
/// failure modes and a call log, so tests can assert attempt counts and
/// fallback behavior without a network.
pub struct MockRecordStore {
    deck: Deck,
    flashcards: Vec<Flashcard>,
    state: Mutex<MockState>,
}

impl MockRecordStore {
    pub fn with_cards(count: usize) -> Self {
        let flashcards = (0..count)
            .map(|i| Flashcard {
                id: format!("card-{}", i),
                term: format!("term {}", i),
                definition: format!("definition {}", i),
            })
            .collect();

        Self {
            deck: Deck {
                id: "deck-1".to_string(),
                title: "Test Deck".to_string(),
                category: None,
            },
            flashcards,
            state: Mutex::new(MockState::default()),
        }
    }

    pub fn empty() -> Self {
        Self::with_cards(0)
    }

    /// Every subsequent write fails with the given class.
    pub fn fail_all_writes(&self, failure: MockFailure) {
        self.state.lock().unwrap().fail_all_writes = Some(failure);
    }

    /// Progress writes for this flashcard fail (transiently) every time,
    /// so the retry fails too.
    pub fn fail_progress_for(&self, flashcard_id: &str) {
        self.state
            .lock()
            .unwrap()
            .fail_progress_for
            .insert(flashcard_id.to_string());
    }

    /// The next call to this endpoint fails transiently; later calls
    /// succeed.
    pub fn fail_once(&self, endpoint: &'static str) {
        self.state.lock().unwrap().fail_once.insert(endpoint);
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self, prefix: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    fn write(&self, endpoint: &'static str, key: &str) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("{}:{}", endpoint, key));

        if state.fail_once.remove(endpoint) {
            return Err(MockFailure::Transient.to_error());
        }
        if endpoint == "progress" && state.fail_progress_for.contains(key) {
            return Err(MockFailure::Transient.to_error());
        }
        if let Some(failure) = state.fail_all_writes {
            return Err(failure.to_error());
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MockRecordStore {
    async fn get_deck(&self, _deck_id: &str) -> Result<Deck, StoreError> {
        Ok(self.deck.clone())
    }

    async fn get_flashcards(&self, _deck_id: &str) -> Result<Vec<Flashcard>, StoreError> {
        Ok(self.flashcards.clone())
    }

    async fn complete_quiz(
        &self,
        _user_id: &str,
        deck_id: &str,
        _score: u8,
    ) -> Result<(), StoreError> {
        self.write("quiz", deck_id)
    }

    async fn create_progress(&self, entry: &ProgressEntry) -> Result<(), StoreError> {
        self.write("progress", &entry.flashcard_id)
    }

    async fn create_review(&self, entry: &ReviewEntry) -> Result<(), StoreError> {
        self.write("review", &entry.flashcard_id)
    }

    async fn unlock_achievement(
        &self,
        request: &AchievementUnlockRequest,
    ) -> Result<(), StoreError> {
        self.write("achievement", &request.title)
    }

    async fn track_study_time(&self, _user_id: &str, minutes: u64) -> Result<(), StoreError> {
        self.write("studyTime", &minutes.to_string())
    }
}
