use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;

use crate::config::Config;
use crate::error::StoreError;
use crate::models::achievement::AchievementUnlockRequest;
use crate::models::progress::ProgressEntry;
use crate::models::review::ReviewEntry;
use crate::models::{Deck, Flashcard};

/// The remote record store the engine consumes. Write operations must be
/// safely repeatable on the server side; the sync coordinator may retry a
/// transient failure once.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get_deck(&self, deck_id: &str) -> Result<Deck, StoreError>;
    async fn get_flashcards(&self, deck_id: &str) -> Result<Vec<Flashcard>, StoreError>;
    async fn complete_quiz(&self, user_id: &str, deck_id: &str, score: u8)
        -> Result<(), StoreError>;
    async fn create_progress(&self, entry: &ProgressEntry) -> Result<(), StoreError>;
    async fn create_review(&self, entry: &ReviewEntry) -> Result<(), StoreError>;
    async fn unlock_achievement(
        &self,
        request: &AchievementUnlockRequest,
    ) -> Result<(), StoreError>;
    async fn track_study_time(&self, user_id: &str, minutes: u64) -> Result<(), StoreError>;
}

// The store's wire names predate this client: a deck's title travels as
// "subject" and a flashcard's term/definition as "question"/"answer".
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeckPayload {
    id: String,
    subject: String,
    category: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FlashcardPayload {
    id: String,
    question: String,
    answer: String,
}

pub struct HttpRecordStore {
    http_client: Client,
    base_url: String,
}

impl HttpRecordStore {
    pub fn new(config: &Config) -> Result<Self, StoreError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            http_client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn check_status(response: &Response, what: &str) -> Result<(), StoreError> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else if status == StatusCode::NOT_FOUND {
            Err(StoreError::NotFound(what.to_string()))
        } else {
            Err(StoreError::Status(status))
        }
    }
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    async fn get_deck(&self, deck_id: &str) -> Result<Deck, StoreError> {
        let url = format!("{}/decks/{}", self.base_url, deck_id);
        let response = self.http_client.get(&url).send().await?;
        Self::check_status(&response, &format!("deck {}", deck_id))?;

        let payload: DeckPayload = response.json().await?;
        Ok(Deck {
            id: payload.id,
            title: payload.subject,
            category: payload.category,
        })
    }

    async fn get_flashcards(&self, deck_id: &str) -> Result<Vec<Flashcard>, StoreError> {
        let url = format!("{}/flashcards/getByDeckId/{}", self.base_url, deck_id);
        let response = self.http_client.get(&url).send().await?;
        Self::check_status(&response, &format!("flashcards for deck {}", deck_id))?;

        let payload: Vec<FlashcardPayload> = response.json().await?;
        Ok(payload
            .into_iter()
            .map(|card| Flashcard {
                id: card.id,
                term: card.question,
                definition: card.answer,
            })
            .collect())
    }

    async fn complete_quiz(
        &self,
        user_id: &str,
        deck_id: &str,
        score: u8,
    ) -> Result<(), StoreError> {
        // The completion endpoint names the deck parameter "quizId".
        let url = format!("{}/quiz/complete", self.base_url);
        let response = self
            .http_client
            .post(&url)
            .query(&[
                ("userId", user_id),
                ("quizId", deck_id),
                ("score", &score.to_string()),
            ])
            .send()
            .await?;
        Self::check_status(&response, "quiz completion")
    }

    async fn create_progress(&self, entry: &ProgressEntry) -> Result<(), StoreError> {
        let url = format!("{}/progress/add", self.base_url);
        let response = self.http_client.post(&url).json(entry).send().await?;
        Self::check_status(&response, &format!("progress for {}", entry.flashcard_id))
    }

    async fn create_review(&self, entry: &ReviewEntry) -> Result<(), StoreError> {
        let url = format!("{}/review/add", self.base_url);
        let response = self.http_client.post(&url).json(entry).send().await?;
        Self::check_status(&response, &format!("review for {}", entry.flashcard_id))
    }

    async fn unlock_achievement(
        &self,
        request: &AchievementUnlockRequest,
    ) -> Result<(), StoreError> {
        let url = format!("{}/achievements/unlock", self.base_url);
        let response = self
            .http_client
            .post(&url)
            .query(&[
                ("userId", request.user_id.as_str()),
                ("title", request.title.as_str()),
                ("description", request.description.as_str()),
            ])
            .send()
            .await?;
        Self::check_status(&response, &format!("achievement {}", request.title))
    }

    async fn track_study_time(&self, user_id: &str, minutes: u64) -> Result<(), StoreError> {
        let url = format!("{}/progress/trackStudyTime", self.base_url);
        let response = self
            .http_client
            .post(&url)
            .query(&[("userId", user_id), ("minutesSpent", &minutes.to_string())])
            .send()
            .await?;
        Self::check_status(&response, "study time")
    }
}
