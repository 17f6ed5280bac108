use reqwest::StatusCode;
use thiserror::Error;

/// Errors surfaced to the caller of the quiz engine.
///
/// Session-start failures (empty deck, unreachable store) are fatal to the
/// session and must reach the user before any timer runs. Write failures
/// during sync never appear here: the coordinator downgrades them to the
/// fallback cache instead.
#[derive(Debug, Error)]
pub enum QuizError {
    #[error("deck {deck_id} has no flashcards to quiz on")]
    EmptyDeck { deck_id: String },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("quiz session is no longer in progress")]
    SessionNotActive,

    #[error("quiz session has no finalized result awaiting sync")]
    NothingToSync,
}

/// Failures talking to the remote record store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record store request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("record store returned {0}")]
    Status(StatusCode),

    #[error("{0} not found in record store")]
    NotFound(String),
}

impl StoreError {
    /// Network-class and 5xx failures are worth one retry; everything else
    /// is treated as permanent and falls back to the local cache directly.
    pub fn is_transient(&self) -> bool {
        match self {
            StoreError::Network(_) => true,
            StoreError::Status(status) => status.is_server_error(),
            StoreError::NotFound(_) => false,
        }
    }
}

/// Failures of the local fallback cache. Losing a fallback entry is worse
/// than losing nothing, so these are logged and swallowed by the sync
/// coordinator rather than propagated.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("fallback cache io failed for {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("fallback cache entry is not valid JSON")]
    Serde(#[from] serde_json::Error),
}
