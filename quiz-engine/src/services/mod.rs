use std::sync::Arc;

use crate::config::Config;
use crate::error::QuizError;
use crate::services::fallback_cache::{FallbackCache, JsonFileCache};
use crate::services::record_store::{HttpRecordStore, RecordStore};
use crate::services::session::QuizSession;
use crate::services::sync_coordinator::SyncCoordinator;

pub mod achievement_rules;
pub mod fallback_cache;
pub mod question_generator;
pub mod record_store;
pub mod scorer;
pub mod session;
pub mod sync_coordinator;

/// Entry point wiring the engine's collaborators together: the remote
/// record store and the local fallback cache. Presentation code holds one
/// of these and starts a fresh `QuizSession` per attempt.
pub struct QuizEngine {
    pub config: Config,
    store: Arc<dyn RecordStore>,
    cache: Arc<dyn FallbackCache>,
}

impl QuizEngine {
    pub fn new(config: Config) -> Result<Self, QuizError> {
        let store = Arc::new(HttpRecordStore::new(&config)?);
        let cache = Arc::new(JsonFileCache::new(config.cache_dir.clone()));
        Ok(Self::with_parts(config, store, cache))
    }

    /// Build the engine from explicit collaborators; tests substitute an
    /// in-memory store and cache here.
    pub fn with_parts(
        config: Config,
        store: Arc<dyn RecordStore>,
        cache: Arc<dyn FallbackCache>,
    ) -> Self {
        Self {
            config,
            store,
            cache,
        }
    }

    pub async fn start_session(
        &self,
        user_id: &str,
        deck_id: &str,
    ) -> Result<QuizSession, QuizError> {
        QuizSession::start(self.store.as_ref(), user_id, deck_id).await
    }

    pub fn sync_coordinator(&self) -> SyncCoordinator {
        SyncCoordinator::new(self.store.clone(), self.cache.clone())
    }

    /// Read side of the fallback cache, for screens that display cached
    /// progress or achievements when the remote store is unreachable.
    pub fn fallback_cache(&self) -> Arc<dyn FallbackCache> {
        self.cache.clone()
    }
}
