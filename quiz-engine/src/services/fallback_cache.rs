use async_trait::async_trait;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::CacheError;
use crate::models::cache::{CacheEntry, CachePayload, EntityKind};

/// Per-user durable store that absorbs writes the remote store rejected.
/// Injected into the sync coordinator - never reached through ambient
/// globals - so tests can substitute an in-memory implementation. The
/// write path belongs to the coordinator; display screens only read.
#[async_trait]
pub trait FallbackCache: Send + Sync {
    /// Prepend one entry to the `(user, kind)` list, evicting the oldest
    /// entry beyond the kind's cap.
    async fn append(&self, entry: CacheEntry) -> Result<(), CacheError>;

    /// Newest-first entries for one `(user, kind)` pair; empty when the
    /// key was never written.
    async fn entries(&self, user_id: &str, kind: EntityKind) -> Result<Vec<CacheEntry>, CacheError>;
}

/// Storage key schema shared by every implementation.
pub fn cache_key(kind: EntityKind, user_id: &str) -> String {
    format!("{}-{}", kind.as_str(), user_id)
}

// Achievements are unique by title within a user's list; appending an
// already-present title is a no-op rather than a duplicate.
fn is_duplicate_achievement(existing: &[CacheEntry], entry: &CacheEntry) -> bool {
    let CachePayload::Achievement(new) = &entry.payload else {
        return false;
    };
    existing.iter().any(|e| match &e.payload {
        CachePayload::Achievement(old) => old.title == new.title,
        _ => false,
    })
}

fn prepend_capped(mut list: Vec<CacheEntry>, entry: CacheEntry) -> Vec<CacheEntry> {
    let cap = entry.kind().storage_cap();
    list.insert(0, entry);
    list.truncate(cap);
    list
}

/// File-backed cache: one JSON document per `{kind}-{userId}` key under a
/// configured directory.
pub struct JsonFileCache {
    dir: PathBuf,
}

impl JsonFileCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, kind: EntityKind, user_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", cache_key(kind, user_id)))
    }

    async fn read_list(&self, path: &Path) -> Result<Vec<CacheEntry>, CacheError> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => Err(CacheError::Io {
                path: path.display().to_string(),
                source: err,
            }),
        }
    }

    async fn write_list(&self, path: &Path, list: &[CacheEntry]) -> Result<(), CacheError> {
        let io_err = |source| CacheError::Io {
            path: path.display().to_string(),
            source,
        };
        tokio::fs::create_dir_all(&self.dir).await.map_err(io_err)?;
        let bytes = serde_json::to_vec(list)?;
        tokio::fs::write(path, bytes).await.map_err(io_err)
    }
}

#[async_trait]
impl FallbackCache for JsonFileCache {
    async fn append(&self, entry: CacheEntry) -> Result<(), CacheError> {
        let path = self.path_for(entry.kind(), &entry.user_id);
        let list = self.read_list(&path).await?;
        if is_duplicate_achievement(&list, &entry) {
            return Ok(());
        }
        let list = prepend_capped(list, entry);
        self.write_list(&path, &list).await
    }

    async fn entries(
        &self,
        user_id: &str,
        kind: EntityKind,
    ) -> Result<Vec<CacheEntry>, CacheError> {
        let path = self.path_for(kind, user_id);
        self.read_list(&path).await
    }
}

/// In-memory cache for tests and in-process substitution.
#[derive(Default)]
pub struct MemoryCache {
    lists: Mutex<HashMap<String, Vec<CacheEntry>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FallbackCache for MemoryCache {
    async fn append(&self, entry: CacheEntry) -> Result<(), CacheError> {
        let key = cache_key(entry.kind(), &entry.user_id);
        let mut lists = self.lists.lock().expect("cache lock poisoned");
        let list = lists.remove(&key).unwrap_or_default();
        if is_duplicate_achievement(&list, &entry) {
            lists.insert(key, list);
            return Ok(());
        }
        lists.insert(key, prepend_capped(list, entry));
        Ok(())
    }

    async fn entries(
        &self,
        user_id: &str,
        kind: EntityKind,
    ) -> Result<Vec<CacheEntry>, CacheError> {
        let lists = self.lists.lock().expect("cache lock poisoned");
        Ok(lists
            .get(&cache_key(kind, user_id))
            .cloned()
            .unwrap_or_default())
    }
}
