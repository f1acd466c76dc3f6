use std::collections::BTreeSet;

use prep_core::model::QuestionId;
use prep_core::quiz::StoredQuiz;
use serde::Serialize;
use storage::repository::{Storage, StorageScope};
use tracing::warn;

/// Durable key holding the ids of every question shown since the last reset.
pub const SEEN_QUESTIONS_KEY: &str = "quiz-seen-questions";
/// Session key holding the navigation history of the current session.
pub const HISTORY_KEY: &str = "quiz-history";

/// Quiz-specific view over the two storage scopes.
///
/// Reads fail open: a missing, unreadable, or malformed value is reported as
/// absent. Writes are fire-and-forget: failures are logged and swallowed, so
/// the in-memory session stays authoritative.
#[derive(Clone)]
pub struct QuizPersistence {
    storage: Storage,
}

impl QuizPersistence {
    #[must_use]
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Read both collections for session initialisation.
    pub async fn load(&self) -> StoredQuiz {
        StoredQuiz {
            seen: self.load_seen().await,
            history: self.load_history().await,
        }
    }

    pub async fn load_seen(&self) -> Option<Vec<QuestionId>> {
        self.read_ids(StorageScope::Durable, SEEN_QUESTIONS_KEY).await
    }

    pub async fn load_history(&self) -> Option<Vec<QuestionId>> {
        self.read_ids(StorageScope::Session, HISTORY_KEY).await
    }

    pub async fn save_seen(&self, ids: &BTreeSet<QuestionId>) {
        self.write_ids(StorageScope::Durable, SEEN_QUESTIONS_KEY, ids)
            .await;
    }

    pub async fn save_history(&self, ids: &[QuestionId]) {
        self.write_ids(StorageScope::Session, HISTORY_KEY, ids).await;
    }

    /// Remove both keys.
    pub async fn clear(&self) {
        for (scope, key) in [
            (StorageScope::Durable, SEEN_QUESTIONS_KEY),
            (StorageScope::Session, HISTORY_KEY),
        ] {
            if let Err(err) = self.storage.scope(scope).remove(key).await {
                warn!(%scope, key, error = %err, "failed to clear quiz state");
            }
        }
    }

    async fn read_ids(&self, scope: StorageScope, key: &str) -> Option<Vec<QuestionId>> {
        let raw = match self.storage.scope(scope).get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                warn!(%scope, key, error = %err, "failed to read quiz state");
                return None;
            }
        };

        match serde_json::from_str::<Vec<QuestionId>>(&raw) {
            Ok(ids) => Some(ids),
            Err(err) => {
                warn!(%scope, key, error = %err, "ignoring malformed quiz state");
                None
            }
        }
    }

    async fn write_ids<T>(&self, scope: StorageScope, key: &str, ids: &T)
    where
        T: Serialize + ?Sized,
    {
        let raw = match serde_json::to_string(ids) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(%scope, key, error = %err, "failed to encode quiz state");
                return;
            }
        };
        if let Err(err) = self.storage.scope(scope).set(key, &raw).await {
            warn!(%scope, key, error = %err, "failed to save quiz state");
        }
    }
}
