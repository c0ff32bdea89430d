//! In-memory session registry.
//!
//! Maps session ids to live collectors. Each collector sits behind its own
//! async mutex, so calls against one session serialize while distinct
//! sessions proceed independently. Sessions live for the process lifetime
//! unless removed; there is no persistence.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::application::ConversationCollector;
use crate::domain::foundation::SessionId;

/// Thread-safe registry of active conversation collectors.
#[derive(Clone, Default)]
pub struct InMemorySessionRegistry {
    sessions: Arc<RwLock<HashMap<SessionId, Arc<Mutex<ConversationCollector>>>>>,
}

impl InMemorySessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Registers a collector under `session_id`. Returns `false` if the id
    /// was already taken (the existing session is left untouched).
    pub async fn insert(&self, session_id: SessionId, collector: ConversationCollector) -> bool {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&session_id) {
            return false;
        }
        sessions.insert(session_id, Arc::new(Mutex::new(collector)));
        true
    }

    /// Looks up the collector for `session_id`.
    pub async fn get(&self, session_id: SessionId) -> Option<Arc<Mutex<ConversationCollector>>> {
        self.sessions.read().await.get(&session_id).cloned()
    }

    /// Removes and returns the collector for `session_id`.
    pub async fn remove(
        &self,
        session_id: SessionId,
    ) -> Option<Arc<Mutex<ConversationCollector>>> {
        self.sessions.write().await.remove(&session_id)
    }

    pub async fn contains(&self, session_id: SessionId) -> bool {
        self.sessions.read().await.contains_key(&session_id)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockGenerator;
    use crate::application::CollectorOptions;

    fn collector() -> ConversationCollector {
        ConversationCollector::new(
            Arc::new(MockGenerator::new()),
            CollectorOptions::default(),
        )
    }

    #[tokio::test]
    async fn insert_and_get_round_trip() {
        let registry = InMemorySessionRegistry::new();
        let session_id = SessionId::new();

        assert!(registry.insert(session_id, collector()).await);
        assert!(registry.get(session_id).await.is_some());
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn insert_refuses_duplicate_session_id() {
        let registry = InMemorySessionRegistry::new();
        let session_id = SessionId::new();

        assert!(registry.insert(session_id, collector()).await);
        assert!(!registry.insert(session_id, collector()).await);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn get_unknown_session_is_none() {
        let registry = InMemorySessionRegistry::new();
        assert!(registry.get(SessionId::new()).await.is_none());
    }

    #[tokio::test]
    async fn remove_deletes_the_session() {
        let registry = InMemorySessionRegistry::new();
        let session_id = SessionId::new();
        registry.insert(session_id, collector()).await;

        assert!(registry.remove(session_id).await.is_some());
        assert!(!registry.contains(session_id).await);
        assert!(registry.is_empty().await);
        assert!(registry.remove(session_id).await.is_none());
    }

    #[tokio::test]
    async fn clones_share_state() {
        let registry = InMemorySessionRegistry::new();
        let clone = registry.clone();
        let session_id = SessionId::new();

        registry.insert(session_id, collector()).await;

        assert!(clone.contains(session_id).await);
    }
}
