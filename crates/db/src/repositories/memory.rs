use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use frontdesk_core::domain::session::{CallSession, ConversationSession};

use super::{CallSessionRepository, RepositoryError, SessionRepository};

pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, ConversationSession>>,
    ttl: chrono::Duration,
}

impl InMemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        Self { sessions: RwLock::new(HashMap::new()), ttl }
    }

    pub async fn find_at(&self, id: &str, now: DateTime<Utc>) -> Option<ConversationSession> {
        let sessions = self.sessions.read().await;
        sessions.get(id).filter(|session| !session.is_expired(now, self.ttl)).cloned()
    }

    pub async fn sweep_expired_at(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(now, self.ttl));
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl SessionRepository for InMemorySessionStore {
    async fn find(&self, id: &str) -> Result<Option<ConversationSession>, RepositoryError> {
        Ok(self.find_at(id, Utc::now()).await)
    }

    async fn save(&self, session: ConversationSession) -> Result<(), RepositoryError> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(session.id.clone(), session);
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<(), RepositoryError> {
        self.sessions.write().await.remove(id);
        Ok(())
    }

    async fn sweep_expired(&self) -> Result<usize, RepositoryError> {
        Ok(self.sweep_expired_at(Utc::now()).await)
    }
}

#[derive(Default)]
pub struct InMemoryCallSessionStore {
    calls: RwLock<HashMap<String, CallSession>>,
}

#[async_trait::async_trait]
impl CallSessionRepository for InMemoryCallSessionStore {
    async fn find(&self, id: &str) -> Result<Option<CallSession>, RepositoryError> {
        let calls = self.calls.read().await;
        Ok(calls.get(id).cloned())
    }

    async fn find_by_call_id(&self, call_id: &str) -> Result<Option<CallSession>, RepositoryError> {
        let calls = self.calls.read().await;
        Ok(calls.values().find(|call| call.call_id.as_deref() == Some(call_id)).cloned())
    }

    async fn save(&self, session: CallSession) -> Result<(), RepositoryError> {
        let mut calls = self.calls.write().await;
        calls.insert(session.id.clone(), session);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<CallSession>, RepositoryError> {
        let calls = self.calls.read().await;
        let mut listed = calls.values().cloned().collect::<Vec<_>>();
        listed.sort_by(|left, right| right.started_at.cmp(&left.started_at));
        Ok(listed)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::Utc;

    use frontdesk_core::domain::session::{CallDirection, CallSession, ConversationSession};
    use frontdesk_core::flows::DialogueStep;

    use super::{InMemoryCallSessionStore, InMemorySessionStore};
    use crate::repositories::{CallSessionRepository, SessionRepository};

    #[tokio::test]
    async fn session_round_trip_and_removal() {
        let store = InMemorySessionStore::new(Duration::from_secs(1800));
        let mut session = ConversationSession::new("web-1", Utc::now());
        session.step = DialogueStep::AwaitingGuestsDates;

        store.save(session.clone()).await.expect("save session");
        let found = store.find("web-1").await.expect("find session");
        assert_eq!(found, Some(session));

        store.remove("web-1").await.expect("remove session");
        assert!(store.find("web-1").await.expect("find session").is_none());
    }

    #[tokio::test]
    async fn idle_sessions_are_hidden_then_swept() {
        let store = InMemorySessionStore::new(Duration::from_secs(1800));
        let start = Utc::now();
        store.save(ConversationSession::new("stale", start)).await.expect("save stale");
        store
            .save(ConversationSession::new("fresh", start + chrono::Duration::minutes(20)))
            .await
            .expect("save fresh");

        let later = start + chrono::Duration::minutes(31);
        assert!(store.find_at("stale", later).await.is_none());
        assert!(store.find_at("fresh", later).await.is_some());

        assert_eq!(store.sweep_expired_at(later).await, 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn call_sessions_are_found_by_provider_id_and_listed_newest_first() {
        let store = InMemoryCallSessionStore::default();
        let start = Utc::now();
        let first = CallSession::new(
            "call-a",
            Some("vapi-1".to_owned()),
            "+15551230000",
            CallDirection::Inbound,
            start,
        );
        let second = CallSession::new(
            "call-b",
            None,
            "+15551239999",
            CallDirection::Outbound,
            start + chrono::Duration::seconds(5),
        );
        store.save(first.clone()).await.expect("save first");
        store.save(second.clone()).await.expect("save second");

        let by_call = store.find_by_call_id("vapi-1").await.expect("find by call id");
        assert_eq!(by_call.map(|call| call.id), Some("call-a".to_owned()));

        let listed = store.list().await.expect("list calls");
        let ids = listed.iter().map(|call| call.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["call-b", "call-a"]);
    }
}
