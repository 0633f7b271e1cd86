use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::debug;

use crate::models::ChatMessage;

/// Messages kept per conversation; older ones are dropped first.
pub const MAX_HISTORY: usize = 200;

/// Conversation log per session, keyed by the caller's bearer token.
#[derive(Debug, Default)]
pub struct ChatHistory {
    conversations: RwLock<HashMap<String, Vec<ChatMessage>>>,
}

impl ChatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record(&self, session: &str, messages: &[ChatMessage]) {
        let mut conversations = self.conversations.write().await;
        let log = conversations.entry(session.to_string()).or_default();
        log.extend_from_slice(messages);

        if log.len() > MAX_HISTORY {
            let excess = log.len() - MAX_HISTORY;
            log.drain(..excess);
        }
    }

    pub async fn messages(&self, session: &str) -> Vec<ChatMessage> {
        self.conversations
            .read()
            .await
            .get(session)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn clear(&self, session: &str) {
        if self.conversations.write().await.remove(session).is_some() {
            debug!("Cleared chat history for session");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_history_is_per_session() {
        let history = ChatHistory::new();
        history.record("a", &[ChatMessage::user("oi"), ChatMessage::bot("olá")]).await;
        history.record("b", &[ChatMessage::user("outro")]).await;

        let a = history.messages("a").await;
        assert_eq!(a.len(), 2);
        assert_eq!(a[1].text, "olá");
        assert_eq!(history.messages("b").await.len(), 1);
        assert!(history.messages("c").await.is_empty());
    }

    #[tokio::test]
    async fn test_clear_only_affects_one_session() {
        let history = ChatHistory::new();
        history.record("a", &[ChatMessage::user("oi")]).await;
        history.record("b", &[ChatMessage::user("oi")]).await;

        history.clear("a").await;

        assert!(history.messages("a").await.is_empty());
        assert_eq!(history.messages("b").await.len(), 1);
    }

    #[tokio::test]
    async fn test_oldest_messages_are_dropped() {
        let history = ChatHistory::new();
        let batch: Vec<ChatMessage> = (0..MAX_HISTORY + 5).map(|i| ChatMessage::user(i.to_string())).collect();
        history.record("a", &batch).await;

        let kept = history.messages("a").await;
        assert_eq!(kept.len(), MAX_HISTORY);
        assert_eq!(kept[0].text, "5");
    }
}
