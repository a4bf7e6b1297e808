use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::warn;
use uuid::Uuid;

use ella_core::Message;

use crate::repositories::{ConversationRepository, RepositoryError};

/// Explicit publish/subscribe channel between message store instances.
/// Every write is tagged with the writing instance's id so subscribers can
/// suppress their own notifications and only react to foreign changes.
#[derive(Clone)]
pub struct ChangeHub {
    sender: broadcast::Sender<ChangeNotice>,
}

#[derive(Clone, Debug)]
pub struct ChangeNotice {
    pub storage_key: String,
    pub origin: Uuid,
}

impl ChangeHub {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(32);
        Self { sender }
    }

    fn publish(&self, notice: ChangeNotice) {
        // Send only fails when nobody subscribes, which is fine.
        let _ = self.sender.send(notice);
    }

    fn receiver(&self) -> broadcast::Receiver<ChangeNotice> {
        self.sender.subscribe()
    }
}

impl Default for ChangeHub {
    fn default() -> Self {
        Self::new()
    }
}

/// Change feed of one store instance: yields notices for the same storage key
/// written by *other* instances, never for this instance's own writes.
pub struct ConversationSubscription {
    receiver: broadcast::Receiver<ChangeNotice>,
    storage_key: String,
    instance_id: Uuid,
}

impl ConversationSubscription {
    pub async fn next_change(&mut self) -> Option<ChangeNotice> {
        loop {
            match self.receiver.recv().await {
                Ok(notice) => {
                    if notice.origin == self.instance_id || notice.storage_key != self.storage_key {
                        continue;
                    }
                    return Some(notice);
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "conversation subscription lagged, dropping old notices");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

/// Durable conversation persistence under one well-known storage key.
///
/// The whole snapshot is written in a single statement per append, so readers
/// never observe a partially written sequence. A snapshot that fails
/// structural validation is treated as absent: loading logs and returns an
/// empty conversation rather than surfacing an error.
pub struct MessageStore {
    repository: Arc<dyn ConversationRepository>,
    storage_key: String,
    hub: ChangeHub,
    instance_id: Uuid,
}

impl MessageStore {
    pub fn new(
        repository: Arc<dyn ConversationRepository>,
        storage_key: impl Into<String>,
        hub: ChangeHub,
    ) -> Self {
        Self { repository, storage_key: storage_key.into(), hub, instance_id: Uuid::new_v4() }
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    pub async fn load(&self) -> Vec<Message> {
        let payload = match self.repository.fetch_snapshot(&self.storage_key).await {
            Ok(Some(payload)) => payload,
            Ok(None) => return Vec::new(),
            Err(error) => {
                warn!(storage_key = %self.storage_key, error = %error,
                    "conversation snapshot could not be read, treating as empty");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Message>>(&payload) {
            Ok(messages) => messages,
            Err(error) => {
                warn!(storage_key = %self.storage_key, error = %error,
                    "conversation snapshot failed structural validation, treating as absent");
                Vec::new()
            }
        }
    }

    pub async fn append(&self, message: Message) -> Result<Vec<Message>, RepositoryError> {
        let mut messages = self.load().await;
        messages.push(message);

        let payload = serde_json::to_string(&messages)
            .map_err(|error| RepositoryError::Decode(error.to_string()))?;
        self.repository.store_snapshot(&self.storage_key, &payload).await?;

        self.hub.publish(ChangeNotice {
            storage_key: self.storage_key.clone(),
            origin: self.instance_id,
        });

        Ok(messages)
    }

    pub fn subscribe(&self) -> ConversationSubscription {
        ConversationSubscription {
            receiver: self.hub.receiver(),
            storage_key: self.storage_key.clone(),
            instance_id: self.instance_id,
        }
    }
}
