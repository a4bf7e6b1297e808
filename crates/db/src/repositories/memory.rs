use std::collections::HashMap;

use tokio::sync::RwLock;

use ella_core::ConnectorRecord;

use super::{ConnectorRepository, ConversationRepository, RepositoryError};

#[derive(Default)]
pub struct InMemoryConversationRepository {
    snapshots: RwLock<HashMap<String, String>>,
}

#[async_trait::async_trait]
impl ConversationRepository for InMemoryConversationRepository {
    async fn fetch_snapshot(&self, storage_key: &str) -> Result<Option<String>, RepositoryError> {
        let snapshots = self.snapshots.read().await;
        Ok(snapshots.get(storage_key).cloned())
    }

    async fn store_snapshot(
        &self,
        storage_key: &str,
        payload: &str,
    ) -> Result<(), RepositoryError> {
        let mut snapshots = self.snapshots.write().await;
        snapshots.insert(storage_key.to_string(), payload.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryConnectorRepository {
    connectors: Vec<ConnectorRecord>,
}

impl InMemoryConnectorRepository {
    pub fn with_connectors(connectors: Vec<ConnectorRecord>) -> Self {
        Self { connectors }
    }
}

#[async_trait::async_trait]
impl ConnectorRepository for InMemoryConnectorRepository {
    async fn search(&self, pattern: &str) -> Result<Vec<ConnectorRecord>, RepositoryError> {
        let needle = pattern.to_lowercase();
        Ok(self
            .connectors
            .iter()
            .filter(|record| {
                record.name.to_lowercase().contains(&needle)
                    || record
                        .description
                        .as_deref()
                        .is_some_and(|description| description.to_lowercase().contains(&needle))
                    || record.category.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect())
    }
}
