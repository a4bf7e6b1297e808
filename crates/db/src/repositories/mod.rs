use async_trait::async_trait;
use thiserror::Error;

use ella_core::ConnectorRecord;

pub mod connector;
pub mod conversation;
pub mod memory;

pub use connector::SqlConnectorRepository;
pub use conversation::SqlConversationRepository;
pub use memory::{InMemoryConnectorRepository, InMemoryConversationRepository};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

/// Raw access to the persisted conversation snapshot. The repository only
/// moves opaque JSON payloads; structural validation happens in the store.
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    async fn fetch_snapshot(&self, storage_key: &str) -> Result<Option<String>, RepositoryError>;
    async fn store_snapshot(
        &self,
        storage_key: &str,
        payload: &str,
    ) -> Result<(), RepositoryError>;
}

/// Read access to the connector catalog. `search` is a case-insensitive
/// substring match of one pattern against name OR description OR category.
#[async_trait]
pub trait ConnectorRepository: Send + Sync {
    async fn search(&self, pattern: &str) -> Result<Vec<ConnectorRecord>, RepositoryError>;
}
