use chrono::Utc;

use super::{ConversationRepository, RepositoryError};
use crate::DbPool;

pub struct SqlConversationRepository {
    pool: DbPool,
}

impl SqlConversationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ConversationRepository for SqlConversationRepository {
    async fn fetch_snapshot(&self, storage_key: &str) -> Result<Option<String>, RepositoryError> {
        let payload: Option<(String,)> = sqlx::query_as(
            "SELECT payload FROM conversation_snapshot WHERE storage_key = ?1",
        )
        .bind(storage_key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(payload.map(|(value,)| value))
    }

    async fn store_snapshot(
        &self,
        storage_key: &str,
        payload: &str,
    ) -> Result<(), RepositoryError> {
        // Single UPSERT so readers never observe a partially written snapshot.
        sqlx::query(
            "INSERT INTO conversation_snapshot (storage_key, payload, updated_at) \
             VALUES (?1, ?2, ?3) \
             ON CONFLICT (storage_key) DO UPDATE SET payload = ?2, updated_at = ?3",
        )
        .bind(storage_key)
        .bind(payload)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
