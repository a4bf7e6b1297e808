use ella_core::ConnectorRecord;
use sqlx::FromRow;

use super::{ConnectorRepository, RepositoryError};
use crate::DbPool;

pub struct SqlConnectorRepository {
    pool: DbPool,
}

impl SqlConnectorRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct ConnectorRow {
    name: String,
    description: Option<String>,
    category: String,
}

impl From<ConnectorRow> for ConnectorRecord {
    fn from(row: ConnectorRow) -> Self {
        Self { name: row.name, description: row.description, category: row.category }
    }
}

#[async_trait::async_trait]
impl ConnectorRepository for SqlConnectorRepository {
    async fn search(&self, pattern: &str) -> Result<Vec<ConnectorRecord>, RepositoryError> {
        // instr over lower() instead of LIKE: user text may contain `%`/`_`.
        let rows: Vec<ConnectorRow> = sqlx::query_as(
            "SELECT name, description, category FROM connector \
             WHERE instr(lower(name), lower(?1)) > 0 \
                OR instr(lower(coalesce(description, '')), lower(?1)) > 0 \
                OR instr(lower(category), lower(?1)) > 0 \
             ORDER BY name",
        )
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ConnectorRecord::from).collect())
    }
}
