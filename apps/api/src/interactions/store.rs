use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::interactions::{DocumentStore, InteractionRecord, StoreError};

/// Document store backed by the `documents` table. Append-only: one INSERT
/// per record, `id` and `created_at` assigned by Postgres.
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn create(
        &self,
        collection: &str,
        record: &InteractionRecord,
    ) -> Result<String, StoreError> {
        let body = serde_json::to_value(record)?;

        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO documents (collection, body)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(collection)
        .bind(&body)
        .fetch_one(&self.pool)
        .await?;

        Ok(id.to_string())
    }
}
