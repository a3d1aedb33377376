//! PostgreSQL document store
//!
//! Documents live as JSONB rows keyed by (tenant, collection, id). A batch
//! runs inside one transaction; rows touched by field writes are locked with
//! `FOR UPDATE` so increments always add to the committed value.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;

use super::{apply_field_write, missing_document, BatchWrite, Collection, DocumentStore};
use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct PgDocumentStore {
    db: PgPool,
    tenant: String,
}

impl PgDocumentStore {
    pub fn new(db: PgPool, tenant: impl Into<String>) -> Self {
        Self {
            db,
            tenant: tenant.into(),
        }
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn get(&self, collection: Collection, id: &str) -> AppResult<Option<Value>> {
        let doc = sqlx::query_scalar::<_, Value>(
            "SELECT data FROM documents WHERE tenant = $1 AND collection = $2 AND id = $3",
        )
        .bind(&self.tenant)
        .bind(collection.as_str())
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(doc)
    }

    async fn list(&self, collection: Collection) -> AppResult<Vec<Value>> {
        let docs = sqlx::query_scalar::<_, Value>(
            "SELECT data FROM documents WHERE tenant = $1 AND collection = $2 ORDER BY created_at",
        )
        .bind(&self.tenant)
        .bind(collection.as_str())
        .fetch_all(&self.db)
        .await?;

        Ok(docs)
    }

    async fn put(&self, collection: Collection, id: &str, doc: Value) -> AppResult<()> {
        upsert(&mut *self.db.acquire().await?, &self.tenant, collection, id, &doc).await
    }

    async fn delete(&self, collection: Collection, id: &str) -> AppResult<bool> {
        let result = sqlx::query(
            "DELETE FROM documents WHERE tenant = $1 AND collection = $2 AND id = $3",
        )
        .bind(&self.tenant)
        .bind(collection.as_str())
        .bind(id)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn commit(&self, writes: Vec<BatchWrite>) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        for write in &writes {
            match write {
                BatchWrite::Put { collection, id, doc } => {
                    upsert(&mut *tx, &self.tenant, *collection, id, doc).await?;
                }
                BatchWrite::Delete { collection, id } => {
                    sqlx::query(
                        "DELETE FROM documents WHERE tenant = $1 AND collection = $2 AND id = $3",
                    )
                    .bind(&self.tenant)
                    .bind(collection.as_str())
                    .bind(id.as_str())
                    .execute(&mut *tx)
                    .await?;
                }
                BatchWrite::Replace { collection, id, .. }
                | BatchWrite::Increment { collection, id, .. }
                | BatchWrite::Set { collection, id, .. }
                | BatchWrite::Expect { collection, id, .. } => {
                    let mut doc = sqlx::query_scalar::<_, Value>(
                        r#"
                        SELECT data FROM documents
                        WHERE tenant = $1 AND collection = $2 AND id = $3
                        FOR UPDATE
                        "#,
                    )
                    .bind(&self.tenant)
                    .bind(collection.as_str())
                    .bind(id.as_str())
                    .fetch_optional(&mut *tx)
                    .await?
                    .ok_or_else(|| missing_document(write))?;

                    // Dropping `tx` on error rolls the whole batch back
                    apply_field_write(&mut doc, write)?;
                    // The row lock alone holds an expectation until commit
                    if !matches!(write, BatchWrite::Expect { .. }) {
                        upsert(&mut *tx, &self.tenant, *collection, id, &doc).await?;
                    }
                }
            }
        }

        tx.commit()
            .await
            .map_err(|e| AppError::BatchFailed(format!("commit rejected: {}", e)))?;

        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
    }
}

async fn upsert(
    conn: &mut sqlx::PgConnection,
    tenant: &str,
    collection: Collection,
    id: &str,
    doc: &Value,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO documents (tenant, collection, id, data)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (tenant, collection, id)
        DO UPDATE SET data = EXCLUDED.data, updated_at = NOW()
        "#,
    )
    .bind(tenant)
    .bind(collection.as_str())
    .bind(id)
    .bind(doc)
    .execute(conn)
    .await?;

    Ok(())
}
