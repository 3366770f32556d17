//! Database Module
//!
//! Embedded SurrealDB storage: connection setup and schema definition.

pub mod models;
pub mod repository;

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem, RocksDb};

use crate::common::AppError;

const NAMESPACE: &str = "fooddelivery";
const DATABASE: &str = "orders";

/// Table and index definitions.
///
/// The UNIQUE index on `idempotency_key` is the final arbiter for
/// duplicate order creation: a racing insert fails here even when both
/// requests observed "no existing order".
const SCHEMA: &str = r#"
    DEFINE TABLE IF NOT EXISTS order SCHEMALESS;
    DEFINE INDEX IF NOT EXISTS uniq_order_idempotency ON TABLE order FIELDS idempotency_key UNIQUE;
    DEFINE INDEX IF NOT EXISTS idx_order_user ON TABLE order FIELDS user_id;
    DEFINE INDEX IF NOT EXISTS idx_order_restaurant ON TABLE order FIELDS restaurant_id;
"#;

/// Database service — owns the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) the RocksDB-backed database at `path`.
    pub async fn open(path: &str) -> Result<Self, AppError> {
        let db = Surreal::new::<RocksDb>(path)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;
        let service = Self::setup(db).await?;
        tracing::info!(path = %path, "Database connection established (SurrealDB/RocksDB)");
        Ok(service)
    }

    /// In-memory database for tests.
    pub async fn open_in_memory() -> Result<Self, AppError> {
        let db = Surreal::new::<Mem>(())
            .await
            .map_err(|e| AppError::database(format!("Failed to open in-memory database: {e}")))?;
        Self::setup(db).await
    }

    async fn setup(db: Surreal<Db>) -> Result<Self, AppError> {
        db.use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;

        db.query(SCHEMA)
            .await
            .and_then(|response| response.check())
            .map_err(|e| AppError::database(format!("Failed to apply schema: {e}")))?;

        Ok(Self { db })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_in_memory_applies_schema() {
        let service = DbService::open_in_memory().await.unwrap();
        // Schema definition is idempotent.
        service.db.query(SCHEMA).await.unwrap();
    }

    #[tokio::test]
    async fn test_open_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders.db");
        let service = DbService::open(path.to_str().unwrap()).await.unwrap();
        drop(service);
    }
}
