//! Database Module
//!
//! Embedded SurrealDB (RocksDB engine) bootstrap and schema definitions.

pub mod models;
pub mod repository;

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, RocksDb};

use crate::utils::AppError;

const NAMESPACE: &str = "store";
const DATABASE: &str = "store";

/// Database service — owns the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) the embedded database at `db_path` and apply schema definitions
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        let db: Surreal<Db> = Surreal::new::<RocksDb>(db_path)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;

        db.use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;

        Self::define_schema(&db).await?;

        tracing::info!(path = %db_path, "Database connection established (SurrealDB/RocksDB)");

        Ok(Self { db })
    }

    /// Idempotent schema definitions.
    ///
    /// Tables are schemaless; only the constraints the application relies on
    /// are declared here (one account per email).
    async fn define_schema(db: &Surreal<Db>) -> Result<(), AppError> {
        db.query("DEFINE INDEX IF NOT EXISTS user_email ON TABLE user FIELDS email UNIQUE")
            .await
            .map_err(|e| AppError::database(format!("Failed to define schema: {e}")))?
            .check()
            .map_err(|e| AppError::database(format!("Schema definition rejected: {e}")))?;
        Ok(())
    }
}
