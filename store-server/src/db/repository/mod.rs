//! Repository Module
//!
//! Provides CRUD operations for the SurrealDB tables. One repository per
//! table; all of them are thin wrappers over a shared database handle so
//! handlers (and tests) construct them freely from any `Surreal<Db>`.

pub mod cart;
pub mod comment;
pub mod order;
pub mod product;
pub mod user;

// Re-exports
pub use cart::CartRepository;
pub use comment::CommentRepository;
pub use order::OrderRepository;
pub use product::ProductRepository;
pub use user::UserRepository;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

// =============================================================================
// ID Convention: "table:key" strings at the boundary, RecordId inside
// =============================================================================
//
//   - Parse:   let id: RecordId = "product:abc".parse()?;
//   - Build:   let id = RecordId::from_table_key("product", "abc");
//   - Key:     id.key().to_string()
//
// External ids (paths, JWT subjects, request bodies) arrive as strings and
// are parsed once at the repository boundary.

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}

/// Parse an external id string into a RecordId for the expected table.
///
/// Accepts both the full "table:key" form and the bare key.
pub fn parse_record_id(table: &str, id: &str) -> RepoResult<surrealdb::RecordId> {
    if let Some(key) = id.strip_prefix(&format!("{table}:")) {
        return Ok(surrealdb::RecordId::from_table_key(table, key));
    }
    if id.contains(':') {
        // Prefixed with some other table: reject rather than silently re-table it
        let parsed: surrealdb::RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {id}")))?;
        if parsed.table() != table {
            return Err(RepoError::Validation(format!(
                "Expected a {table} ID, got: {id}"
            )));
        }
        return Ok(parsed);
    }
    Ok(surrealdb::RecordId::from_table_key(table, id))
}
