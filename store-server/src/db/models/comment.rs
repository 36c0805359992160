//! Comment Model

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Per-product comment record (append-only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub user: RecordId,
    pub product: RecordId,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// Comment read shape with the author's name/email resolved
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentWithAuthor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub user: RecordId,
    pub product: RecordId,
    #[serde(default)]
    pub content: String,
    /// Resolved author fields; None when the account has been deleted
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub created_at: String,
}
