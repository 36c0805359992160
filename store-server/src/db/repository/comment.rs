//! Comment Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Comment, CommentWithAuthor};
use crate::utils::time::now_rfc3339;
use std::collections::HashSet;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

#[derive(Clone)]
pub struct CommentRepository {
    base: BaseRepository,
}

impl CommentRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Append a comment for a product
    pub async fn create(
        &self,
        user: RecordId,
        product: RecordId,
        content: String,
    ) -> RepoResult<Comment> {
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE comment SET
                    user = $user,
                    product = $product,
                    content = $content,
                    created_at = $now,
                    updated_at = $now
                RETURN AFTER"#,
            )
            .bind(("user", user))
            .bind(("product", product))
            .bind(("content", content))
            .bind(("now", now_rfc3339()))
            .await?;

        let comments: Vec<Comment> = result.take(0)?;
        comments
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::Database("Comment creation returned no record".into()))
    }

    /// Comments for a product, newest first, with author name/email resolved
    pub async fn find_by_product(&self, product: &RecordId) -> RepoResult<Vec<CommentWithAuthor>> {
        let comments: Vec<CommentWithAuthor> = self
            .base
            .db()
            .query(
                "SELECT *, user.name AS user_name, user.email AS user_email \
                 FROM comment WHERE product = $product ORDER BY created_at DESC",
            )
            .bind(("product", product.clone()))
            .await?
            .take(0)?;
        Ok(comments)
    }

    /// Number of distinct users who commented on the product
    pub async fn count_distinct_commenters(&self, product: &RecordId) -> RepoResult<usize> {
        let commenters: Vec<RecordId> = self
            .base
            .db()
            .query("SELECT VALUE user FROM comment WHERE product = $product")
            .bind(("product", product.clone()))
            .await?
            .take(0)?;

        let distinct: HashSet<String> = commenters.into_iter().map(|c| c.to_string()).collect();
        Ok(distinct.len())
    }
}
