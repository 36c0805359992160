//! Order Repository
//!
//! Append-only ledger: orders are created once and read back; no update or
//! delete is exposed. Status transitions are a future extension point.

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Order, OrderItem, OrderStatus};
use crate::utils::time::now_rfc3339;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashSet;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

/// Full document written on commit (timestamps filled here, id assigned by
/// the storage layer)
#[derive(Debug, Serialize)]
struct OrderContent {
    user: RecordId,
    items: Vec<OrderItem>,
    total: Decimal,
    status: OrderStatus,
    created_at: String,
    updated_at: String,
}

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Append a committed order to the ledger
    pub async fn create(
        &self,
        user: RecordId,
        items: Vec<OrderItem>,
        total: Decimal,
        status: OrderStatus,
    ) -> RepoResult<Order> {
        let now = now_rfc3339();
        let content = OrderContent {
            user,
            items,
            total,
            status,
            created_at: now.clone(),
            updated_at: now,
        };

        let created: Option<Order> = self.base.db().create("order").content(content).await?;
        created.ok_or_else(|| RepoError::Database("Order creation returned no record".into()))
    }

    /// All orders of a user, newest first
    pub async fn find_by_user(&self, user: &RecordId) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM order WHERE user = $user ORDER BY created_at DESC")
            .bind(("user", user.clone()))
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// Number of distinct users with a committed order containing the product
    pub async fn count_distinct_buyers(&self, product: &RecordId) -> RepoResult<usize> {
        let buyers: Vec<RecordId> = self
            .base
            .db()
            .query("SELECT VALUE user FROM order WHERE $product IN items.product")
            .bind(("product", product.clone()))
            .await?
            .take(0)?;

        let distinct: HashSet<String> = buyers.into_iter().map(|b| b.to_string()).collect();
        Ok(distinct.len())
    }
}
