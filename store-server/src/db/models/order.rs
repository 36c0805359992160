//! Order Model
//!
//! Orders are an append-only ledger. Line items are snapshots of the product
//! name/price captured at checkout time, never live references, so later
//! catalog edits cannot retroactively change historical orders.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Order status
///
/// `Paid` means "checkout accepted": there is no external payment gateway.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Paid,
    Cancelled,
}

/// Snapshotted line item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    /// Product reference at checkout time. Kept for aggregation queries
    /// (buyer counts); never dereferenced when reading an order back.
    pub product: Option<RecordId>,
    pub name: String,
    /// Unit price at checkout time
    pub price: Decimal,
    pub quantity: i64,
}

impl OrderItem {
    /// Line total (unit price x quantity)
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Committed order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub user: RecordId,
    pub items: Vec<OrderItem>,
    /// Invariant: total == sum of item line totals, exactly
    pub total: Decimal,
    pub status: OrderStatus,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}
