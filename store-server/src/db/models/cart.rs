//! Cart Model
//!
//! Each cart line is its own document keyed `(user, product)` so every cart
//! mutation is a single-document atomic delta at the storage layer. There is
//! no whole-cart document to clobber, so concurrent mutators on the same cart
//! cannot lose each other's writes.

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// One cart line: a product reference with quantity and selection flag,
/// owned by exactly one user. At most one line exists per (user, product).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub user: RecordId,
    pub product: RecordId,
    /// Always >= 1; deltas that would drop below 1 are floored
    pub quantity: i64,
    /// Marks intent to include this line in the next checkout
    #[serde(default = "default_true")]
    pub selected: bool,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

fn default_true() -> bool {
    true
}

/// Cart shape exposed over the API
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub user_id: String,
    pub items: Vec<CartItemView>,
}

/// Cart line shape exposed over the API
#[derive(Debug, Clone, Serialize)]
pub struct CartItemView {
    pub product_id: String,
    pub quantity: i64,
    pub selected: bool,
}

impl From<CartLine> for CartItemView {
    fn from(line: CartLine) -> Self {
        Self {
            product_id: line.product.to_string(),
            quantity: line.quantity,
            selected: line.selected,
        }
    }
}

impl CartView {
    /// Assemble the API view; a user with no lines gets an empty cart
    pub fn from_lines(user: &RecordId, lines: Vec<CartLine>) -> Self {
        Self {
            user_id: user.to_string(),
            items: lines.into_iter().map(CartItemView::from).collect(),
        }
    }
}
