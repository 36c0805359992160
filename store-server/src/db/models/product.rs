//! Product Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Catalog product entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub name: String,
    /// Unit price, non-negative
    pub price: Decimal,
    #[serde(default)]
    pub description: String,
    /// Units on hand. Never negative: checkout reserves stock with a
    /// conditional decrement, not a blind write.
    #[serde(default)]
    pub stock: i64,
    pub category: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// Create payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub price: Decimal,
    pub description: Option<String>,
    pub stock: Option<i64>,
    pub category: String,
    pub image: Option<String>,
}

/// Update payload (partial; absent fields are left untouched)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}
