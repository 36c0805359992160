//! GraphQL object types
//!
//! Wire shapes for the graph endpoint. Ids are rendered as "table:key"
//! strings; money fields use the Decimal scalar.

use async_graphql::{ID, InputObject, SimpleObject};
use rust_decimal::Decimal;

use crate::checkout::CheckoutItemInput;
use crate::db::models::{CartLine, Order, OrderItem};

/// One cart line
#[derive(Debug, Clone, SimpleObject)]
#[graphql(name = "CartItem")]
pub struct GqlCartItem {
    pub product_id: ID,
    pub quantity: i64,
    pub selected: bool,
}

impl From<CartLine> for GqlCartItem {
    fn from(line: CartLine) -> Self {
        Self {
            product_id: ID(line.product.to_string()),
            quantity: line.quantity,
            selected: line.selected,
        }
    }
}

/// The calling user's cart
#[derive(Debug, Clone, SimpleObject)]
#[graphql(name = "Cart")]
pub struct GqlCart {
    pub user_id: ID,
    pub items: Vec<GqlCartItem>,
}

impl GqlCart {
    pub fn from_lines(user_id: &str, lines: Vec<CartLine>) -> Self {
        Self {
            user_id: ID(user_id.to_string()),
            items: lines.into_iter().map(GqlCartItem::from).collect(),
        }
    }
}

/// Snapshotted order line
#[derive(Debug, Clone, SimpleObject)]
#[graphql(name = "OrderItem")]
pub struct GqlOrderItem {
    pub product_id: Option<ID>,
    pub name: String,
    pub price: Decimal,
    pub quantity: i64,
}

impl From<OrderItem> for GqlOrderItem {
    fn from(item: OrderItem) -> Self {
        Self {
            product_id: item.product.as_ref().map(|p| ID(p.to_string())),
            name: item.name,
            price: item.price,
            quantity: item.quantity,
        }
    }
}

/// Committed order
#[derive(Debug, Clone, SimpleObject)]
#[graphql(name = "Order")]
pub struct GqlOrder {
    pub id: Option<ID>,
    pub user_id: ID,
    pub items: Vec<GqlOrderItem>,
    pub total: Decimal,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Order> for GqlOrder {
    fn from(order: Order) -> Self {
        Self {
            id: order.id.as_ref().map(|id| ID(id.to_string())),
            user_id: ID(order.user.to_string()),
            items: order.items.into_iter().map(GqlOrderItem::from).collect(),
            total: order.total,
            status: format!("{:?}", order.status).to_uppercase(),
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

/// Checkout result envelope: stable code, message, order on success
#[derive(Debug, Clone, SimpleObject)]
pub struct CheckoutPayload {
    pub code: String,
    pub message: String,
    pub order: Option<GqlOrder>,
}

/// Explicit checkout line
#[derive(Debug, Clone, InputObject)]
#[graphql(name = "CheckoutItemInput")]
pub struct GqlCheckoutItem {
    pub product_id: ID,
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub quantity: Option<i64>,
}

impl From<GqlCheckoutItem> for CheckoutItemInput {
    fn from(item: GqlCheckoutItem) -> Self {
        Self {
            product_id: Some(item.product_id.0),
            name: item.name,
            price: item.price,
            quantity: item.quantity,
        }
    }
}
