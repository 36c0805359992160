//! Checkout Orchestrator
//!
//! Converts either an explicit list of line items or the user's currently
//! selected cart lines into a committed [`Order`], guaranteeing stock is
//! never oversold and leaving the cart consistent.
//!
//! # Contract
//!
//! 1. Input resolution: explicit items verbatim, or the cart's selected lines
//! 2. Snapshot enrichment: cart lines capture the live product name/price
//! 3. Validation pass over *all* lines before any mutation
//! 4. Reservation: per-product atomic stock decrement (no cross-line
//!    transaction; a crash mid-loop leaves earlier decrements applied with
//!    no order recorded, a known and documented gap)
//! 5. Total computation and ledger commit with status `PAID`
//! 6. Cart reconciliation: ordered lines leave the cart, the rest stay
//!
//! Every failure is a tagged [`CheckoutError`]; nothing here panics or maps
//! business failures onto transport concerns.

use rust_decimal::Decimal;
use serde::Deserialize;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};
use thiserror::Error;

use crate::db::models::{Order, OrderItem, OrderStatus};
use crate::db::repository::{
    CartRepository, OrderRepository, ProductRepository, RepoError, UserRepository,
};

/// How explicit checkout items are priced.
///
/// The inherited behavior trusts client-declared price/name on explicit
/// items (price-lock style flows depend on it); `CatalogOnly` re-derives
/// both from the catalog instead. Selected by configuration, never switched
/// implicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PricingPolicy {
    #[default]
    TrustClient,
    CatalogOnly,
}

/// One explicit checkout line as supplied by a client
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutItemInput {
    pub product_id: Option<String>,
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub quantity: Option<i64>,
}

/// Checkout failure kinds, each with a stable wire code ([`CheckoutError::code`])
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Missing user id")]
    MissingUser,

    #[error("No cart lines are selected for checkout")]
    EmptySelection,

    #[error("No resolvable items to order")]
    NoResolvableItems,

    #[error("Order line is missing a product reference")]
    MissingProductReference,

    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Insufficient stock for product '{0}'")]
    InsufficientStock(String),

    #[error("Storage failure: {0}")]
    System(String),
}

impl CheckoutError {
    /// Stable result code reported at the API boundary
    pub fn code(&self) -> &'static str {
        match self {
            CheckoutError::MissingUser => "MISSING_USER",
            CheckoutError::EmptySelection => "EMPTY_SELECTION",
            CheckoutError::NoResolvableItems => "NO_RESOLVABLE_ITEMS",
            CheckoutError::MissingProductReference => "MISSING_PRODUCT_REFERENCE",
            CheckoutError::ProductNotFound(_) => "PRODUCT_NOT_FOUND",
            CheckoutError::InsufficientStock(_) => "INSUFFICIENT_STOCK",
            CheckoutError::System(_) => "SYSTEM_ERROR",
        }
    }
}

impl From<RepoError> for CheckoutError {
    fn from(err: RepoError) -> Self {
        CheckoutError::System(err.to_string())
    }
}

/// A line after input resolution, before validation
#[derive(Debug, Clone)]
struct PendingLine {
    product_id: Option<String>,
    name: String,
    price: Decimal,
    quantity: i64,
}

/// A line that passed validation and is ready to reserve
#[derive(Debug, Clone)]
struct ResolvedLine {
    product: RecordId,
    name: String,
    price: Decimal,
    quantity: i64,
}

/// The orchestrator. Owns its repositories (injected, never global) so tests
/// run it against a scratch database.
#[derive(Clone)]
pub struct CheckoutService {
    products: ProductRepository,
    carts: CartRepository,
    orders: OrderRepository,
    policy: PricingPolicy,
}

impl CheckoutService {
    pub fn new(
        products: ProductRepository,
        carts: CartRepository,
        orders: OrderRepository,
        policy: PricingPolicy,
    ) -> Self {
        Self {
            products,
            carts,
            orders,
            policy,
        }
    }

    /// Convenience constructor over a shared database handle
    pub fn with_db(db: Surreal<Db>, policy: PricingPolicy) -> Self {
        Self::new(
            ProductRepository::new(db.clone()),
            CartRepository::new(db.clone()),
            OrderRepository::new(db),
            policy,
        )
    }

    /// Create an order for `user_id` from `items` (when supplied, non-empty)
    /// or from the user's selected cart lines.
    pub async fn create_order(
        &self,
        user_id: &str,
        items: Option<Vec<CheckoutItemInput>>,
    ) -> Result<Order, CheckoutError> {
        if user_id.trim().is_empty() {
            return Err(CheckoutError::MissingUser);
        }
        let user =
            UserRepository::record_id(user_id).map_err(|_| CheckoutError::MissingUser)?;

        // 1. Input resolution
        let explicit = items.as_ref().is_some_and(|list| !list.is_empty());
        let pending = if explicit {
            self.resolve_explicit(items.unwrap_or_default())
        } else {
            self.resolve_from_cart(&user).await?
        };

        if pending.is_empty() {
            return Err(CheckoutError::NoResolvableItems);
        }

        // 3. Validation pass: every line is checked before anything mutates.
        // A failure here aborts the whole order with zero side effects.
        let resolved = self.validate(pending, explicit).await?;

        // 4. Reservation: atomic per-product decrements, no cross-line
        // transaction.
        self.reserve(&resolved).await?;

        // 5. Total + ledger commit
        let total: Decimal = resolved
            .iter()
            .map(|line| line.price * Decimal::from(line.quantity))
            .sum();

        let snapshots: Vec<OrderItem> = resolved
            .iter()
            .map(|line| OrderItem {
                product: Some(line.product.clone()),
                name: line.name.clone(),
                price: line.price,
                quantity: line.quantity,
            })
            .collect();

        let order = self
            .orders
            .create(user.clone(), snapshots, total, OrderStatus::Paid)
            .await?;

        // 6. Cart reconciliation: drop exactly the ordered lines. The order
        // is already committed at this point; a storage failure here still
        // surfaces as SYSTEM_ERROR (inherited behavior, logged loudly).
        let ordered: Vec<RecordId> = resolved.iter().map(|l| l.product.clone()).collect();
        if let Err(e) = self.carts.remove_products(&user, &ordered).await {
            tracing::error!(
                user = %user,
                order = ?order.id,
                error = %e,
                "Cart reconciliation failed after order commit"
            );
            return Err(CheckoutError::System(e.to_string()));
        }

        tracing::info!(
            user = %user,
            order = ?order.id,
            total = %order.total,
            lines = order.items.len(),
            "Checkout committed"
        );

        Ok(order)
    }

    /// Explicit items are taken verbatim; absent quantities default to 1 and
    /// anything below 1 is floored (line quantities are always >= 1).
    fn resolve_explicit(&self, items: Vec<CheckoutItemInput>) -> Vec<PendingLine> {
        items
            .into_iter()
            .map(|it| PendingLine {
                product_id: it.product_id,
                name: it.name.unwrap_or_default(),
                price: it.price.unwrap_or(Decimal::ZERO),
                quantity: it.quantity.unwrap_or(1).max(1),
            })
            .collect()
    }

    /// 2. Snapshot enrichment: selected cart lines capture the live product
    /// name/price. A vanished product leaves an empty snapshot here and is
    /// rejected by the validation pass.
    async fn resolve_from_cart(
        &self,
        user: &RecordId,
    ) -> Result<Vec<PendingLine>, CheckoutError> {
        let cart = self.carts.get(user).await?;
        let selected: Vec<_> = cart.into_iter().filter(|line| line.selected).collect();
        if selected.is_empty() {
            return Err(CheckoutError::EmptySelection);
        }

        let mut pending = Vec::with_capacity(selected.len());
        for line in selected {
            let product = self.products.find_by_record(&line.product).await?;
            let (name, price) = match &product {
                Some(p) => (p.name.clone(), p.price),
                None => (String::new(), Decimal::ZERO),
            };
            pending.push(PendingLine {
                product_id: Some(line.product.to_string()),
                name,
                price,
                quantity: line.quantity.max(1),
            });
        }
        Ok(pending)
    }

    /// 3. Validation pass. Re-fetches every product and checks stock; under
    /// `CatalogOnly` pricing, explicit lines are re-priced from the catalog
    /// here as well.
    async fn validate(
        &self,
        pending: Vec<PendingLine>,
        explicit: bool,
    ) -> Result<Vec<ResolvedLine>, CheckoutError> {
        let mut resolved = Vec::with_capacity(pending.len());
        for line in pending {
            let Some(product_id) = line.product_id.as_deref() else {
                return Err(CheckoutError::MissingProductReference);
            };
            let rid = ProductRepository::record_id(product_id)
                .map_err(|_| CheckoutError::ProductNotFound(product_id.to_string()))?;

            let product = self
                .products
                .find_by_record(&rid)
                .await?
                .ok_or_else(|| CheckoutError::ProductNotFound(product_id.to_string()))?;

            if product.stock < line.quantity {
                return Err(CheckoutError::InsufficientStock(product.name));
            }

            let (name, price) = if explicit && self.policy == PricingPolicy::CatalogOnly {
                (product.name.clone(), product.price)
            } else {
                (line.name, line.price)
            };

            resolved.push(ResolvedLine {
                product: rid,
                name,
                price,
                quantity: line.quantity,
            });
        }
        Ok(resolved)
    }

    /// 4. Reservation. Each decrement is atomic on its own document; a line
    /// that loses the race (validated a moment ago, empty now) releases the
    /// lines reserved before it, best-effort, and fails the checkout. A
    /// crash between decrements still leaves earlier ones applied.
    async fn reserve(&self, lines: &[ResolvedLine]) -> Result<(), CheckoutError> {
        for (idx, line) in lines.iter().enumerate() {
            let reserved = self
                .products
                .reserve_stock(&line.product, line.quantity)
                .await?;

            if reserved.is_none() {
                self.release(&lines[..idx]).await;
                tracing::warn!(
                    product = %line.product,
                    quantity = line.quantity,
                    "Stock reservation lost a concurrent race"
                );
                return Err(CheckoutError::InsufficientStock(line.name.clone()));
            }
        }
        Ok(())
    }

    /// Best-effort compensation for a failed multi-line reservation
    async fn release(&self, reserved: &[ResolvedLine]) {
        for line in reserved {
            if let Err(e) = self
                .products
                .release_stock(&line.product, line.quantity)
                .await
            {
                tracing::error!(
                    product = %line.product,
                    quantity = line.quantity,
                    error = %e,
                    "Failed to release reserved stock"
                );
            }
        }
    }
}
