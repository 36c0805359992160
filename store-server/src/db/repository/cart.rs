//! Cart Repository
//!
//! Every mutator here is a single UPSERT/UPDATE/DELETE statement on one cart
//! line document, so concurrent mutations on the same cart are serialized by
//! the storage layer's document atomicity. There is no read-modify-write of a
//! whole cart and no in-process lock.
//!
//! Line documents are keyed `cart_line:<user_key>_<product_key>`, which also
//! enforces "at most one line per (user, product)" structurally.

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::CartLine;
use crate::utils::time::now_rfc3339;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const CART_LINE_TABLE: &str = "cart_line";

#[derive(Clone)]
pub struct CartRepository {
    base: BaseRepository,
}

impl CartRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Deterministic composite key for the (user, product) line
    fn line_key(user: &RecordId, product: &RecordId) -> String {
        format!("{}_{}", user.key(), product.key())
    }

    /// All lines of a user's cart, insertion order.
    ///
    /// A user with no lines gets an empty Vec; reading a cart never creates
    /// anything and never fails on absence.
    pub async fn get(&self, user: &RecordId) -> RepoResult<Vec<CartLine>> {
        let lines: Vec<CartLine> = self
            .base
            .db()
            .query("SELECT * FROM cart_line WHERE user = $user ORDER BY created_at")
            .bind(("user", user.clone()))
            .await?
            .take(0)?;
        Ok(lines)
    }

    /// Add `quantity` of a product to the cart.
    ///
    /// Merges into the existing line when present (quantity is incremented,
    /// floored at 1); otherwise creates the line with `selected = true`.
    /// One UPSERT, atomic at the document level.
    pub async fn add_item(
        &self,
        user: &RecordId,
        product: &RecordId,
        quantity: i64,
    ) -> RepoResult<CartLine> {
        let key = Self::line_key(user, product);
        let mut result = self
            .base
            .db()
            .query(
                r#"UPSERT type::thing('cart_line', $key) SET
                    user = $user,
                    product = $product,
                    quantity = math::max([(quantity ?? 0) + $qty, 1]),
                    selected = selected ?? true,
                    created_at = created_at ?? $now,
                    updated_at = $now
                RETURN AFTER"#,
            )
            .bind(("key", key))
            .bind(("user", user.clone()))
            .bind(("product", product.clone()))
            .bind(("qty", quantity))
            .bind(("now", now_rfc3339()))
            .await?;

        let lines: Vec<CartLine> = result.take(0)?;
        lines
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::Database("Cart upsert returned no record".into()))
    }

    /// Overwrite a line's quantity; `quantity <= 0` removes the line.
    ///
    /// Returns the updated line, or None when the line was removed or never
    /// existed (matching the read-idempotent cart semantics).
    pub async fn set_quantity(
        &self,
        user: &RecordId,
        product: &RecordId,
        quantity: i64,
    ) -> RepoResult<Option<CartLine>> {
        if quantity <= 0 {
            self.remove_item(user, product).await?;
            return Ok(None);
        }

        let key = Self::line_key(user, product);
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE type::thing('cart_line', $key) \
                 SET quantity = $qty, updated_at = $now RETURN AFTER",
            )
            .bind(("key", key))
            .bind(("qty", quantity))
            .bind(("now", now_rfc3339()))
            .await?;

        let lines: Vec<CartLine> = result.take(0)?;
        Ok(lines.into_iter().next())
    }

    /// Remove one product's line from the cart (no-op when absent)
    pub async fn remove_item(&self, user: &RecordId, product: &RecordId) -> RepoResult<()> {
        let key = Self::line_key(user, product);
        let rid = RecordId::from_table_key(CART_LINE_TABLE, key);
        let _removed: Option<CartLine> = self.base.db().delete(rid).await?;
        Ok(())
    }

    /// Flip the `selected` flag on the given products' lines
    pub async fn set_selected(
        &self,
        user: &RecordId,
        products: &[RecordId],
        selected: bool,
    ) -> RepoResult<Vec<CartLine>> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE cart_line SET selected = $selected, updated_at = $now \
                 WHERE user = $user AND product IN $products RETURN AFTER",
            )
            .bind(("selected", selected))
            .bind(("user", user.clone()))
            .bind(("products", products.to_vec()))
            .bind(("now", now_rfc3339()))
            .await?;

        let lines: Vec<CartLine> = result.take(0)?;
        Ok(lines)
    }

    /// Remove the lines for the given products (checkout reconciliation)
    pub async fn remove_products(&self, user: &RecordId, products: &[RecordId]) -> RepoResult<()> {
        self.base
            .db()
            .query("DELETE cart_line WHERE user = $user AND product IN $products")
            .bind(("user", user.clone()))
            .bind(("products", products.to_vec()))
            .await?
            .check()?;
        Ok(())
    }

    /// Empty the user's cart
    pub async fn clear(&self, user: &RecordId) -> RepoResult<()> {
        self.base
            .db()
            .query("DELETE cart_line WHERE user = $user")
            .bind(("user", user.clone()))
            .await?
            .check()?;
        Ok(())
    }
}
