//! Product Repository
//!
//! Catalog CRUD plus the one operation that must be atomic at the storage
//! layer: stock reservation. `reserve_stock` is a single conditional
//! decrement statement, so two concurrent checkouts racing for the last
//! unit cannot both succeed.

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::{Product, ProductCreate, ProductUpdate};
use crate::utils::time::now_rfc3339;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const PRODUCT_TABLE: &str = "product";

#[derive(Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Parse an external product id string
    pub fn record_id(id: &str) -> RepoResult<RecordId> {
        parse_record_id(PRODUCT_TABLE, id)
    }

    /// Find all products, newest first
    pub async fn find_all(&self) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT * FROM product ORDER BY created_at DESC")
            .await?
            .take(0)?;
        Ok(products)
    }

    /// Find products in a category, newest first
    pub async fn find_by_category(&self, category: &str) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT * FROM product WHERE category = $category ORDER BY created_at DESC")
            .bind(("category", category.to_string()))
            .await?
            .take(0)?;
        Ok(products)
    }

    /// Find product by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Product>> {
        let rid = Self::record_id(id)?;
        self.find_by_record(&rid).await
    }

    /// Find product by record id
    pub async fn find_by_record(&self, rid: &RecordId) -> RepoResult<Option<Product>> {
        let product: Option<Product> = self.base.db().select(rid.clone()).await?;
        Ok(product)
    }

    /// Find product by exact name (duplicate check)
    pub async fn find_by_name(&self, name: &str) -> RepoResult<Option<Product>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM product WHERE name = $name LIMIT 1")
            .bind(("name", name.to_string()))
            .await?;
        let products: Vec<Product> = result.take(0)?;
        Ok(products.into_iter().next())
    }

    /// Create a new product
    pub async fn create(&self, data: ProductCreate) -> RepoResult<Product> {
        if data.price.is_sign_negative() {
            return Err(RepoError::Validation("price must not be negative".into()));
        }
        if data.stock.is_some_and(|s| s < 0) {
            return Err(RepoError::Validation("stock must not be negative".into()));
        }
        if self.find_by_name(&data.name).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Product '{}' already exists",
                data.name
            )));
        }

        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE product SET
                    name = $name,
                    price = $price,
                    description = $description,
                    stock = $stock,
                    category = $category,
                    image = $image,
                    created_at = $now,
                    updated_at = $now
                RETURN AFTER"#,
            )
            .bind(("name", data.name))
            .bind(("price", data.price))
            .bind(("description", data.description.unwrap_or_default()))
            .bind(("stock", data.stock.unwrap_or(0)))
            .bind(("category", data.category))
            .bind(("image", data.image.unwrap_or_default()))
            .bind(("now", now_rfc3339()))
            .await?;

        let products: Vec<Product> = result.take(0)?;
        products
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::Database("Product creation returned no record".into()))
    }

    /// Update a product (partial merge)
    pub async fn update(&self, id: &str, data: ProductUpdate) -> RepoResult<Product> {
        if data.price.is_some_and(|p| p.is_sign_negative()) {
            return Err(RepoError::Validation("price must not be negative".into()));
        }
        if data.stock.is_some_and(|s| s < 0) {
            return Err(RepoError::Validation("stock must not be negative".into()));
        }

        let rid = Self::record_id(id)?;

        // MERGE object: only the supplied fields, plus the touched timestamp
        let mut merge = serde_json::to_value(&data)
            .map_err(|e| RepoError::Database(format!("Failed to serialize update: {e}")))?;
        merge["updated_at"] = serde_json::Value::String(now_rfc3339());

        let mut result = self
            .base
            .db()
            .query("UPDATE $id MERGE $data RETURN AFTER")
            .bind(("id", rid))
            .bind(("data", merge))
            .await?;

        let products: Vec<Product> = result.take(0)?;
        products
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Product {id} not found")))
    }

    /// Delete a product
    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let rid = Self::record_id(id)?;
        let deleted: Option<Product> = self.base.db().delete(rid).await?;
        Ok(deleted.is_some())
    }

    /// Atomically reserve `quantity` units of stock.
    ///
    /// Single conditional decrement at the storage layer; the WHERE clause
    /// makes it impossible for stock to go negative under concurrent
    /// checkouts. Returns the updated product, or None when the product is
    /// missing or has fewer than `quantity` units left.
    pub async fn reserve_stock(
        &self,
        rid: &RecordId,
        quantity: i64,
    ) -> RepoResult<Option<Product>> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $id SET stock -= $qty, updated_at = $now \
                 WHERE stock >= $qty RETURN AFTER",
            )
            .bind(("id", rid.clone()))
            .bind(("qty", quantity))
            .bind(("now", now_rfc3339()))
            .await?;

        let products: Vec<Product> = result.take(0)?;
        Ok(products.into_iter().next())
    }

    /// Return previously reserved units (compensation for a failed multi-line
    /// reservation). Missing product is reported, not an error.
    pub async fn release_stock(&self, rid: &RecordId, quantity: i64) -> RepoResult<bool> {
        let mut result = self
            .base
            .db()
            .query("UPDATE $id SET stock += $qty, updated_at = $now RETURN AFTER")
            .bind(("id", rid.clone()))
            .bind(("qty", quantity))
            .bind(("now", now_rfc3339()))
            .await?;

        let products: Vec<Product> = result.take(0)?;
        Ok(!products.is_empty())
    }
}
