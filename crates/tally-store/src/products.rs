//! # Product Catalog
//!
//! Access to the shop's product records.
//!
//! ## Key Operations
//! - Lookup by ID (the sale form's add-item path)
//! - Active listing for the catalog screen
//! - Upsert, soft-deactivation, stock adjustment
//!
//! The per-product shipping override rides on the product record; the
//! calculators never reach into storage for it, they read the snapshot on
//! the line item.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use tally_core::Product;

// =============================================================================
// Catalog Trait
// =============================================================================

/// Access to product records.
///
/// ## Usage
/// ```rust,ignore
/// let product = catalog
///     .get("uuid-here")
///     .await?
///     .ok_or_else(|| StoreError::not_found("Product", "uuid-here"))?;
/// ```
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    async fn get(&self, id: &str) -> StoreResult<Option<Product>>;

    /// Lists active products sorted by name.
    async fn list_active(&self) -> StoreResult<Vec<Product>>;

    /// Inserts or replaces a product record.
    async fn save(&self, product: &Product) -> StoreResult<()>;

    /// Soft-deactivates a product.
    ///
    /// ## Why Soft Deactivation?
    /// - Historical sales still reference this product
    /// - Can be restored if deactivated by mistake
    async fn deactivate(&self, id: &str) -> StoreResult<()>;

    /// Adjusts stock by a delta (negative for sales, positive for restocking).
    ///
    /// ## Delta Pattern
    /// ```text
    /// ❌ WRONG: absolute update (last writer wins across terminals)
    ///    stock = 7
    ///
    /// ✅ CORRECT: delta update (adjustments compose)
    ///    stock = stock - 3
    /// ```
    async fn adjust_stock(&self, id: &str, delta: i64) -> StoreResult<()>;
}

// =============================================================================
// In-Memory Implementation
// =============================================================================

/// In-memory product catalog for tests and the demo binary.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    products: RwLock<HashMap<String, Product>>,
}

impl MemoryCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductCatalog for MemoryCatalog {
    async fn get(&self, id: &str) -> StoreResult<Option<Product>> {
        let products = self.products.read().expect("catalog lock poisoned");
        Ok(products.get(id).cloned())
    }

    async fn list_active(&self) -> StoreResult<Vec<Product>> {
        let products = self.products.read().expect("catalog lock poisoned");

        let mut active: Vec<Product> = products.values().filter(|p| p.is_active).cloned().collect();
        active.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(active)
    }

    async fn save(&self, product: &Product) -> StoreResult<()> {
        debug!(id = %product.id, name = %product.name, "Saving product");

        let mut products = self.products.write().expect("catalog lock poisoned");
        products.insert(product.id.clone(), product.clone());
        Ok(())
    }

    async fn deactivate(&self, id: &str) -> StoreResult<()> {
        debug!(id = %id, "Deactivating product");

        let mut products = self.products.write().expect("catalog lock poisoned");
        match products.get_mut(id) {
            Some(product) => {
                product.is_active = false;
                product.updated_at = Utc::now();
                Ok(())
            }
            None => Err(StoreError::not_found("Product", id)),
        }
    }

    async fn adjust_stock(&self, id: &str, delta: i64) -> StoreResult<()> {
        debug!(id = %id, delta = %delta, "Adjusting stock");

        let mut products = self.products.write().expect("catalog lock poisoned");
        match products.get_mut(id) {
            Some(product) => {
                product.stock_on_hand += delta;
                product.updated_at = Utc::now();
                Ok(())
            }
            None => Err(StoreError::not_found("Product", id)),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
