//! # Customer Directory
//!
//! Access to the shop's customer records.
//!
//! The per-customer commission override rides on the customer record. The
//! sale form snapshots it at selection time, so a directory edit mid-sale
//! never changes a draft already on screen.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use tally_core::Customer;

// =============================================================================
// Directory Trait
// =============================================================================

/// Access to customer records.
#[async_trait]
pub trait CustomerDirectory: Send + Sync {
    /// Gets a customer by ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Customer))` - Customer found
    /// * `Ok(None)` - Customer not found
    async fn get(&self, id: &str) -> StoreResult<Option<Customer>>;

    /// Lists active customers sorted by name.
    async fn list_active(&self) -> StoreResult<Vec<Customer>>;

    /// Inserts or replaces a customer record.
    async fn save(&self, customer: &Customer) -> StoreResult<()>;

    /// Soft-deactivates a customer (historical sales keep referencing it).
    async fn deactivate(&self, id: &str) -> StoreResult<()>;
}

// =============================================================================
// In-Memory Implementation
// =============================================================================

/// In-memory customer directory for tests and the demo binary.
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    customers: RwLock<HashMap<String, Customer>>,
}

impl MemoryDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CustomerDirectory for MemoryDirectory {
    async fn get(&self, id: &str) -> StoreResult<Option<Customer>> {
        let customers = self.customers.read().expect("directory lock poisoned");
        Ok(customers.get(id).cloned())
    }

    async fn list_active(&self) -> StoreResult<Vec<Customer>> {
        let customers = self.customers.read().expect("directory lock poisoned");

        let mut active: Vec<Customer> =
            customers.values().filter(|c| c.is_active).cloned().collect();
        active.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(active)
    }

    async fn save(&self, customer: &Customer) -> StoreResult<()> {
        debug!(id = %customer.id, name = %customer.name, "Saving customer");

        let mut customers = self.customers.write().expect("directory lock poisoned");
        customers.insert(customer.id.clone(), customer.clone());
        Ok(())
    }

    async fn deactivate(&self, id: &str) -> StoreResult<()> {
        debug!(id = %id, "Deactivating customer");

        let mut customers = self.customers.write().expect("directory lock poisoned");
        match customers.get_mut(id) {
            Some(customer) => {
                customer.is_active = false;
                customer.updated_at = Utc::now();
                Ok(())
            }
            None => Err(StoreError::not_found("Customer", id)),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn test_customer(id: &str, name: &str, commission_bps: Option<u32>) -> Customer {
        Customer {
            id: id.to_string(),
            name: name.to_string(),
            email: None,
            phone: None,
            tax_id: None,
            address: None,
            city: None,
            region: None,
            postal_code: None,
            commission_override_bps: commission_bps,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_save_then_get() {
        let directory = MemoryDirectory::new();
        directory
            .save(&test_customer("c1", "Ana", Some(750)))
            .await
            .unwrap();

        let found = directory.get("c1").await.unwrap().unwrap();
        assert_eq!(found.name, "Ana");
        assert_eq!(found.commission_override_bps, Some(750));
    }

    #[tokio::test]
    async fn test_list_active_filters_and_sorts() {
        let directory = MemoryDirectory::new();
        directory
            .save(&test_customer("c1", "Marta", None))
            .await
            .unwrap();
        directory
            .save(&test_customer("c2", "Bruno", None))
            .await
            .unwrap();

        let mut retired = test_customer("c3", "Alberto", None);
        retired.is_active = false;
        directory.save(&retired).await.unwrap();

        let active = directory.list_active().await.unwrap();
        let names: Vec<&str> = active.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Bruno", "Marta"]);
    }

    #[tokio::test]
    async fn test_deactivate_missing_customer() {
        let directory = MemoryDirectory::new();
        let err = directory.deactivate("ghost").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }
}
