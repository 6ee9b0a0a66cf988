//! Inventory operations
//!
//! Availability checks and the reserve/release/adjust remote procedures.
//! Per the storefront's contract there are no locking guarantees here;
//! the backend procedures are best-effort and the checkout path
//! compensates when a reservation fails.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::catalog::Product;
use store_client::{Filter, RecordStore, SelectRequest};

use crate::catalog::PRODUCT_COLLECTION;

/// Errors from inventory operations
#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    /// No product with the given id
    #[error("Product not found: {0}")]
    NotFound(String),

    /// The record store rejected the operation
    #[error("Store error: {0}")]
    Store(#[from] store_client::StoreError),

    /// A record could not be deserialized
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type for inventory operations
pub type Result<T> = std::result::Result<T, InventoryError>;

/// What to do when a product's count reaches zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InventoryPolicy {
    /// Refuse orders beyond the available count
    #[default]
    Deny,
    /// Keep selling regardless of count
    Continue,
}

/// Inventory service over the product collection
pub struct InventoryService {
    store: Arc<dyn RecordStore>,
}

impl InventoryService {
    /// Create a new inventory service
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        InventoryService { store }
    }

    /// Check whether `quantity` units of a product can be ordered
    pub async fn check_availability(&self, product_id: &str, quantity: i64) -> Result<bool> {
        let rows = self
            .store
            .select(
                SelectRequest::from(PRODUCT_COLLECTION)
                    .filter(Filter::eq("id", product_id))
                    .limit(1),
            )
            .await?;

        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| InventoryError::NotFound(product_id.to_string()))?;

        let policy = row
            .get("inventory_policy")
            .cloned()
            .map(serde_json::from_value::<InventoryPolicy>)
            .transpose()?
            .unwrap_or_default();

        if policy == InventoryPolicy::Continue {
            return Ok(true);
        }

        let available = row
            .get("inventory_count")
            .and_then(Value::as_i64)
            .unwrap_or(0);

        Ok(available >= quantity)
    }

    /// Reserve units for a pending order
    pub async fn reserve(&self, product_id: &str, quantity: i64) -> Result<()> {
        self.store
            .rpc(
                "reserve_inventory",
                json!({ "p_product_id": product_id, "p_quantity": quantity }),
            )
            .await?;

        tracing::info!(product_id, quantity, "Inventory reserved");
        Ok(())
    }

    /// Release previously reserved units
    pub async fn release(&self, product_id: &str, quantity: i64) -> Result<()> {
        self.store
            .rpc(
                "release_inventory",
                json!({ "p_product_id": product_id, "p_quantity": quantity }),
            )
            .await?;

        tracing::info!(product_id, quantity, "Inventory released");
        Ok(())
    }

    /// Apply a manual adjustment with an audit reason
    pub async fn adjust(&self, product_id: &str, adjustment: i64, reason: &str) -> Result<()> {
        self.store
            .rpc(
                "adjust_inventory",
                json!({
                    "p_product_id": product_id,
                    "p_adjustment": adjustment,
                    "p_reason": reason,
                }),
            )
            .await?;

        tracing::info!(product_id, adjustment, reason, "Inventory adjusted");
        Ok(())
    }

    /// Products whose count fell under the given threshold
    pub async fn low_stock(&self, threshold: i64) -> Result<Vec<Product>> {
        let rows = self
            .store
            .select(
                SelectRequest::from(PRODUCT_COLLECTION)
                    .filter(Filter::lt("inventory_count", threshold)),
            )
            .await?;

        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(Into::into))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use store_client::MemoryStore;

    fn seeded() -> (Arc<MemoryStore>, InventoryService) {
        let store = Arc::new(MemoryStore::new());
        store.seed(
            PRODUCT_COLLECTION,
            vec![
                json!({
                    "id": "p1", "name": "Mug", "price": 14.5,
                    "inventory_count": 5, "category": "mugs", "status": "active"
                }),
                json!({
                    "id": "p2", "name": "Poster", "price": 9.0,
                    "inventory_count": 0, "inventory_policy": "continue",
                    "category": "prints", "status": "active"
                }),
            ],
        );

        let service = InventoryService::new(store.clone());
        (store, service)
    }

    #[tokio::test]
    async fn test_availability_deny_policy() {
        let (_store, service) = seeded();

        assert!(service.check_availability("p1", 5).await.unwrap());
        assert!(!service.check_availability("p1", 6).await.unwrap());
    }

    #[tokio::test]
    async fn test_availability_continue_policy() {
        let (_store, service) = seeded();

        // Zero on hand, but the product keeps selling
        assert!(service.check_availability("p2", 100).await.unwrap());
    }

    #[tokio::test]
    async fn test_availability_unknown_product() {
        let (_store, service) = seeded();

        assert!(matches!(
            service.check_availability("nope", 1).await.unwrap_err(),
            InventoryError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_reserve_then_release_round_trip() {
        let (_store, service) = seeded();

        service.reserve("p1", 3).await.unwrap();
        assert!(!service.check_availability("p1", 3).await.unwrap());

        service.release("p1", 3).await.unwrap();
        assert!(service.check_availability("p1", 5).await.unwrap());
    }

    #[tokio::test]
    async fn test_low_stock() {
        let (_store, service) = seeded();

        let low = service.low_stock(3).await.unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].id, "p2");
    }
}
