//! Order history and management
//!
//! Orders are written once at checkout handoff and then only change
//! status (paid, fulfilled, cancelled). Payment itself is handled by an
//! external processor, never by this application.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use store_client::{Filter, InsertRequest, RecordStore, SelectRequest, UpdateRequest};

/// Collection holding order records
pub const ORDER_COLLECTION: &str = "orders";

/// Errors from order operations
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    /// No order with the given id
    #[error("Order not found: {0}")]
    NotFound(String),

    /// The record store rejected the operation
    #[error("Store error: {0}")]
    Store(#[from] store_client::StoreError),

    /// A record could not be (de)serialized
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type for order operations
pub type Result<T> = std::result::Result<T, OrderError>;

/// Order lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Created at handoff, awaiting payment
    #[default]
    Pending,
    /// Payment confirmed by the processor
    Paid,
    /// Shipped or delivered
    Fulfilled,
    /// Cancelled before fulfilment
    Cancelled,
}

/// One line of an order, with a snapshot of the product at purchase time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Product identifier
    pub product_id: String,
    /// Product name at purchase time
    pub name: String,
    /// Unit price actually charged (after discounts)
    pub unit_price: f64,
    /// Quantity ordered
    pub quantity: u32,
}

impl OrderItem {
    /// Price of this line
    pub fn line_total(&self) -> f64 {
        self.unit_price * self.quantity as f64
    }
}

/// A customer order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Store-assigned identifier
    pub id: String,
    /// Customer email
    pub email: String,
    /// Lifecycle status
    #[serde(default)]
    pub status: OrderStatus,
    /// Order lines
    pub items: Vec<OrderItem>,
    /// Total charged
    pub total: f64,
    /// Creation timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Order service over the hosted record store
pub struct OrderService {
    store: Arc<dyn RecordStore>,
}

impl OrderService {
    /// Create a new order service
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        OrderService { store }
    }

    /// Order history for one customer, newest first
    pub async fn history(&self, email: &str) -> Result<Vec<Order>> {
        let rows = self
            .store
            .select(
                SelectRequest::from(ORDER_COLLECTION)
                    .filter(Filter::eq("email", email))
                    .order_desc("created_at"),
            )
            .await?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            match serde_json::from_value::<Order>(row) {
                Ok(order) => orders.push(order),
                Err(e) => tracing::warn!(error = %e, "Skipping malformed order record"),
            }
        }
        Ok(orders)
    }

    /// All orders, newest first (admin console)
    pub async fn list(&self) -> Result<Vec<Order>> {
        let rows = self
            .store
            .select(SelectRequest::from(ORDER_COLLECTION).order_desc("created_at"))
            .await?;

        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(Into::into))
            .collect()
    }

    /// Fetch a single order
    pub async fn get(&self, id: &str) -> Result<Order> {
        let rows = self
            .store
            .select(
                SelectRequest::from(ORDER_COLLECTION)
                    .filter(Filter::eq("id", id))
                    .limit(1),
            )
            .await?;

        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| OrderError::NotFound(id.to_string()))?;
        Ok(serde_json::from_value(row)?)
    }

    /// Persist a new order (called by checkout handoff)
    pub async fn submit(&self, email: &str, items: Vec<OrderItem>) -> Result<Order> {
        let total: f64 = items.iter().map(OrderItem::line_total).sum();

        let record = serde_json::json!({
            "email": email,
            "status": OrderStatus::Pending,
            "items": items,
            "total": total,
        });

        let row = self
            .store
            .insert(InsertRequest::new(ORDER_COLLECTION, record))
            .await?;
        let order: Order = serde_json::from_value(row)?;

        tracing::info!(order_id = %order.id, email = %order.email, total = order.total, "Order submitted");
        Ok(order)
    }

    /// Change an order's lifecycle status
    pub async fn set_status(&self, id: &str, status: OrderStatus) -> Result<Order> {
        let rows = self
            .store
            .update(
                UpdateRequest::new(
                    ORDER_COLLECTION,
                    serde_json::json!({ "status": status }),
                )
                .filter(Filter::eq("id", id)),
            )
            .await?;

        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| OrderError::NotFound(id.to_string()))?;
        let order: Order = serde_json::from_value(row)?;

        tracing::info!(order_id = %order.id, status = ?order.status, "Order status changed");
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use store_client::MemoryStore;

    fn items() -> Vec<OrderItem> {
        vec![
            OrderItem {
                product_id: "p1".to_string(),
                name: "Mug".to_string(),
                unit_price: 14.5,
                quantity: 2,
            },
            OrderItem {
                product_id: "p2".to_string(),
                name: "Poster".to_string(),
                unit_price: 9.0,
                quantity: 1,
            },
        ]
    }

    fn service() -> OrderService {
        OrderService::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_submit_computes_total() {
        let service = service();

        let order = service.submit("shopper@example.com", items()).await.unwrap();

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total, 38.0);
        assert_eq!(order.items.len(), 2);
    }

    #[tokio::test]
    async fn test_history_scoped_to_email() {
        let service = service();

        service.submit("alice@example.com", items()).await.unwrap();
        service.submit("bob@example.com", items()).await.unwrap();
        service.submit("alice@example.com", items()).await.unwrap();

        let history = service.history("alice@example.com").await.unwrap();
        assert_eq!(history.len(), 2);
        assert!(history.iter().all(|o| o.email == "alice@example.com"));
    }

    #[tokio::test]
    async fn test_set_status() {
        let service = service();

        let order = service.submit("shopper@example.com", items()).await.unwrap();
        let paid = service.set_status(&order.id, OrderStatus::Paid).await.unwrap();

        assert_eq!(paid.status, OrderStatus::Paid);
    }

    #[tokio::test]
    async fn test_get_unknown_order() {
        let service = service();
        assert!(matches!(
            service.get("missing").await.unwrap_err(),
            OrderError::NotFound(_)
        ));
    }
}
