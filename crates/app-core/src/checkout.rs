//! Checkout handoff
//!
//! Converts the cart into a pending order and reserves inventory before
//! handing the shopper to the external payment processor. There is no
//! payment handling here and no locking guarantee: reservations are
//! best-effort RPCs, compensated with releases when a later line fails.

use std::sync::Arc;

use crate::inventory::{InventoryError, InventoryService};
use crate::orders::{Order, OrderError, OrderItem, OrderService};
use store_client::RecordStore;

/// Errors from the checkout handoff
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    /// Checkout started with no items
    #[error("Cart is empty")]
    EmptyCart,

    /// A line could not be covered by available inventory
    #[error("Product unavailable: {product_id}")]
    Unavailable {
        /// The product that could not be reserved
        product_id: String,
    },

    /// Inventory RPC failure
    #[error("Inventory error: {0}")]
    Inventory(#[from] InventoryError),

    /// Order persistence failure
    #[error("Order error: {0}")]
    Order(#[from] OrderError),
}

/// Result type for checkout operations
pub type Result<T> = std::result::Result<T, CheckoutError>;

/// Checkout handoff service
pub struct CheckoutService {
    inventory: InventoryService,
    orders: OrderService,
}

impl CheckoutService {
    /// Create a new checkout service
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        CheckoutService {
            inventory: InventoryService::new(store.clone()),
            orders: OrderService::new(store),
        }
    }

    /// Reserve inventory and persist a pending order
    ///
    /// On any failure, lines reserved so far are released again before
    /// the error is surfaced, so an aborted checkout leaves counts
    /// unchanged.
    pub async fn begin(&self, email: &str, items: Vec<OrderItem>) -> Result<Order> {
        if items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let mut reserved: Vec<&OrderItem> = Vec::with_capacity(items.len());
        for item in &items {
            let available = self
                .inventory
                .check_availability(&item.product_id, item.quantity as i64)
                .await?;

            if !available {
                self.release_all(&reserved).await;
                return Err(CheckoutError::Unavailable {
                    product_id: item.product_id.clone(),
                });
            }

            if let Err(e) = self
                .inventory
                .reserve(&item.product_id, item.quantity as i64)
                .await
            {
                self.release_all(&reserved).await;
                return Err(e.into());
            }

            reserved.push(item);
        }

        match self.orders.submit(email, items.clone()).await {
            Ok(order) => {
                tracing::info!(order_id = %order.id, "Checkout handoff created pending order");
                Ok(order)
            }
            Err(e) => {
                let all: Vec<&OrderItem> = items.iter().collect();
                self.release_all(&all).await;
                Err(e.into())
            }
        }
    }

    async fn release_all(&self, reserved: &[&OrderItem]) {
        for item in reserved {
            if let Err(e) = self
                .inventory
                .release(&item.product_id, item.quantity as i64)
                .await
            {
                tracing::error!(product_id = %item.product_id, error = %e, "Failed to release reservation");
            }
        }
    }
}
