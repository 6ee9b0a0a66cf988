//! Shopping cart state
//!
//! Session-scoped cart holding product snapshots. The cart is purely
//! client-side until checkout handoff converts it into order lines; no
//! cart record exists on the backend.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

use app_core::catalog::Product;
use app_core::orders::OrderItem;
use app_core::promotions::ProductDiscount;

/// Errors from cart operations
#[derive(Debug, thiserror::Error)]
pub enum CartError {
    /// No cart item with the given id
    #[error("Cart item not found: {0}")]
    NotFound(String),
}

/// Result type for cart operations
pub type Result<T> = std::result::Result<T, CartError>;

/// One line in the cart, with a snapshot of the product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// Cart-line identifier (session-local)
    pub id: String,
    /// Product identifier
    pub product_id: String,
    /// Product name at the time it was added
    pub name: String,
    /// Undiscounted unit price at the time it was added
    pub unit_price: f64,
    /// First product image, if any
    pub image: Option<String>,
    /// Quantity in the cart
    pub quantity: u32,
}

/// Session-scoped shopping cart
pub struct CartState {
    items: Mutex<Vec<CartItem>>,
    next_id: AtomicU64,
}

impl Default for CartState {
    fn default() -> Self {
        Self::new()
    }
}

impl CartState {
    /// Create an empty cart
    pub fn new() -> Self {
        CartState {
            items: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Add a product; adding the same product again merges quantities
    pub fn add_item(&self, product: &Product, quantity: u32) -> CartItem {
        let mut items = self.items.lock();

        if let Some(existing) = items.iter_mut().find(|i| i.product_id == product.id) {
            existing.quantity += quantity;
            return existing.clone();
        }

        let item = CartItem {
            id: format!("cart-{}", self.next_id.fetch_add(1, Ordering::SeqCst)),
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price: product.price,
            image: product.images.first().cloned(),
            quantity,
        };
        items.push(item.clone());
        item
    }

    /// Remove a cart line
    pub fn remove_item(&self, item_id: &str) -> Result<()> {
        let mut items = self.items.lock();
        let before = items.len();
        items.retain(|i| i.id != item_id);

        if items.len() == before {
            return Err(CartError::NotFound(item_id.to_string()));
        }
        Ok(())
    }

    /// Set a line's quantity; zero removes the line
    pub fn update_quantity(&self, item_id: &str, quantity: u32) -> Result<()> {
        if quantity == 0 {
            return self.remove_item(item_id);
        }

        let mut items = self.items.lock();
        let item = items
            .iter_mut()
            .find(|i| i.id == item_id)
            .ok_or_else(|| CartError::NotFound(item_id.to_string()))?;

        item.quantity = quantity;
        Ok(())
    }

    /// Empty the cart
    pub fn clear(&self) {
        self.items.lock().clear();
    }

    /// Snapshot of the current lines
    pub fn items(&self) -> Vec<CartItem> {
        self.items.lock().clone()
    }

    /// Number of units across all lines
    pub fn unit_count(&self) -> u32 {
        self.items.lock().iter().map(|i| i.quantity).sum()
    }

    /// Undiscounted total
    pub fn total(&self) -> f64 {
        self.items
            .lock()
            .iter()
            .map(|i| i.unit_price * i.quantity as f64)
            .sum()
    }

    /// Effective unit price for one line under the given discounts
    fn effective_price(item: &CartItem, discounts: &[ProductDiscount], now: DateTime<Utc>) -> f64 {
        discounts
            .iter()
            .filter(|d| d.product_id == item.product_id && d.applies_at(now))
            .map(|d| d.apply(item.unit_price))
            .fold(item.unit_price, f64::min)
    }

    /// Total with currently applicable discounts applied per line
    pub fn total_with(&self, discounts: &[ProductDiscount], now: DateTime<Utc>) -> f64 {
        self.items
            .lock()
            .iter()
            .map(|i| Self::effective_price(i, discounts, now) * i.quantity as f64)
            .sum()
    }

    /// Convert the cart into order lines for checkout handoff
    ///
    /// Unit prices carry the applicable discounts, so the persisted
    /// order reflects what the shopper was shown.
    pub fn order_items(&self, discounts: &[ProductDiscount], now: DateTime<Utc>) -> Vec<OrderItem> {
        self.items
            .lock()
            .iter()
            .map(|i| OrderItem {
                product_id: i.product_id.clone(),
                name: i.name.clone(),
                unit_price: Self::effective_price(i, discounts, now),
                quantity: i.quantity,
            })
            .collect()
    }
}
