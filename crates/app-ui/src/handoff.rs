//! Checkout handoff link
//!
//! After the pending order is persisted, the shopper is redirected to
//! the external payment processor with the order reference and a
//! human-readable summary in the query string.

use app_core::orders::Order;

/// Build the processor redirect URL for a pending order
pub fn handoff_url(processor_base: &str, order: &Order) -> String {
    let summary = order
        .items
        .iter()
        .map(|item| format!("{}x {}", item.quantity, item.name))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "{}?order={}&total={:.2}&summary={}",
        processor_base.trim_end_matches('/'),
        urlencoding::encode(&order.id),
        order.total,
        urlencoding::encode(&summary),
    )
}
