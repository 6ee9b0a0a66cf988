//! Storefront chrome styling
//!
//! Inline-style helpers for layout and chrome components. Each helper
//! reads `base_colors` from the active theme and falls back to the
//! static tokens when no theme is active, so the chrome never renders
//! unstyled.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use app_core::catalog::Product;
use app_core::promotions::ProductDiscount;
use theme_engine::model::{ColorTheme, Gradient};

use crate::tokens::fallback;

fn color_or<'a>(theme: Option<&'a ColorTheme>, key: &str, fallback: &'a str) -> &'a str {
    theme.and_then(|t| t.color(key)).unwrap_or(fallback)
}

/// Page wrapper: background and body text color
pub fn page_style(theme: Option<&ColorTheme>) -> String {
    format!(
        "background-color: {}; color: {};",
        color_or(theme, "background", fallback::BACKGROUND),
        color_or(theme, "text", fallback::TEXT),
    )
}

/// Storefront header bar
pub fn header_style(theme: Option<&ColorTheme>) -> String {
    format!(
        "background-color: {}; color: {};",
        color_or(theme, "primary", fallback::PRIMARY),
        color_or(theme, "background", fallback::BACKGROUND),
    )
}

/// Primary call-to-action button
pub fn primary_button_style(theme: Option<&ColorTheme>) -> String {
    format!(
        "background-color: {}; color: {}; border: none;",
        color_or(theme, "primary", fallback::PRIMARY),
        color_or(theme, "background", fallback::BACKGROUND),
    )
}

/// Secondary button
pub fn secondary_button_style(theme: Option<&ColorTheme>) -> String {
    format!(
        "background-color: transparent; color: {}; border: 1px solid {};",
        color_or(theme, "secondary", fallback::SECONDARY),
        color_or(theme, "secondary", fallback::SECONDARY),
    )
}

/// Product card surface
pub fn card_style(theme: Option<&ColorTheme>) -> String {
    format!(
        "background-color: {}; color: {}; border: 1px solid {};",
        color_or(theme, "background", fallback::BACKGROUND),
        color_or(theme, "text", fallback::TEXT),
        color_or(theme, "accent", fallback::ACCENT),
    )
}

/// Discount badge on a product card
pub fn badge_style(theme: Option<&ColorTheme>) -> String {
    format!(
        "background-color: {}; color: {};",
        color_or(theme, "accent", fallback::ACCENT),
        color_or(theme, "background", fallback::BACKGROUND),
    )
}

/// Serializable view model for a storefront product card
///
/// Handed to the rendering layer as props; prices are pre-formatted and
/// the discount badge is resolved here so the renderer stays dumb.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCard {
    /// Product identifier
    pub product_id: String,
    /// Display name
    pub name: String,
    /// Formatted list price ("$20.00")
    pub price_label: String,
    /// Formatted discounted price, when a discount applies
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sale_price_label: Option<String>,
    /// Discount badge text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
    /// Primary image URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Whether the add-to-cart control is enabled
    pub purchasable: bool,
}

/// Build the card view model for one product
pub fn product_card(
    product: &Product,
    discount: Option<&ProductDiscount>,
    now: DateTime<Utc>,
) -> ProductCard {
    let applied = discount.filter(|d| d.applies_at(now));

    ProductCard {
        product_id: product.id.clone(),
        name: product.name.clone(),
        price_label: format!("${:.2}", product.price),
        sale_price_label: applied.map(|d| format!("${:.2}", d.apply(product.price))),
        badge: applied.and_then(|d| d.label.clone()),
        image: product.images.first().cloned(),
        purchasable: product.status == app_core::catalog::ProductStatus::Active
            && product.inventory_count > 0,
    }
}

/// Render a theme gradient as a CSS `linear-gradient` value
pub fn gradient_css(gradient: &Gradient) -> String {
    let stops: Vec<String> = gradient
        .stops
        .iter()
        .map(|stop| format!("{} {}%", stop.color, stop.position))
        .collect();

    format!("linear-gradient(135deg, {})", stops.join(", "))
}
