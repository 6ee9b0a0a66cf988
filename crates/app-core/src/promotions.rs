//! Promotions: product discounts and popup campaigns
//!
//! Discounts attach to a product and change its effective price within a
//! date window. Popups are scheduled storefront overlays with frequency
//! and audience gating. Both are managed from the admin console and read
//! by the storefront.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use store_client::{DeleteRequest, Filter, InsertRequest, RecordStore, SelectRequest, UpdateRequest};

/// Collection holding discount records
pub const DISCOUNT_COLLECTION: &str = "product_discounts";

/// Collection holding popup records
pub const POPUP_COLLECTION: &str = "popup_promotions";

/// Errors from promotion operations
#[derive(Debug, thiserror::Error)]
pub enum PromotionError {
    /// Discount value is not usable (negative, or percentage above 100)
    #[error("Invalid discount value: {0}")]
    InvalidValue(f64),

    /// The scheduling window is inverted
    #[error("Promotion ends before it starts")]
    InvertedWindow,

    /// No promotion with the given id
    #[error("Promotion not found: {0}")]
    NotFound(String),

    /// The record store rejected the operation
    #[error("Store error: {0}")]
    Store(#[from] store_client::StoreError),

    /// A record could not be (de)serialized
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type for promotion operations
pub type Result<T> = std::result::Result<T, PromotionError>;

// =============================================================================
// Discounts
// =============================================================================

/// How a discount value is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountKind {
    /// Value is a percentage of the price
    Percentage,
    /// Value is a fixed amount off
    Fixed,
}

/// A discount attached to one product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDiscount {
    /// Store-assigned identifier
    pub id: String,
    /// Product this discount applies to
    pub product_id: String,
    /// Percentage or fixed amount
    #[serde(rename = "discount_type")]
    pub kind: DiscountKind,
    /// Discount magnitude
    #[serde(rename = "discount_value")]
    pub value: f64,
    /// Optional badge label ("Summer sale")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Window start
    pub start_date: DateTime<Utc>,
    /// Window end
    pub end_date: DateTime<Utc>,
    /// Whether the discount is enabled at all
    #[serde(default)]
    pub is_active: bool,
    /// Creation timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl ProductDiscount {
    /// Whether this discount applies at the given instant
    pub fn applies_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.start_date <= now && now <= self.end_date
    }

    /// Apply the discount to a price, flooring at zero
    pub fn apply(&self, price: f64) -> f64 {
        let discounted = match self.kind {
            DiscountKind::Percentage => price * (1.0 - self.value / 100.0),
            DiscountKind::Fixed => price - self.value,
        };
        discounted.max(0.0)
    }
}

/// A discount being created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDiscount {
    /// Product this discount applies to
    pub product_id: String,
    /// Percentage or fixed amount
    #[serde(rename = "discount_type")]
    pub kind: DiscountKind,
    /// Discount magnitude
    #[serde(rename = "discount_value")]
    pub value: f64,
    /// Optional badge label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Window start
    pub start_date: DateTime<Utc>,
    /// Window end
    pub end_date: DateTime<Utc>,
    /// Whether the discount is enabled
    #[serde(default)]
    pub is_active: bool,
}

// =============================================================================
// Popups
// =============================================================================

/// How often a popup may be shown to the same visitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PopupFrequency {
    /// At most once per browsing session
    OncePerSession,
    /// At most once per day
    Daily,
    /// On every visit
    EveryVisit,
}

/// Which visitors a popup targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetAudience {
    /// Everyone
    All,
    /// First-time visitors only
    NewVisitors,
    /// Returning customers only
    ReturningCustomers,
}

/// Where the popup is anchored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PopupPosition {
    /// Centered overlay
    Center,
    /// Banner at the top
    Top,
    /// Banner at the bottom
    Bottom,
}

/// A scheduled popup campaign
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopupPromotion {
    /// Store-assigned identifier
    pub id: String,
    /// Headline
    pub title: String,
    /// Body text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Illustration URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Window start
    pub start_date: DateTime<Utc>,
    /// Window end
    pub end_date: DateTime<Utc>,
    /// Display frequency gate
    pub frequency: PopupFrequency,
    /// Audience gate
    pub target_audience: TargetAudience,
    /// Anchor position
    pub position: PopupPosition,
    /// Delay before showing, in milliseconds
    #[serde(default)]
    pub display_delay: u32,
    /// Call-to-action label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cta_text: Option<String>,
    /// Call-to-action link
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cta_link: Option<String>,
    /// Opaque styling blob consumed by the renderer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styling: Option<Value>,
    /// Whether the popup is enabled
    #[serde(default)]
    pub is_active: bool,
    /// Creation timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl PopupPromotion {
    /// Frequency/schedule gate for one visitor
    ///
    /// `last_shown` is when this visitor last saw the popup (any
    /// session); `seen_this_session` covers the current session only.
    pub fn should_display(
        &self,
        now: DateTime<Utc>,
        last_shown: Option<DateTime<Utc>>,
        seen_this_session: bool,
    ) -> bool {
        if !self.is_active || now < self.start_date || now > self.end_date {
            return false;
        }

        match self.frequency {
            PopupFrequency::EveryVisit => true,
            PopupFrequency::OncePerSession => !seen_this_session,
            PopupFrequency::Daily => last_shown
                .map(|shown| now - shown >= Duration::days(1))
                .unwrap_or(true),
        }
    }
}

/// A popup being created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPopup {
    /// Headline
    pub title: String,
    /// Body text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Illustration URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Window start
    pub start_date: DateTime<Utc>,
    /// Window end
    pub end_date: DateTime<Utc>,
    /// Display frequency gate
    pub frequency: PopupFrequency,
    /// Audience gate
    pub target_audience: TargetAudience,
    /// Anchor position
    pub position: PopupPosition,
    /// Delay before showing, in milliseconds
    #[serde(default)]
    pub display_delay: u32,
    /// Call-to-action label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cta_text: Option<String>,
    /// Call-to-action link
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cta_link: Option<String>,
    /// Opaque styling blob
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styling: Option<Value>,
    /// Whether the popup is enabled
    #[serde(default)]
    pub is_active: bool,
}

// =============================================================================
// Service
// =============================================================================

fn check_window(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<()> {
    if end < start {
        return Err(PromotionError::InvertedWindow);
    }
    Ok(())
}

fn check_discount_value(kind: DiscountKind, value: f64) -> Result<()> {
    let valid = match kind {
        DiscountKind::Percentage => (0.0..=100.0).contains(&value),
        DiscountKind::Fixed => value >= 0.0,
    };
    if !valid {
        return Err(PromotionError::InvalidValue(value));
    }
    Ok(())
}

/// Promotion management service
pub struct PromotionService {
    store: Arc<dyn RecordStore>,
}

impl PromotionService {
    /// Create a new promotion service
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        PromotionService { store }
    }

    /// List all discounts
    pub async fn list_discounts(&self) -> Result<Vec<ProductDiscount>> {
        let rows = self.store.select(SelectRequest::from(DISCOUNT_COLLECTION)).await?;

        let mut discounts = Vec::with_capacity(rows.len());
        for row in rows {
            match serde_json::from_value::<ProductDiscount>(row) {
                Ok(discount) => discounts.push(discount),
                Err(e) => tracing::warn!(error = %e, "Skipping malformed discount record"),
            }
        }
        Ok(discounts)
    }

    /// Validate and persist a new discount
    pub async fn create_discount(&self, discount: &NewDiscount) -> Result<ProductDiscount> {
        check_window(discount.start_date, discount.end_date)?;
        check_discount_value(discount.kind, discount.value)?;

        let row = self
            .store
            .insert(InsertRequest::new(
                DISCOUNT_COLLECTION,
                serde_json::to_value(discount)?,
            ))
            .await?;
        let created: ProductDiscount = serde_json::from_value(row)?;

        tracing::info!(discount_id = %created.id, product_id = %created.product_id, "Discount created");
        Ok(created)
    }

    /// Update a discount in place (provided columns overwrite)
    pub async fn update_discount(&self, id: &str, changes: Value) -> Result<ProductDiscount> {
        let rows = self
            .store
            .update(UpdateRequest::new(DISCOUNT_COLLECTION, changes).filter(Filter::eq("id", id)))
            .await?;

        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| PromotionError::NotFound(id.to_string()))?;
        Ok(serde_json::from_value(row)?)
    }

    /// Delete a discount
    pub async fn delete_discount(&self, id: &str) -> Result<()> {
        let removed = self
            .store
            .delete(DeleteRequest::new(DISCOUNT_COLLECTION).filter(Filter::eq("id", id)))
            .await?;

        if removed == 0 {
            return Err(PromotionError::NotFound(id.to_string()));
        }
        Ok(())
    }

    /// The discount currently applying to a product, if any
    ///
    /// When several overlap, the one with the greatest saving on the
    /// given price wins.
    pub async fn discount_for(
        &self,
        product_id: &str,
        price: f64,
        now: DateTime<Utc>,
    ) -> Result<Option<ProductDiscount>> {
        let rows = self
            .store
            .select(
                SelectRequest::from(DISCOUNT_COLLECTION)
                    .filter(Filter::eq("product_id", product_id)),
            )
            .await?;

        let mut best: Option<ProductDiscount> = None;
        for row in rows {
            let discount: ProductDiscount = match serde_json::from_value(row) {
                Ok(d) => d,
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping malformed discount record");
                    continue;
                }
            };

            if !discount.applies_at(now) {
                continue;
            }

            let better = match &best {
                Some(current) => discount.apply(price) < current.apply(price),
                None => true,
            };
            if better {
                best = Some(discount);
            }
        }

        Ok(best)
    }

    /// List all popups
    pub async fn list_popups(&self) -> Result<Vec<PopupPromotion>> {
        let rows = self.store.select(SelectRequest::from(POPUP_COLLECTION)).await?;

        let mut popups = Vec::with_capacity(rows.len());
        for row in rows {
            match serde_json::from_value::<PopupPromotion>(row) {
                Ok(popup) => popups.push(popup),
                Err(e) => tracing::warn!(error = %e, "Skipping malformed popup record"),
            }
        }
        Ok(popups)
    }

    /// Popups eligible to display right now (before per-visitor gating)
    pub async fn active_popups(&self, now: DateTime<Utc>) -> Result<Vec<PopupPromotion>> {
        let popups = self.list_popups().await?;
        Ok(popups
            .into_iter()
            .filter(|p| p.is_active && p.start_date <= now && now <= p.end_date)
            .collect())
    }

    /// Validate and persist a new popup
    pub async fn create_popup(&self, popup: &NewPopup) -> Result<PopupPromotion> {
        check_window(popup.start_date, popup.end_date)?;

        let row = self
            .store
            .insert(InsertRequest::new(
                POPUP_COLLECTION,
                serde_json::to_value(popup)?,
            ))
            .await?;
        let created: PopupPromotion = serde_json::from_value(row)?;

        tracing::info!(popup_id = %created.id, title = %created.title, "Popup created");
        Ok(created)
    }

    /// Update a popup in place (provided columns overwrite)
    pub async fn update_popup(&self, id: &str, changes: Value) -> Result<PopupPromotion> {
        let rows = self
            .store
            .update(UpdateRequest::new(POPUP_COLLECTION, changes).filter(Filter::eq("id", id)))
            .await?;

        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| PromotionError::NotFound(id.to_string()))?;
        Ok(serde_json::from_value(row)?)
    }

    /// Delete a popup
    pub async fn delete_popup(&self, id: &str) -> Result<()> {
        let removed = self
            .store
            .delete(DeleteRequest::new(POPUP_COLLECTION).filter(Filter::eq("id", id)))
            .await?;

        if removed == 0 {
            return Err(PromotionError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use store_client::MemoryStore;

    fn window() -> (DateTime<Utc>, DateTime<Utc>, DateTime<Utc>) {
        let start = "2025-06-01T00:00:00Z".parse().unwrap();
        let end = "2025-06-30T00:00:00Z".parse().unwrap();
        let mid = "2025-06-15T12:00:00Z".parse().unwrap();
        (start, end, mid)
    }

    fn discount(kind: DiscountKind, value: f64) -> NewDiscount {
        let (start, end, _) = window();
        NewDiscount {
            product_id: "p1".to_string(),
            kind,
            value,
            label: Some("Sale".to_string()),
            start_date: start,
            end_date: end,
            is_active: true,
        }
    }

    fn popup(frequency: PopupFrequency) -> NewPopup {
        let (start, end, _) = window();
        NewPopup {
            title: "June deals".to_string(),
            description: None,
            image_url: None,
            start_date: start,
            end_date: end,
            frequency,
            target_audience: TargetAudience::All,
            position: PopupPosition::Center,
            display_delay: 500,
            cta_text: Some("Shop now".to_string()),
            cta_link: Some("/store".to_string()),
            styling: None,
            is_active: true,
        }
    }

    fn service() -> PromotionService {
        PromotionService::new(Arc::new(MemoryStore::new()))
    }

    // ==========================================================================
    // Discount Math Tests
    // ==========================================================================

    #[tokio::test]
    async fn test_percentage_discount() {
        let service = service();
        let created = service
            .create_discount(&discount(DiscountKind::Percentage, 25.0))
            .await
            .unwrap();

        assert_eq!(created.apply(40.0), 30.0);
    }

    #[tokio::test]
    async fn test_fixed_discount_floors_at_zero() {
        let service = service();
        let created = service
            .create_discount(&discount(DiscountKind::Fixed, 10.0))
            .await
            .unwrap();

        assert_eq!(created.apply(15.0), 5.0);
        assert_eq!(created.apply(7.5), 0.0); // Never negative
    }

    #[tokio::test]
    async fn test_discount_window_gating() {
        let service = service();
        let created = service
            .create_discount(&discount(DiscountKind::Fixed, 2.0))
            .await
            .unwrap();

        let (_start, end, mid) = window();
        assert!(created.applies_at(mid));
        assert!(!created.applies_at(end + Duration::days(1)));
    }

    #[tokio::test]
    async fn test_create_rejects_bad_value() {
        let service = service();

        let err = service
            .create_discount(&discount(DiscountKind::Percentage, 120.0))
            .await
            .unwrap_err();
        assert!(matches!(err, PromotionError::InvalidValue(_)));

        let err = service
            .create_discount(&discount(DiscountKind::Fixed, -5.0))
            .await
            .unwrap_err();
        assert!(matches!(err, PromotionError::InvalidValue(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_inverted_window() {
        let service = service();

        let mut bad = discount(DiscountKind::Fixed, 1.0);
        std::mem::swap(&mut bad.start_date, &mut bad.end_date);

        let err = service.create_discount(&bad).await.unwrap_err();
        assert!(matches!(err, PromotionError::InvertedWindow));
    }

    #[tokio::test]
    async fn test_discount_for_picks_best_saving() {
        let service = service();
        let (_, _, mid) = window();

        service
            .create_discount(&discount(DiscountKind::Percentage, 10.0))
            .await
            .unwrap();
        service
            .create_discount(&discount(DiscountKind::Fixed, 8.0))
            .await
            .unwrap();

        // On a $40 price: 10% saves $4, fixed saves $8
        let best = service.discount_for("p1", 40.0, mid).await.unwrap().unwrap();
        assert_eq!(best.kind, DiscountKind::Fixed);

        // On a $200 price: 10% saves $20, fixed saves $8
        let best = service.discount_for("p1", 200.0, mid).await.unwrap().unwrap();
        assert_eq!(best.kind, DiscountKind::Percentage);
    }

    #[tokio::test]
    async fn test_discount_for_ignores_inactive() {
        let service = service();
        let (_, _, mid) = window();

        let mut inactive = discount(DiscountKind::Fixed, 5.0);
        inactive.is_active = false;
        service.create_discount(&inactive).await.unwrap();

        assert!(service.discount_for("p1", 40.0, mid).await.unwrap().is_none());
    }

    // ==========================================================================
    // Popup Gating Tests
    // ==========================================================================

    #[tokio::test]
    async fn test_popup_every_visit() {
        let service = service();
        let (_, _, mid) = window();

        let popup = service.create_popup(&popup(PopupFrequency::EveryVisit)).await.unwrap();
        assert!(popup.should_display(mid, Some(mid), true));
    }

    #[tokio::test]
    async fn test_popup_once_per_session() {
        let service = service();
        let (_, _, mid) = window();

        let popup = service
            .create_popup(&popup(PopupFrequency::OncePerSession))
            .await
            .unwrap();

        assert!(popup.should_display(mid, None, false));
        assert!(!popup.should_display(mid, None, true));
    }

    #[tokio::test]
    async fn test_popup_daily() {
        let service = service();
        let (_, _, mid) = window();

        let popup = service.create_popup(&popup(PopupFrequency::Daily)).await.unwrap();

        assert!(popup.should_display(mid, None, false));
        assert!(!popup.should_display(mid, Some(mid - Duration::hours(6)), false));
        assert!(popup.should_display(mid, Some(mid - Duration::days(2)), false));
    }

    #[tokio::test]
    async fn test_popup_outside_window_never_displays() {
        let service = service();
        let (start, _, _) = window();

        let popup = service.create_popup(&popup(PopupFrequency::EveryVisit)).await.unwrap();
        assert!(!popup.should_display(start - Duration::days(1), None, false));
    }

    #[tokio::test]
    async fn test_active_popups_filters_schedule() {
        let service = service();
        let (start, _, mid) = window();

        service.create_popup(&popup(PopupFrequency::Daily)).await.unwrap();

        let mut disabled = popup(PopupFrequency::Daily);
        disabled.is_active = false;
        service.create_popup(&disabled).await.unwrap();

        assert_eq!(service.active_popups(mid).await.unwrap().len(), 1);
        assert_eq!(
            service
                .active_popups(start - Duration::days(1))
                .await
                .unwrap()
                .len(),
            0
        );
    }

    // ==========================================================================
    // CRUD Tests
    // ==========================================================================

    #[tokio::test]
    async fn test_update_and_delete_discount() {
        let service = service();

        let created = service
            .create_discount(&discount(DiscountKind::Fixed, 3.0))
            .await
            .unwrap();

        let updated = service
            .update_discount(&created.id, json!({ "discount_value": 4.5 }))
            .await
            .unwrap();
        assert_eq!(updated.value, 4.5);

        service.delete_discount(&created.id).await.unwrap();
        assert!(matches!(
            service.delete_discount(&created.id).await.unwrap_err(),
            PromotionError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_list_popups() {
        let service = service();

        service.create_popup(&popup(PopupFrequency::Daily)).await.unwrap();
        service.create_popup(&popup(PopupFrequency::EveryVisit)).await.unwrap();

        assert_eq!(service.list_popups().await.unwrap().len(), 2);
    }
}
