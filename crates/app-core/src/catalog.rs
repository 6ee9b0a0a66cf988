//! Product catalog management
//!
//! CRUD over the `products` collection for the admin console, plus the
//! listing the storefront renders. Field validation happens here so the
//! store never receives a product without a name or with a negative
//! price.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::OnceLock;

use store_client::{DeleteRequest, Filter, InsertRequest, RecordStore, SelectRequest, UpdateRequest};

/// Collection holding product records
pub const PRODUCT_COLLECTION: &str = "products";

/// Errors from catalog operations
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Product name is empty
    #[error("Product name is required")]
    EmptyName,

    /// Price is negative
    #[error("Price must not be negative: {0}")]
    NegativePrice(f64),

    /// SKU does not match the expected format
    #[error("Invalid SKU: {0}")]
    InvalidSku(String),

    /// No product with the given id
    #[error("Product not found: {0}")]
    NotFound(String),

    /// The record store rejected the operation
    #[error("Store error: {0}")]
    Store(#[from] store_client::StoreError),

    /// A record could not be (de)serialized
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Product lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    /// Visible and purchasable
    #[default]
    Active,
    /// Hidden from the storefront
    Archived,
    /// Visible but not purchasable
    OutOfStock,
}

/// A catalog product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Store-assigned identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Long-form description
    #[serde(default)]
    pub description: String,
    /// Unit price
    pub price: f64,
    /// Optional stock-keeping unit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    /// Units on hand
    #[serde(default)]
    pub inventory_count: i64,
    /// Category slug
    #[serde(default)]
    pub category: String,
    /// Lifecycle status
    #[serde(default)]
    pub status: ProductStatus,
    /// Image URLs
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    /// Free-form tags
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// SEO title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_title: Option<String>,
    /// SEO description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,
    /// Creation timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A product being created
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    /// Display name
    pub name: String,
    /// Long-form description
    #[serde(default)]
    pub description: String,
    /// Unit price
    pub price: f64,
    /// Optional stock-keeping unit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    /// Initial units on hand
    #[serde(default)]
    pub inventory_count: i64,
    /// Category slug
    #[serde(default)]
    pub category: String,
    /// Lifecycle status
    #[serde(default)]
    pub status: ProductStatus,
    /// Image URLs
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    /// Free-form tags
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// SEO title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_title: Option<String>,
    /// SEO description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,
}

/// A partial product update; provided fields overwrite
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductPatch {
    /// New name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New price
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// New SKU
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    /// New inventory count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inventory_count: Option<i64>,
    /// New category
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// New status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ProductStatus>,
    /// New image list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    /// New tag list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// New SEO title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_title: Option<String>,
    /// New SEO description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,
}

/// Check a SKU against the accepted format: uppercase alphanumerics and
/// dashes, starting with a letter or digit
pub fn is_valid_sku(sku: &str) -> bool {
    static SKU_REGEX: OnceLock<Regex> = OnceLock::new();

    SKU_REGEX
        .get_or_init(|| Regex::new(r"^[A-Z0-9][A-Z0-9-]{0,31}$").unwrap())
        .is_match(sku)
}

fn validate_fields(name: &str, price: f64, sku: Option<&str>) -> Result<()> {
    if name.trim().is_empty() {
        return Err(CatalogError::EmptyName);
    }
    if price < 0.0 {
        return Err(CatalogError::NegativePrice(price));
    }
    if let Some(sku) = sku {
        if !is_valid_sku(sku) {
            return Err(CatalogError::InvalidSku(sku.to_string()));
        }
    }
    Ok(())
}

/// Product catalog service
pub struct ProductService {
    store: Arc<dyn RecordStore>,
}

impl ProductService {
    /// Create a new product service
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        ProductService { store }
    }

    /// List all products, newest first
    pub async fn list(&self) -> Result<Vec<Product>> {
        let rows = self
            .store
            .select(SelectRequest::from(PRODUCT_COLLECTION).order_desc("created_at"))
            .await?;

        let mut products = Vec::with_capacity(rows.len());
        for row in rows {
            match serde_json::from_value::<Product>(row) {
                Ok(product) => products.push(product),
                Err(e) => tracing::warn!(error = %e, "Skipping malformed product record"),
            }
        }

        Ok(products)
    }

    /// List products visible on the storefront
    pub async fn list_active(&self) -> Result<Vec<Product>> {
        let rows = self
            .store
            .select(
                SelectRequest::from(PRODUCT_COLLECTION)
                    .filter(Filter::eq("status", "active"))
                    .order_desc("created_at"),
            )
            .await?;

        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(Into::into))
            .collect()
    }

    /// Fetch a single product by id
    pub async fn get(&self, id: &str) -> Result<Product> {
        let rows = self
            .store
            .select(
                SelectRequest::from(PRODUCT_COLLECTION)
                    .filter(Filter::eq("id", id))
                    .limit(1),
            )
            .await?;

        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;

        Ok(serde_json::from_value(row)?)
    }

    /// Validate and persist a new product
    pub async fn create(&self, product: &NewProduct) -> Result<Product> {
        validate_fields(&product.name, product.price, product.sku.as_deref())?;

        let record = serde_json::to_value(product)?;
        let row = self
            .store
            .insert(InsertRequest::new(PRODUCT_COLLECTION, record))
            .await?;
        let created: Product = serde_json::from_value(row)?;

        tracing::info!(product_id = %created.id, name = %created.name, "Product created");
        Ok(created)
    }

    /// Apply a partial update to a product
    pub async fn update(&self, id: &str, patch: &ProductPatch) -> Result<Product> {
        let current = self.get(id).await?;

        let name = patch.name.as_deref().unwrap_or(&current.name);
        let price = patch.price.unwrap_or(current.price);
        let sku = patch.sku.as_deref().or(current.sku.as_deref());
        validate_fields(name, price, sku)?;

        let changes = serde_json::to_value(patch)?;
        let rows = self
            .store
            .update(UpdateRequest::new(PRODUCT_COLLECTION, changes).filter(Filter::eq("id", id)))
            .await?;

        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;
        let updated: Product = serde_json::from_value(row)?;

        tracing::info!(product_id = %updated.id, "Product updated");
        Ok(updated)
    }

    /// Change only the lifecycle status
    pub async fn set_status(&self, id: &str, status: ProductStatus) -> Result<Product> {
        self.update(
            id,
            &ProductPatch {
                status: Some(status),
                ..Default::default()
            },
        )
        .await
    }

    /// Delete a product
    pub async fn delete(&self, id: &str) -> Result<()> {
        let removed = self
            .store
            .delete(DeleteRequest::new(PRODUCT_COLLECTION).filter(Filter::eq("id", id)))
            .await?;

        if removed == 0 {
            return Err(CatalogError::NotFound(id.to_string()));
        }

        tracing::info!(product_id = id, "Product deleted");
        Ok(())
    }
}

/// Render a status for query filters and UI labels
impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ProductStatus::Active => "active",
            ProductStatus::Archived => "archived",
            ProductStatus::OutOfStock => "out_of_stock",
        };
        write!(f, "{label}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use store_client::MemoryStore;

    fn new_product(name: &str, price: f64) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            description: "A test product".to_string(),
            price,
            inventory_count: 10,
            category: "mugs".to_string(),
            ..Default::default()
        }
    }

    fn service() -> ProductService {
        ProductService::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_sku_format() {
        assert!(is_valid_sku("MUG-001"));
        assert!(is_valid_sku("A"));
        assert!(!is_valid_sku("mug-001"));
        assert!(!is_valid_sku("-MUG"));
        assert!(!is_valid_sku(""));
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let service = service();

        let created = service.create(&new_product("Mug", 14.5)).await.unwrap();
        assert_eq!(created.name, "Mug");
        assert_eq!(created.status, ProductStatus::Active);

        let fetched = service.get(&created.id).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_create_rejects_empty_name() {
        let service = service();
        let err = service.create(&new_product("  ", 5.0)).await.unwrap_err();
        assert!(matches!(err, CatalogError::EmptyName));
    }

    #[tokio::test]
    async fn test_create_rejects_negative_price() {
        let service = service();
        let err = service.create(&new_product("Mug", -1.0)).await.unwrap_err();
        assert!(matches!(err, CatalogError::NegativePrice(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_bad_sku() {
        let service = service();

        let mut product = new_product("Mug", 5.0);
        product.sku = Some("bad sku".to_string());

        let err = service.create(&product).await.unwrap_err();
        assert!(matches!(err, CatalogError::InvalidSku(_)));
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let service = service();

        service.create(&new_product("First", 1.0)).await.unwrap();
        service.create(&new_product("Second", 2.0)).await.unwrap();

        let products = service.list().await.unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].name, "Second");
    }

    #[tokio::test]
    async fn test_list_active_filters_archived() {
        let service = service();

        let keep = service.create(&new_product("Keep", 1.0)).await.unwrap();
        let archive = service.create(&new_product("Archive", 2.0)).await.unwrap();
        service
            .set_status(&archive.id, ProductStatus::Archived)
            .await
            .unwrap();

        let active = service.list_active().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, keep.id);
    }

    #[tokio::test]
    async fn test_update_merges() {
        let service = service();

        let product = service.create(&new_product("Mug", 14.5)).await.unwrap();

        let updated = service
            .update(
                &product.id,
                &ProductPatch {
                    price: Some(12.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.price, 12.0);
        assert_eq!(updated.name, "Mug");
    }

    #[tokio::test]
    async fn test_update_validates_merged_fields() {
        let service = service();
        let product = service.create(&new_product("Mug", 14.5)).await.unwrap();

        let err = service
            .update(
                &product.id,
                &ProductPatch {
                    price: Some(-3.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, CatalogError::NegativePrice(_)));
    }

    #[tokio::test]
    async fn test_delete() {
        let service = service();

        let product = service.create(&new_product("Mug", 14.5)).await.unwrap();
        service.delete(&product.id).await.unwrap();

        assert!(matches!(
            service.get(&product.id).await.unwrap_err(),
            CatalogError::NotFound(_)
        ));
        assert!(matches!(
            service.delete(&product.id).await.unwrap_err(),
            CatalogError::NotFound(_)
        ));
    }
}
