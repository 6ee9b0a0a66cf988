//! REST record-store protocol
//!
//! This module implements the client side of the hosted record store's
//! REST interface. The store offers a small capability set (select,
//! insert, update, and delete with equality/inequality filters and
//! ordering, plus named remote procedures) and the storefront depends
//! on nothing beyond that set.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::ConfigError;

// =============================================================================
// Error Types
// =============================================================================

/// Error returned by the record store, with HTTP status and code
///
/// Represents both network failures (status 0) and application-level
/// errors reported by the backend.
///
/// # Examples
/// ```
/// use store_client::StoreError;
///
/// let error = StoreError::new(404, "not_found", "Row not found");
/// assert_eq!(error.status(), 404);
/// assert!(!error.is_network_error());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError {
    /// HTTP status code (0 for transport failures)
    status: u16,
    /// Machine-readable error code
    code: String,
    /// Human-readable message
    message: String,
}

impl StoreError {
    /// Create a new store error
    pub fn new(status: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
        }
    }

    /// Get the HTTP status code
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Get the error code
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Check if this is a network-class error worth retrying
    pub fn is_network_error(&self) -> bool {
        matches!(
            self.status,
            0 | 408 | 425 | 429 | 500 | 502 | 503 | 504 | 522 | 524
        )
    }

    /// Check if this error is recoverable by retrying
    pub fn is_recoverable(&self) -> bool {
        self.is_network_error()
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Store error {}: {} - {}",
            self.status, self.code, self.message
        )
    }
}

impl std::error::Error for StoreError {}

/// Wire format of an error body from the store
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreErrorBody {
    #[serde(default)]
    code: Option<String>,
    message: String,
}

// =============================================================================
// Filters & Ordering
// =============================================================================

/// A row filter applied to select/update/delete requests
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Column equals value
    Eq(String, Value),
    /// Column does not equal value
    Neq(String, Value),
    /// Column is less than value
    Lt(String, Value),
}

impl Filter {
    /// Equality filter
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq(column.into(), value.into())
    }

    /// Inequality filter
    pub fn neq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Neq(column.into(), value.into())
    }

    /// Less-than filter
    pub fn lt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Lt(column.into(), value.into())
    }

    /// Column this filter applies to
    pub fn column(&self) -> &str {
        match self {
            Filter::Eq(c, _) | Filter::Neq(c, _) | Filter::Lt(c, _) => c,
        }
    }

    /// Render as a query-string pair (`column`, `op.value`)
    pub fn query_pair(&self) -> (String, String) {
        let (column, op, value) = match self {
            Filter::Eq(c, v) => (c, "eq", v),
            Filter::Neq(c, v) => (c, "neq", v),
            Filter::Lt(c, v) => (c, "lt", v),
        };

        let rendered = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };

        (column.clone(), format!("{op}.{rendered}"))
    }

    /// Evaluate this filter against a row
    pub fn matches(&self, row: &Value) -> bool {
        let field = row.get(self.column());
        match self {
            Filter::Eq(_, expected) => field == Some(expected),
            Filter::Neq(_, expected) => field != Some(expected),
            Filter::Lt(_, bound) => match (field, bound) {
                (Some(Value::Number(a)), Value::Number(b)) => {
                    match (a.as_f64(), b.as_f64()) {
                        (Some(a), Some(b)) => a < b,
                        _ => false,
                    }
                }
                (Some(Value::String(a)), Value::String(b)) => a < b,
                _ => false,
            },
        }
    }
}

/// Result ordering for select requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    /// Column to order by
    pub column: String,
    /// Descending (newest-first) when true
    pub descending: bool,
}

// =============================================================================
// Request Types
// =============================================================================

/// A select (read) request against one collection
#[derive(Debug, Clone)]
pub struct SelectRequest {
    /// Target collection
    pub collection: String,
    /// Row filters, all must match
    pub filters: Vec<Filter>,
    /// Result ordering
    pub order: Option<OrderBy>,
    /// Maximum row count
    pub limit: Option<u32>,
}

impl SelectRequest {
    /// Select all rows from a collection
    pub fn from(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }

    /// Add a filter
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Order by a column, newest/greatest first
    pub fn order_desc(mut self, column: impl Into<String>) -> Self {
        self.order = Some(OrderBy {
            column: column.into(),
            descending: true,
        });
        self
    }

    /// Order by a column ascending
    pub fn order_asc(mut self, column: impl Into<String>) -> Self {
        self.order = Some(OrderBy {
            column: column.into(),
            descending: false,
        });
        self
    }

    /// Limit the number of rows returned
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// An insert (create) request
#[derive(Debug, Clone)]
pub struct InsertRequest {
    /// Target collection
    pub collection: String,
    /// Record to insert; the store assigns id and timestamps
    pub record: Value,
}

impl InsertRequest {
    /// Insert a record into a collection
    pub fn new(collection: impl Into<String>, record: Value) -> Self {
        Self {
            collection: collection.into(),
            record,
        }
    }
}

/// An update request applying changes to all rows matching the filters
#[derive(Debug, Clone)]
pub struct UpdateRequest {
    /// Target collection
    pub collection: String,
    /// Partial record of changed columns
    pub changes: Value,
    /// Row filters, all must match
    pub filters: Vec<Filter>,
}

impl UpdateRequest {
    /// Update rows in a collection
    pub fn new(collection: impl Into<String>, changes: Value) -> Self {
        Self {
            collection: collection.into(),
            changes,
            filters: Vec::new(),
        }
    }

    /// Add a filter
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }
}

/// A delete request removing all rows matching the filters
#[derive(Debug, Clone)]
pub struct DeleteRequest {
    /// Target collection
    pub collection: String,
    /// Row filters, all must match
    pub filters: Vec<Filter>,
}

impl DeleteRequest {
    /// Delete rows from a collection
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            filters: Vec::new(),
        }
    }

    /// Add a filter
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }
}

// =============================================================================
// Record Store Trait
// =============================================================================

/// The persistence boundary the application layer depends on
///
/// Only this capability set is assumed of the hosted backend:
/// create-with-defaults, update-by-filter, list-ordered-by-recency,
/// filter-by-column, and named remote procedures.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Read rows matching a select request
    async fn select(&self, request: SelectRequest) -> Result<Vec<Value>, StoreError>;

    /// Insert a record, returning the stored row (with id and timestamps)
    async fn insert(&self, request: InsertRequest) -> Result<Value, StoreError>;

    /// Apply changes to matching rows, returning the updated rows
    async fn update(&self, request: UpdateRequest) -> Result<Vec<Value>, StoreError>;

    /// Delete matching rows, returning the number removed
    async fn delete(&self, request: DeleteRequest) -> Result<u64, StoreError>;

    /// Invoke a named remote procedure
    async fn rpc(&self, name: &str, args: Value) -> Result<Value, StoreError>;
}

// =============================================================================
// Client Configuration
// =============================================================================

/// Configuration for the HTTP record store
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Base service URL (e.g., "https://project.example.co")
    pub base_url: String,
    /// API key sent with every request
    pub api_key: String,
    /// Request timeout
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
}

impl StoreConfig {
    /// Create a config from a base URL and API key
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(30),
            user_agent: format!("Meridian-Market/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Load the config from `STORE_URL` and `STORE_API_KEY`
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url =
            std::env::var("STORE_URL").map_err(|_| ConfigError::MissingVar("STORE_URL"))?;
        let api_key =
            std::env::var("STORE_API_KEY").map_err(|_| ConfigError::MissingVar("STORE_API_KEY"))?;

        if base_url.trim().is_empty() {
            return Err(ConfigError::MissingVar("STORE_URL"));
        }

        Ok(Self::new(base_url, api_key))
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

// =============================================================================
// Retry Logic with Exponential Backoff
// =============================================================================

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    pub max_retries: usize,
    /// Initial delay between retries
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Backoff multiplier (2.0 for exponential backoff)
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Create a retry configuration with the given attempt budget
    pub fn new(max_retries: usize) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    /// Set the initial delay
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set the maximum delay
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Delay before the given retry attempt
    fn calculate_delay(&self, attempt: usize) -> Duration {
        let delay_ms =
            self.initial_delay.as_millis() as f64 * self.backoff_multiplier.powi(attempt as i32);

        let delay = Duration::from_millis(delay_ms as u64);
        delay.min(self.max_delay)
    }
}

/// Retry an async operation under a retry policy
///
/// `should_retry` decides which errors are worth another attempt;
/// everything else is returned immediately.
pub async fn retry<F, Fut, T, E>(
    config: RetryConfig,
    should_retry: impl Fn(&E) -> bool,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
{
    let mut attempts = 0;

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(err) => {
                attempts += 1;

                if !should_retry(&err) || attempts > config.max_retries {
                    return Err(err);
                }

                tokio::time::sleep(config.calculate_delay(attempts - 1)).await;
            }
        }
    }
}

/// Retry an operation on network-class store errors only
pub async fn network_retry<F, Fut, T>(max_retries: usize, operation: F) -> Result<T, StoreError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, StoreError>>,
{
    retry(
        RetryConfig::new(max_retries),
        |err: &StoreError| err.is_network_error(),
        operation,
    )
    .await
}

// =============================================================================
// HTTP Record Store
// =============================================================================

use reqwest::{Client as ReqwestClient, Method, Response as ReqwestResponse};

/// HTTP implementation of [`RecordStore`] against the hosted backend
///
/// Maps the capability set onto the backend's REST dialect: filters and
/// ordering become query parameters, inserts and updates ask the server
/// to return the stored representation.
#[derive(Debug, Clone)]
pub struct HttpRecordStore {
    client: ReqwestClient,
    config: StoreConfig,
}

impl HttpRecordStore {
    /// Create a new HTTP record store
    pub fn new(config: StoreConfig) -> Result<Self, ConfigError> {
        let client = ReqwestClient::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| ConfigError::InvalidUrl(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Get the client configuration
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/rest/v1/{}", self.config.base_url, collection)
    }

    fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.config.api_key)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
    }

    fn apply_filters(
        mut req: reqwest::RequestBuilder,
        filters: &[Filter],
    ) -> reqwest::RequestBuilder {
        for filter in filters {
            let (column, condition) = filter.query_pair();
            req = req.query(&[(column, condition)]);
        }
        req
    }

    async fn parse_rows(&self, response: ReqwestResponse) -> Result<Vec<Value>, StoreError> {
        let value = self.parse_body(response).await?;
        match value {
            Value::Array(rows) => Ok(rows),
            Value::Null => Ok(Vec::new()),
            other => Ok(vec![other]),
        }
    }

    async fn parse_body(&self, response: ReqwestResponse) -> Result<Value, StoreError> {
        let status = response.status().as_u16();

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();

            return Err(match serde_json::from_str::<StoreErrorBody>(&body) {
                Ok(parsed) => StoreError::new(
                    status,
                    parsed.code.unwrap_or_else(|| "unknown".to_string()),
                    parsed.message,
                ),
                Err(_) => StoreError::new(status, "unknown", format!("HTTP {status}: {body}")),
            });
        }

        if status == 204 {
            return Ok(Value::Null);
        }

        let body = response
            .text()
            .await
            .map_err(|e| StoreError::new(0, "parse_error", e.to_string()))?;

        if body.is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).map_err(|e| StoreError::new(0, "parse_error", e.to_string()))
    }

    fn transport_error(e: reqwest::Error) -> StoreError {
        StoreError::new(0, "network_error", format!("Request failed: {e}"))
    }
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    async fn select(&self, request: SelectRequest) -> Result<Vec<Value>, StoreError> {
        tracing::debug!(collection = %request.collection, filters = request.filters.len(), "select");

        let url = self.collection_url(&request.collection);
        let mut req = self
            .request(Method::GET, &url)
            .query(&[("select", "*")]);

        req = Self::apply_filters(req, &request.filters);

        if let Some(order) = &request.order {
            let direction = if order.descending { "desc" } else { "asc" };
            req = req.query(&[("order", format!("{}.{direction}", order.column))]);
        }
        if let Some(limit) = request.limit {
            req = req.query(&[("limit", limit.to_string())]);
        }

        let response = req.send().await.map_err(Self::transport_error)?;
        self.parse_rows(response).await
    }

    async fn insert(&self, request: InsertRequest) -> Result<Value, StoreError> {
        let url = self.collection_url(&request.collection);

        let response = self
            .request(Method::POST, &url)
            .header("Prefer", "return=representation")
            .json(&request.record)
            .send()
            .await
            .map_err(Self::transport_error)?;

        let mut rows = self.parse_rows(response).await?;
        rows.pop()
            .ok_or_else(|| StoreError::new(0, "empty_response", "Insert returned no row"))
    }

    async fn update(&self, request: UpdateRequest) -> Result<Vec<Value>, StoreError> {
        let url = self.collection_url(&request.collection);
        let mut req = self
            .request(Method::PATCH, &url)
            .header("Prefer", "return=representation")
            .json(&request.changes);

        req = Self::apply_filters(req, &request.filters);

        let response = req.send().await.map_err(Self::transport_error)?;
        self.parse_rows(response).await
    }

    async fn delete(&self, request: DeleteRequest) -> Result<u64, StoreError> {
        let url = self.collection_url(&request.collection);
        let mut req = self
            .request(Method::DELETE, &url)
            .header("Prefer", "return=representation");

        req = Self::apply_filters(req, &request.filters);

        let response = req.send().await.map_err(Self::transport_error)?;
        let rows = self.parse_rows(response).await?;
        Ok(rows.len() as u64)
    }

    async fn rpc(&self, name: &str, args: Value) -> Result<Value, StoreError> {
        tracing::debug!(name, "rpc");

        let url = format!("{}/rest/v1/rpc/{name}", self.config.base_url);

        let response = self
            .request(Method::POST, &url)
            .json(&args)
            .send()
            .await
            .map_err(Self::transport_error)?;

        self.parse_body(response).await
    }
}

// =============================================================================
// Tests
// =============================================================================


#[cfg(test)]
mod retry_tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_retry_success_first_attempt() {
        let counter = Arc::new(AtomicUsize::new(0));
        let c = counter.clone();

        let result = retry(RetryConfig::new(3), |_: &String| true, || {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok::<_, String>("success")
            }
        })
        .await;

        assert!(result.is_ok());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_success_after_failures() {
        let config = RetryConfig::new(3).with_initial_delay(Duration::from_millis(10));
        let counter = Arc::new(AtomicUsize::new(0));
        let c = counter.clone();

        let result = retry(config, |_: &String| true, || {
            let c = c.clone();
            async move {
                if c.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err("temporary".to_string())
                } else {
                    Ok("success")
                }
            }
        })
        .await;

        assert!(result.is_ok());
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up_on_non_retryable() {
        let counter = Arc::new(AtomicUsize::new(0));
        let c = counter.clone();

        let result = retry(
            RetryConfig::new(3),
            |err: &String| !err.contains("permanent"),
            || {
                let c = c.clone();
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Err::<String, _>("permanent failure".to_string())
                }
            },
        )
        .await;

        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_exhausted() {
        let config = RetryConfig::new(2).with_initial_delay(Duration::from_millis(10));
        let counter = Arc::new(AtomicUsize::new(0));
        let c = counter.clone();

        let result = retry(config, |_: &String| true, || {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<String, _>("always fails".to_string())
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 3); // Initial + 2 retries
    }

    #[tokio::test]
    async fn test_network_retry_retries_network_errors() {
        let counter = Arc::new(AtomicUsize::new(0));
        let c = counter.clone();

        let result = network_retry(2, || {
            let c = c.clone();
            async move {
                if c.fetch_add(1, Ordering::SeqCst) < 1 {
                    Err(StoreError::new(503, "unavailable", "down"))
                } else {
                    Ok("success")
                }
            }
        })
        .await;

        assert!(result.is_ok());
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_network_retry_skips_application_errors() {
        let counter = Arc::new(AtomicUsize::new(0));
        let c = counter.clone();

        let result: Result<String, StoreError> = network_retry(2, || {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err(StoreError::new(400, "bad_request", "invalid"))
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
