//! In-memory record store for tests
//!
//! Implements [`RecordStore`] over process memory with the same observable
//! behavior as the hosted backend: sequential id assignment, timestamp
//! stamping, filter and order evaluation, and the inventory remote
//! procedures. Failure injection lets tests exercise the transactional
//! paths (e.g. activation rollback) deterministically.

#![allow(dead_code)] // Test utilities may not all be used yet

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use std::cmp::Ordering as CmpOrdering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::rest::{
    DeleteRequest, Filter, InsertRequest, RecordStore, SelectRequest, StoreError, UpdateRequest,
};

/// Operations that can have failures injected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// Select (read) operations
    Select,
    /// Insert operations
    Insert,
    /// Update operations
    Update,
    /// Delete operations
    Delete,
    /// Remote procedure calls
    Rpc,
}

struct PlannedFailure {
    op: Op,
    remaining: usize,
    error: StoreError,
}

/// In-memory [`RecordStore`] implementation
pub struct MemoryStore {
    collections: Mutex<HashMap<String, Vec<Value>>>,
    next_id: AtomicU64,
    failures: Mutex<Vec<PlannedFailure>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            collections: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            failures: Mutex::new(Vec::new()),
        }
    }

    /// Seed a collection with rows as-is (no id assignment or stamping)
    pub fn seed(&self, collection: &str, rows: Vec<Value>) {
        let mut collections = self.collections.lock().unwrap();
        collections
            .entry(collection.to_string())
            .or_default()
            .extend(rows);
    }

    /// Number of rows currently in a collection
    pub fn count(&self, collection: &str) -> usize {
        let collections = self.collections.lock().unwrap();
        collections.get(collection).map(Vec::len).unwrap_or(0)
    }

    /// Fail the next call of `op` with `error`
    pub fn fail_next(&self, op: Op, error: StoreError) {
        self.fail_nth(op, 0, error);
    }

    /// Fail the `nth` call of `op` from now (0 = next call)
    pub fn fail_nth(&self, op: Op, nth: usize, error: StoreError) {
        self.failures.lock().unwrap().push(PlannedFailure {
            op,
            remaining: nth,
            error,
        });
    }

    fn check_failure(&self, op: Op) -> Result<(), StoreError> {
        let mut failures = self.failures.lock().unwrap();

        let mut due = None;
        for (index, failure) in failures.iter_mut().enumerate() {
            if failure.op != op {
                continue;
            }
            if failure.remaining == 0 {
                due = Some(index);
                break;
            }
            failure.remaining -= 1;
        }

        match due {
            Some(index) => Err(failures.remove(index).error),
            None => Ok(()),
        }
    }

    fn compare(a: Option<&Value>, b: Option<&Value>) -> CmpOrdering {
        match (a, b) {
            (Some(Value::Number(a)), Some(Value::Number(b))) => {
                match (a.as_f64(), b.as_f64()) {
                    (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(CmpOrdering::Equal),
                    _ => CmpOrdering::Equal,
                }
            }
            (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
            (None, Some(_)) => CmpOrdering::Less,
            (Some(_), None) => CmpOrdering::Greater,
            _ => CmpOrdering::Equal,
        }
    }

    fn matches_all(row: &Value, filters: &[Filter]) -> bool {
        filters.iter().all(|f| f.matches(row))
    }

    fn merge_changes(row: &mut Value, changes: &Value) {
        if let (Some(row_map), Some(change_map)) = (row.as_object_mut(), changes.as_object()) {
            for (key, value) in change_map {
                row_map.insert(key.clone(), value.clone());
            }
            row_map.insert(
                "updated_at".to_string(),
                Value::String(Utc::now().to_rfc3339()),
            );
        }
    }

    fn run_inventory_rpc(&self, name: &str, args: &Value) -> Result<Value, StoreError> {
        let product_id = args
            .get("p_product_id")
            .and_then(Value::as_str)
            .ok_or_else(|| StoreError::new(400, "bad_request", "p_product_id required"))?;

        let mut collections = self.collections.lock().unwrap();
        let products = collections.entry("products".to_string()).or_default();

        let product = products
            .iter_mut()
            .find(|p| p.get("id").and_then(Value::as_str) == Some(product_id))
            .ok_or_else(|| StoreError::new(404, "not_found", "Product not found"))?;

        let current = product
            .get("inventory_count")
            .and_then(Value::as_i64)
            .unwrap_or(0);

        let next = match name {
            "reserve_inventory" => {
                let quantity = args.get("p_quantity").and_then(Value::as_i64).unwrap_or(0);
                if current < quantity {
                    return Err(StoreError::new(
                        409,
                        "insufficient_inventory",
                        "Not enough inventory to reserve",
                    ));
                }
                current - quantity
            }
            "release_inventory" => {
                current + args.get("p_quantity").and_then(Value::as_i64).unwrap_or(0)
            }
            "adjust_inventory" => {
                (current + args.get("p_adjustment").and_then(Value::as_i64).unwrap_or(0)).max(0)
            }
            _ => return Err(StoreError::new(404, "unknown_function", name.to_string())),
        };

        product["inventory_count"] = Value::from(next);
        Ok(Value::Null)
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn select(&self, request: SelectRequest) -> Result<Vec<Value>, StoreError> {
        self.check_failure(Op::Select)?;

        let collections = self.collections.lock().unwrap();
        let mut rows: Vec<Value> = collections
            .get(&request.collection)
            .map(|rows| {
                rows.iter()
                    .filter(|row| Self::matches_all(row, &request.filters))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = &request.order {
            // Reverse first so stable sort leaves ties newest-first
            rows.reverse();
            rows.sort_by(|a, b| {
                let ordering = Self::compare(a.get(&order.column), b.get(&order.column));
                if order.descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }

        if let Some(limit) = request.limit {
            rows.truncate(limit as usize);
        }

        Ok(rows)
    }

    async fn insert(&self, request: InsertRequest) -> Result<Value, StoreError> {
        self.check_failure(Op::Insert)?;

        let mut record = request.record;
        let map = record
            .as_object_mut()
            .ok_or_else(|| StoreError::new(400, "bad_request", "Record must be an object"))?;

        if !map.contains_key("id") || map["id"].is_null() {
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            map.insert("id".to_string(), Value::String(id.to_string()));
        }

        let now = Utc::now().to_rfc3339();
        map.entry("created_at".to_string())
            .or_insert_with(|| Value::String(now.clone()));
        map.entry("updated_at".to_string())
            .or_insert_with(|| Value::String(now));

        let mut collections = self.collections.lock().unwrap();
        collections
            .entry(request.collection)
            .or_default()
            .push(record.clone());

        Ok(record)
    }

    async fn update(&self, request: UpdateRequest) -> Result<Vec<Value>, StoreError> {
        self.check_failure(Op::Update)?;

        let mut collections = self.collections.lock().unwrap();
        let rows = collections.entry(request.collection).or_default();

        let mut updated = Vec::new();
        for row in rows.iter_mut() {
            if Self::matches_all(row, &request.filters) {
                Self::merge_changes(row, &request.changes);
                updated.push(row.clone());
            }
        }

        Ok(updated)
    }

    async fn delete(&self, request: DeleteRequest) -> Result<u64, StoreError> {
        self.check_failure(Op::Delete)?;

        let mut collections = self.collections.lock().unwrap();
        let rows = collections.entry(request.collection).or_default();

        let before = rows.len();
        rows.retain(|row| !Self::matches_all(row, &request.filters));

        Ok((before - rows.len()) as u64)
    }

    async fn rpc(&self, name: &str, args: Value) -> Result<Value, StoreError> {
        self.check_failure(Op::Rpc)?;
        self.run_inventory_rpc(name, &args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_assigns_id_and_timestamps() {
        let store = MemoryStore::new();

        let row = store
            .insert(InsertRequest::new("products", json!({ "name": "Mug" })))
            .await
            .unwrap();

        assert_eq!(row["id"], json!("1"));
        assert!(row["created_at"].is_string());
        assert!(row["updated_at"].is_string());

        let row2 = store
            .insert(InsertRequest::new("products", json!({ "name": "Tee" })))
            .await
            .unwrap();
        assert_eq!(row2["id"], json!("2"));
    }

    #[tokio::test]
    async fn test_select_with_filter_and_order() {
        let store = MemoryStore::new();
        store.seed(
            "products",
            vec![
                json!({ "id": "1", "name": "Old", "created_at": "2024-01-01T00:00:00Z", "archived": false }),
                json!({ "id": "2", "name": "New", "created_at": "2024-06-01T00:00:00Z", "archived": false }),
                json!({ "id": "3", "name": "Gone", "created_at": "2024-03-01T00:00:00Z", "archived": true }),
            ],
        );

        let rows = store
            .select(
                SelectRequest::from("products")
                    .filter(Filter::eq("archived", false))
                    .order_desc("created_at"),
            )
            .await
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["name"], json!("New"));
        assert_eq!(rows[1]["name"], json!("Old"));
    }

    #[tokio::test]
    async fn test_order_ties_newest_first() {
        let store = MemoryStore::new();
        let same = "2024-01-01T00:00:00Z";
        store.seed(
            "rows",
            vec![
                json!({ "id": "1", "created_at": same }),
                json!({ "id": "2", "created_at": same }),
            ],
        );

        let rows = store
            .select(SelectRequest::from("rows").order_desc("created_at"))
            .await
            .unwrap();

        assert_eq!(rows[0]["id"], json!("2"));
    }

    #[tokio::test]
    async fn test_update_by_filter() {
        let store = MemoryStore::new();
        store.seed(
            "color_themes",
            vec![
                json!({ "id": "1", "is_active": true }),
                json!({ "id": "2", "is_active": false }),
            ],
        );

        let updated = store
            .update(
                UpdateRequest::new("color_themes", json!({ "is_active": false }))
                    .filter(Filter::neq("id", "2")),
            )
            .await
            .unwrap();

        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0]["id"], json!("1"));
        assert_eq!(updated[0]["is_active"], json!(false));
    }

    #[tokio::test]
    async fn test_delete_returns_count() {
        let store = MemoryStore::new();
        store.seed(
            "products",
            vec![json!({ "id": "1" }), json!({ "id": "2" })],
        );

        let removed = store
            .delete(DeleteRequest::new("products").filter(Filter::eq("id", "1")))
            .await
            .unwrap();

        assert_eq!(removed, 1);
        assert_eq!(store.count("products"), 1);
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let store = MemoryStore::new();
        store.seed("rows", vec![json!({ "id": "1" })]);

        store.fail_next(Op::Select, StoreError::new(503, "unavailable", "down"));

        let err = store
            .select(SelectRequest::from("rows"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), 503);

        // Failure is consumed; the next call succeeds
        assert!(store.select(SelectRequest::from("rows")).await.is_ok());
    }

    #[tokio::test]
    async fn test_fail_nth_skips_earlier_calls() {
        let store = MemoryStore::new();
        store.seed("color_themes", vec![json!({ "id": "1", "is_active": true })]);

        store.fail_nth(Op::Update, 1, StoreError::new(500, "server_error", "boom"));

        let first = store
            .update(UpdateRequest::new("color_themes", json!({ "is_active": false })))
            .await;
        assert!(first.is_ok());

        let second = store
            .update(UpdateRequest::new("color_themes", json!({ "is_active": true })))
            .await;
        assert!(second.is_err());
    }

    #[tokio::test]
    async fn test_reserve_and_release_inventory() {
        let store = MemoryStore::new();
        store.seed(
            "products",
            vec![json!({ "id": "p1", "inventory_count": 5 })],
        );

        store
            .rpc("reserve_inventory", json!({ "p_product_id": "p1", "p_quantity": 3 }))
            .await
            .unwrap();

        let rows = store
            .select(SelectRequest::from("products"))
            .await
            .unwrap();
        assert_eq!(rows[0]["inventory_count"], json!(2));

        let err = store
            .rpc("reserve_inventory", json!({ "p_product_id": "p1", "p_quantity": 10 }))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "insufficient_inventory");

        store
            .rpc("release_inventory", json!({ "p_product_id": "p1", "p_quantity": 3 }))
            .await
            .unwrap();

        let rows = store
            .select(SelectRequest::from("products"))
            .await
            .unwrap();
        assert_eq!(rows[0]["inventory_count"], json!(5));
    }

    #[tokio::test]
    async fn test_adjust_inventory_floors_at_zero() {
        let store = MemoryStore::new();
        store.seed(
            "products",
            vec![json!({ "id": "p1", "inventory_count": 2 })],
        );

        store
            .rpc(
                "adjust_inventory",
                json!({ "p_product_id": "p1", "p_adjustment": -10, "p_reason": "shrinkage" }),
            )
            .await
            .unwrap();

        let rows = store
            .select(SelectRequest::from("products"))
            .await
            .unwrap();
        assert_eq!(rows[0]["inventory_count"], json!(0));
    }
}
