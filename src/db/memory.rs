//! In-memory document store.
//!
//! Linear scans over insertion-ordered vectors. Used for demo mode and as the
//! substitute persistence provider in tests.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use super::query::{Direction, ListQuery};
use super::store::{merge_changes, not_found, stamp_new_document, Collection, DocumentStore};
use crate::errors::AppError;

#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, Vec<Map<String, Value>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list(
        &self,
        collection: Collection,
        query: &ListQuery,
    ) -> Result<Vec<Value>, AppError> {
        let collections = self.collections.read().await;
        let Some(documents) = collections.get(&collection) else {
            return Ok(Vec::new());
        };

        let mut matched: Vec<Value> = documents
            .iter()
            .map(|doc| Value::Object(doc.clone()))
            .filter(|doc| query.matches(doc))
            .collect();

        // sort_by is stable, so ties keep insertion order
        matched.sort_by(|a, b| {
            for order in &query.order {
                let ordering = compare_values(a.get(order.field()), b.get(order.field()));
                let ordering = match order.direction() {
                    Direction::Asc => ordering,
                    Direction::Desc => ordering.reverse(),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            Ordering::Equal
        });

        if let Some(limit) = query.limit {
            matched.truncate(limit);
        }

        Ok(matched)
    }

    async fn create(&self, collection: Collection, fields: Value) -> Result<Value, AppError> {
        let (_, document) = stamp_new_document(fields)?;
        let mut collections = self.collections.write().await;
        collections
            .entry(collection)
            .or_default()
            .push(document.clone());
        Ok(Value::Object(document))
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        changes: Value,
    ) -> Result<Value, AppError> {
        let mut collections = self.collections.write().await;
        let document = collections
            .get_mut(&collection)
            .and_then(|docs| docs.iter_mut().find(|doc| has_id(doc, id)))
            .ok_or_else(|| not_found(collection, id))?;

        merge_changes(document, changes)?;
        Ok(Value::Object(document.clone()))
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), AppError> {
        let mut collections = self.collections.write().await;
        let documents = collections
            .get_mut(&collection)
            .ok_or_else(|| not_found(collection, id))?;

        let before = documents.len();
        documents.retain(|doc| !has_id(doc, id));
        if documents.len() == before {
            return Err(not_found(collection, id));
        }
        Ok(())
    }
}

fn has_id(document: &Map<String, Value>, id: &str) -> bool {
    document.get("id").and_then(Value::as_str) == Some(id)
}

/// Order values the way SQLite orders `json_extract` results:
/// missing/null first, then numbers (booleans as 0/1), then text.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(v: Option<&Value>) -> u8 {
        match v {
            None | Some(Value::Null) => 0,
            Some(Value::Bool(_)) | Some(Value::Number(_)) => 1,
            Some(Value::String(_)) => 2,
            Some(_) => 3,
        }
    }

    fn numeric(v: &Value) -> f64 {
        match v {
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Number(n) => n.as_f64().unwrap_or(0.0),
            _ => 0.0,
        }
    }

    match (rank(a), rank(b)) {
        (1, 1) => {
            let x = a.map(numeric).unwrap_or(0.0);
            let y = b.map(numeric).unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (2, 2) => a
            .and_then(Value::as_str)
            .cmp(&b.and_then(Value::as_str)),
        (ra, rb) => ra.cmp(&rb),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::query::Predicate;
    use serde_json::json;

    async fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        for (name, status, week) in [
            ("Sarah", "active", 3),
            ("Alex", "active", 1),
            ("Mike", "flagged", 2),
            ("Old", "removed", 2),
        ] {
            store
                .create(
                    Collection::Users,
                    json!({ "name": name, "status": status, "week": week }),
                )
                .await
                .unwrap();
        }
        store
    }

    fn names(docs: &[Value]) -> Vec<&str> {
        docs.iter().map(|d| d["name"].as_str().unwrap()).collect()
    }

    #[tokio::test]
    async fn test_list_filters_orders_and_limits() {
        let store = seeded().await;

        let query = ListQuery::new()
            .filter(Predicate::not("status", "removed").unwrap())
            .order_by("name", Direction::Asc)
            .unwrap();
        let docs = store.list(Collection::Users, &query).await.unwrap();
        assert_eq!(names(&docs), vec!["Alex", "Mike", "Sarah"]);

        let query = ListQuery::new()
            .order_by("week", Direction::Desc)
            .unwrap()
            .limit(Some(2));
        let docs = store.list(Collection::Users, &query).await.unwrap();
        // Mike and Old tie on week 2; insertion order decides
        assert_eq!(names(&docs), vec!["Sarah", "Mike"]);
    }

    #[tokio::test]
    async fn test_collections_are_isolated() {
        let store = seeded().await;
        let tasks = store
            .list(Collection::Tasks, &ListQuery::new())
            .await
            .unwrap();
        assert!(tasks.is_empty());
    }

    #[tokio::test]
    async fn test_update_and_delete_unknown_ids() {
        let store = seeded().await;

        let err = store
            .update(Collection::Users, "missing", json!({ "status": "active" }))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = store.delete(Collection::Tasks, "missing").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let store = MemoryStore::new();
        let created = store
            .create(Collection::Tasks, json!({ "title": "Grant", "status": "pending" }))
            .await
            .unwrap();
        let id = created["id"].as_str().unwrap();

        let updated = store
            .update(Collection::Tasks, id, json!({ "status": "completed" }))
            .await
            .unwrap();
        assert_eq!(updated["title"], "Grant");
        assert_eq!(updated["status"], "completed");

        store.delete(Collection::Tasks, id).await.unwrap();
        let remaining = store
            .list(Collection::Tasks, &ListQuery::new())
            .await
            .unwrap();
        assert!(remaining.is_empty());
    }

    #[test]
    fn test_compare_values_orders_like_sqlite() {
        let null = Value::Null;
        let one = json!(1);
        let two = json!(2.5);
        let text = json!("a");
        assert_eq!(compare_values(None, Some(&one)), Ordering::Less);
        assert_eq!(compare_values(Some(&null), Some(&one)), Ordering::Less);
        assert_eq!(compare_values(Some(&one), Some(&two)), Ordering::Less);
        assert_eq!(compare_values(Some(&two), Some(&text)), Ordering::Less);
        assert_eq!(compare_values(Some(&text), Some(&json!("b"))), Ordering::Less);
    }
}
