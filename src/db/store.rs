//! Persistence provider contract.
//!
//! A store holds JSON documents grouped in collections. Record types are
//! mapped onto documents by the [`Repository`](super::Repository).

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};

use super::query::ListQuery;
use crate::errors::AppError;
use crate::models::timestamp;

/// Document collections known to the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Tasks,
    TaskSubmissions,
    LeaveRequests,
    AiInteractions,
    PerformanceLogs,
    Notifications,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Tasks => "tasks",
            Collection::TaskSubmissions => "task_submissions",
            Collection::LeaveRequests => "leave_requests",
            Collection::AiInteractions => "ai_interactions",
            Collection::PerformanceLogs => "performance_logs",
            Collection::Notifications => "notifications",
        }
    }

    /// Singular noun used in error messages.
    pub fn record_name(&self) -> &'static str {
        match self {
            Collection::Users => "Member",
            Collection::Tasks => "Task",
            Collection::TaskSubmissions => "Submission",
            Collection::LeaveRequests => "Leave request",
            Collection::AiInteractions => "Interaction",
            Collection::PerformanceLogs => "Performance log",
            Collection::Notifications => "Notification",
        }
    }
}

/// Document-style persistence provider.
///
/// Writes are last-write-wins; there is no versioning and no cross-call
/// transaction.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Documents matching every predicate, ordered, optionally limited.
    async fn list(&self, collection: Collection, query: &ListQuery)
        -> Result<Vec<Value>, AppError>;

    /// Insert a document. The store assigns `id`, `createdAt` and `updatedAt`.
    async fn create(&self, collection: Collection, fields: Value) -> Result<Value, AppError>;

    /// Merge `changes` into an existing document and refresh `updatedAt`.
    async fn update(
        &self,
        collection: Collection,
        id: &str,
        changes: Value,
    ) -> Result<Value, AppError>;

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), AppError>;
}

/// Turn caller-supplied fields into a complete document.
pub(crate) fn stamp_new_document(fields: Value) -> Result<(String, Map<String, Value>), AppError> {
    let mut object = into_object(fields)?;
    let id = uuid::Uuid::new_v4().to_string();
    let now = Value::String(timestamp::format(&Utc::now()));
    object.insert("id".to_string(), Value::String(id.clone()));
    object.insert("createdAt".to_string(), now.clone());
    object.insert("updatedAt".to_string(), now);
    Ok((id, object))
}

/// Apply a partial update to a stored document. `id` and `createdAt` are immutable.
pub(crate) fn merge_changes(
    document: &mut Map<String, Value>,
    changes: Value,
) -> Result<(), AppError> {
    for (key, value) in into_object(changes)? {
        if key == "id" || key == "createdAt" {
            continue;
        }
        document.insert(key, value);
    }
    document.insert(
        "updatedAt".to_string(),
        Value::String(timestamp::format(&Utc::now())),
    );
    Ok(())
}

fn into_object(value: Value) -> Result<Map<String, Value>, AppError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(AppError::Internal(format!(
            "Documents must be JSON objects, got {}",
            other
        ))),
    }
}

pub(crate) fn not_found(collection: Collection, id: &str) -> AppError {
    AppError::NotFound(format!("{} {} not found", collection.record_name(), id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_documents_get_identity_and_timestamps() {
        let (id, doc) = stamp_new_document(json!({ "name": "Ada" })).unwrap();
        assert_eq!(doc["id"], Value::String(id));
        assert!(doc["createdAt"].is_string());
        assert_eq!(doc["createdAt"], doc["updatedAt"]);
        assert_eq!(doc["name"], "Ada");
    }

    #[test]
    fn test_merge_keeps_identity() {
        let (id, mut doc) = stamp_new_document(json!({ "status": "pending" })).unwrap();
        merge_changes(
            &mut doc,
            json!({ "id": "other", "status": "completed", "completedAt": "2024-01-01T00:00:00.000Z" }),
        )
        .unwrap();
        assert_eq!(doc["id"], Value::String(id));
        assert_eq!(doc["status"], "completed");
        assert!(doc.contains_key("completedAt"));
    }

    #[test]
    fn test_non_objects_are_rejected() {
        assert!(stamp_new_document(json!([1, 2])).is_err());
        let (_, mut doc) = stamp_new_document(json!({})).unwrap();
        assert!(merge_changes(&mut doc, json!("status")).is_err());
    }
}
