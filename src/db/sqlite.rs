//! SQLite-backed document store.
//!
//! Every record lives in the `documents` table as a JSON body; predicates and
//! ordering are compiled to `json_extract` expressions.

use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::sqlite::{Sqlite, SqliteArguments};
use sqlx::{query::Query, Row, SqlitePool};

use super::query::{Condition, Direction, ListQuery};
use super::store::{merge_changes, not_found, stamp_new_document, Collection, DocumentStore};
use crate::errors::AppError;

type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn list(
        &self,
        collection: Collection,
        query: &ListQuery,
    ) -> Result<Vec<Value>, AppError> {
        let sql = select_sql(query);

        let mut statement = sqlx::query(&sql).bind(collection.as_str());
        for predicate in &query.predicates {
            match predicate.condition() {
                Condition::Eq(value) | Condition::Not(value) => {
                    statement = bind_value(statement, value);
                }
                Condition::In(values) => {
                    for value in values {
                        statement = bind_value(statement, value);
                    }
                }
            }
        }
        if let Some(limit) = query.limit {
            statement = statement.bind(i64::try_from(limit).unwrap_or(i64::MAX));
        }

        let rows = statement.fetch_all(&self.pool).await?;
        rows.iter()
            .map(|row| parse_body(&row.get::<String, _>("body")).map(Value::Object))
            .collect()
    }

    async fn create(&self, collection: Collection, fields: Value) -> Result<Value, AppError> {
        let (id, document) = stamp_new_document(fields)?;
        let body = serde_json::to_string(&document)
            .map_err(|e| AppError::Internal(format!("Failed to encode document: {}", e)))?;

        sqlx::query("INSERT INTO documents (collection, id, body) VALUES (?, ?, ?)")
            .bind(collection.as_str())
            .bind(&id)
            .bind(&body)
            .execute(&self.pool)
            .await?;

        Ok(Value::Object(document))
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        changes: Value,
    ) -> Result<Value, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT body FROM documents WHERE collection = ? AND id = ?")
            .bind(collection.as_str())
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| not_found(collection, id))?;

        let mut document = parse_body(&row.get::<String, _>("body"))?;
        merge_changes(&mut document, changes)?;
        let body = serde_json::to_string(&document)
            .map_err(|e| AppError::Internal(format!("Failed to encode document: {}", e)))?;

        sqlx::query("UPDATE documents SET body = ? WHERE collection = ? AND id = ?")
            .bind(&body)
            .bind(collection.as_str())
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Value::Object(document))
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = ? AND id = ?")
            .bind(collection.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(collection, id));
        }
        Ok(())
    }
}

/// Build the SELECT for a query. Field names were validated as identifiers
/// when the predicates were constructed, so they are safe to splice in.
fn select_sql(query: &ListQuery) -> String {
    let mut sql = String::from("SELECT body FROM documents WHERE collection = ?");

    for predicate in &query.predicates {
        let path = json_path(predicate.field());
        match predicate.condition() {
            Condition::Eq(_) => sql.push_str(&format!(" AND {} = ?", path)),
            Condition::Not(_) => sql.push_str(&format!(" AND {} IS NOT ?", path)),
            Condition::In(values) => {
                let placeholders = vec!["?"; values.len()].join(", ");
                sql.push_str(&format!(" AND {} IN ({})", path, placeholders));
            }
        }
    }

    let mut order: Vec<String> = query
        .order
        .iter()
        .map(|o| {
            let direction = match o.direction() {
                Direction::Asc => "ASC",
                Direction::Desc => "DESC",
            };
            format!("{} {}", json_path(o.field()), direction)
        })
        .collect();
    order.push("rowid ASC".to_string());
    sql.push_str(" ORDER BY ");
    sql.push_str(&order.join(", "));

    if query.limit.is_some() {
        sql.push_str(" LIMIT ?");
    }

    sql
}

fn json_path(field: &str) -> String {
    format!("json_extract(body, '$.{}')", field)
}

fn bind_value<'q>(statement: SqliteQuery<'q>, value: &Value) -> SqliteQuery<'q> {
    match value {
        Value::String(s) => statement.bind(s.clone()),
        // json_extract yields 1/0 for JSON booleans
        Value::Bool(b) => statement.bind(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => statement.bind(i),
            None => statement.bind(n.as_f64().unwrap_or_default()),
        },
        _ => statement.bind(Option::<String>::None),
    }
}

fn parse_body(body: &str) -> Result<Map<String, Value>, AppError> {
    match serde_json::from_str(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(AppError::Database("Stored document is not an object".to_string())),
        Err(e) => Err(AppError::Database(format!("Corrupt stored document: {}", e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use crate::db::query::Predicate;
    use serde_json::json;
    use tempfile::TempDir;

    async fn store() -> (SqliteStore, TempDir) {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let pool = init_database(&dir.path().join("store.sqlite"))
            .await
            .expect("Failed to init DB");
        (SqliteStore::new(pool), dir)
    }

    #[test]
    fn test_select_sql_shape() {
        let query = ListQuery::new()
            .filter(Predicate::eq("role", "member").unwrap())
            .filter(Predicate::any_of("status", ["pending", "in_progress"]).unwrap())
            .filter(Predicate::not("status", "removed").unwrap())
            .order_by("dueDate", Direction::Asc)
            .unwrap()
            .limit(Some(1));

        assert_eq!(
            select_sql(&query),
            "SELECT body FROM documents WHERE collection = ? \
             AND json_extract(body, '$.role') = ? \
             AND json_extract(body, '$.status') IN (?, ?) \
             AND json_extract(body, '$.status') IS NOT ? \
             ORDER BY json_extract(body, '$.dueDate') ASC, rowid ASC LIMIT ?"
        );
    }

    #[tokio::test]
    async fn test_round_trip_with_filters() {
        let (store, _dir) = store().await;

        for (name, status, week, read) in [
            ("Sarah", "active", 3, false),
            ("Alex", "active", 1, true),
            ("Mike", "removed", 2, false),
        ] {
            store
                .create(
                    Collection::Users,
                    json!({ "name": name, "status": status, "weekNumber": week, "isRead": read }),
                )
                .await
                .unwrap();
        }

        let query = ListQuery::new()
            .filter(Predicate::not("status", "removed").unwrap())
            .order_by("name", Direction::Asc)
            .unwrap();
        let docs = store.list(Collection::Users, &query).await.unwrap();
        let names: Vec<_> = docs.iter().map(|d| d["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["Alex", "Sarah"]);

        let query = ListQuery::new().filter(Predicate::eq("weekNumber", 2).unwrap());
        let docs = store.list(Collection::Users, &query).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0]["name"], "Mike");

        let query = ListQuery::new().filter(Predicate::eq("isRead", false).unwrap());
        let docs = store.list(Collection::Users, &query).await.unwrap();
        assert_eq!(docs.len(), 2);

        let others = store
            .list(Collection::Tasks, &ListQuery::new())
            .await
            .unwrap();
        assert!(others.is_empty());
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let (store, _dir) = store().await;

        let created = store
            .create(Collection::Tasks, json!({ "title": "Grant", "status": "pending" }))
            .await
            .unwrap();
        let id = created["id"].as_str().unwrap().to_string();

        let updated = store
            .update(Collection::Tasks, &id, json!({ "status": "completed" }))
            .await
            .unwrap();
        assert_eq!(updated["status"], "completed");
        assert_eq!(updated["title"], "Grant");

        let listed = store
            .list(
                Collection::Tasks,
                &ListQuery::new().filter(Predicate::eq("status", "completed").unwrap()),
            )
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);

        store.delete(Collection::Tasks, &id).await.unwrap();
        let err = store.delete(Collection::Tasks, &id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = store
            .update(Collection::Tasks, &id, json!({ "status": "pending" }))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
