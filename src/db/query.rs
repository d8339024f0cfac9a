//! Query predicates for document collections.
//!
//! Field names double as JSON paths inside SQL, so they are restricted to
//! plain identifiers when a predicate is built.

use serde_json::Value;

use crate::errors::AppError;

/// Error raised when a predicate or ordering is malformed.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryError {
    InvalidField(String),
    NonScalarValue(String),
    EmptySet(String),
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryError::InvalidField(field) => write!(f, "invalid field name: {:?}", field),
            QueryError::NonScalarValue(field) => {
                write!(f, "non-scalar value in predicate on {}", field)
            }
            QueryError::EmptySet(field) => write!(f, "empty value set in predicate on {}", field),
        }
    }
}

impl std::error::Error for QueryError {}

impl From<QueryError> for AppError {
    fn from(err: QueryError) -> Self {
        AppError::Internal(format!("Malformed query: {}", err))
    }
}

/// Comparison applied to a single field.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Eq(Value),
    In(Vec<Value>),
    /// Matches documents whose field differs from the value or is absent
    Not(Value),
}

/// A validated `(field, operator, value)` triple.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    field: String,
    condition: Condition,
}

impl Predicate {
    pub fn eq(field: &str, value: impl Into<Value>) -> Result<Self, QueryError> {
        let value = scalar(field, value.into())?;
        Self::build(field, Condition::Eq(value))
    }

    pub fn not(field: &str, value: impl Into<Value>) -> Result<Self, QueryError> {
        let value = scalar(field, value.into())?;
        Self::build(field, Condition::Not(value))
    }

    pub fn any_of<V: Into<Value>>(
        field: &str,
        values: impl IntoIterator<Item = V>,
    ) -> Result<Self, QueryError> {
        let values = values
            .into_iter()
            .map(|v| scalar(field, v.into()))
            .collect::<Result<Vec<_>, _>>()?;
        if values.is_empty() {
            return Err(QueryError::EmptySet(field.to_string()));
        }
        Self::build(field, Condition::In(values))
    }

    fn build(field: &str, condition: Condition) -> Result<Self, QueryError> {
        validate_field(field)?;
        Ok(Self {
            field: field.to_string(),
            condition,
        })
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn condition(&self) -> &Condition {
        &self.condition
    }

    /// Evaluate the predicate against a JSON document.
    pub fn matches(&self, document: &Value) -> bool {
        let actual = document.get(&self.field);
        match &self.condition {
            Condition::Eq(expected) => actual == Some(expected),
            Condition::In(set) => actual.is_some_and(|v| set.contains(v)),
            Condition::Not(excluded) => actual != Some(excluded),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    field: String,
    direction: Direction,
}

impl OrderBy {
    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }
}

/// Conjunction of predicates with ordering and an optional limit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    pub predicates: Vec<Predicate>,
    pub order: Vec<OrderBy>,
    pub limit: Option<usize>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn order_by(mut self, field: &str, direction: Direction) -> Result<Self, QueryError> {
        validate_field(field)?;
        self.order.push(OrderBy {
            field: field.to_string(),
            direction,
        });
        Ok(self)
    }

    pub fn limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    pub fn matches(&self, document: &Value) -> bool {
        self.predicates.iter().all(|p| p.matches(document))
    }
}

fn validate_field(field: &str) -> Result<(), QueryError> {
    let mut chars = field.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(QueryError::InvalidField(field.to_string()))
    }
}

fn scalar(field: &str, value: Value) -> Result<Value, QueryError> {
    match value {
        Value::String(_) | Value::Number(_) | Value::Bool(_) => Ok(value),
        _ => Err(QueryError::NonScalarValue(field.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_names_are_validated() {
        assert!(Predicate::eq("status", "active").is_ok());
        assert!(Predicate::eq("week_number2", 3).is_ok());
        assert_eq!(
            Predicate::eq("", "x"),
            Err(QueryError::InvalidField(String::new()))
        );
        assert!(Predicate::eq("1status", "x").is_err());
        assert!(Predicate::eq("status') OR 1=1 --", "x").is_err());
        assert!(ListQuery::new().order_by("name.first", Direction::Asc).is_err());
    }

    #[test]
    fn test_values_must_be_scalar() {
        assert_eq!(
            Predicate::eq("status", Value::Null),
            Err(QueryError::NonScalarValue("status".to_string()))
        );
        assert!(Predicate::eq("tags", json!(["a"])).is_err());
        assert!(Predicate::any_of("status", Vec::<String>::new()).is_err());
        assert!(Predicate::any_of("status", vec![json!({})]).is_err());
    }

    #[test]
    fn test_matching_semantics() {
        let doc = json!({ "role": "member", "status": "flagged", "weekNumber": 12 });

        assert!(Predicate::eq("role", "member").unwrap().matches(&doc));
        assert!(Predicate::eq("weekNumber", 12).unwrap().matches(&doc));
        assert!(!Predicate::eq("weekNumber", 13).unwrap().matches(&doc));
        assert!(Predicate::any_of("status", ["active", "flagged"])
            .unwrap()
            .matches(&doc));
        assert!(!Predicate::not("status", "flagged").unwrap().matches(&doc));
        assert!(Predicate::not("status", "removed").unwrap().matches(&doc));
        // absent fields never equal a value
        assert!(Predicate::not("email", "x").unwrap().matches(&doc));
        assert!(!Predicate::eq("email", "x").unwrap().matches(&doc));
    }

    #[test]
    fn test_query_is_a_conjunction() {
        let query = ListQuery::new()
            .filter(Predicate::eq("role", "member").unwrap())
            .filter(Predicate::not("status", "removed").unwrap());

        assert!(query.matches(&json!({ "role": "member", "status": "active" })));
        assert!(!query.matches(&json!({ "role": "member", "status": "removed" })));
        assert!(!query.matches(&json!({ "role": "founder", "status": "active" })));
    }
}
