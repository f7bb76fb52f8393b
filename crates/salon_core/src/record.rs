use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identifier of a record, unique within its collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(id) => write!(f, "{id}"),
            RecordId::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        RecordId::Int(id)
    }
}

impl From<i32> for RecordId {
    fn from(id: i32) -> Self {
        RecordId::Int(i64::from(id))
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        RecordId::Text(id.to_string())
    }
}

/// A row of any admin collection. Only `id` is interpreted; every other key is
/// carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Record {
    pub fn new(id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            fields: Map::new(),
        }
    }

    /// Builder-style helper used by fixtures and tests.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Human-readable rendering of a field for tables; null and missing are empty.
    pub fn display_field(&self, key: &str) -> String {
        if key == "id" {
            return self.id.to_string();
        }
        match self.fields.get(key) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
        }
    }
}

/// The paginated list endpoints of the admin API.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Collection {
    Clients,
    Users,
    Broadcasts,
    BroadcastRecipients { broadcast_id: i64 },
    Promotions,
}

impl Collection {
    /// Endpoint path relative to the API base URL.
    pub fn path(&self) -> String {
        match self {
            Collection::Clients => "clients".to_string(),
            Collection::Users => "users".to_string(),
            Collection::Broadcasts => "broadcasts".to_string(),
            Collection::BroadcastRecipients { broadcast_id } => {
                format!("broadcasts/{broadcast_id}/recipients")
            }
            Collection::Promotions => "promotions".to_string(),
        }
    }

    /// Columns shown by default when listing this collection.
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Collection::Clients => &["id", "name", "phone", "visit_count", "total_amount"],
            Collection::Users => &["id", "name", "email", "role", "created_at"],
            Collection::Broadcasts => &["id", "title", "status", "scheduled_at"],
            Collection::BroadcastRecipients { .. } => &["id", "name", "phone", "status"],
            Collection::Promotions => &["id", "title", "status", "starts_at", "ends_at"],
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
