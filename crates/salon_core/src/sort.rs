//! Client-side sorting of loaded records.
//!
//! Sorting never touches the network. Values are normalized before
//! comparison: missing numbers become `0`, missing text becomes the empty
//! string, text compares case-insensitively and dates compare by timestamp.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, NaiveDate};
use serde_json::Value;
use thiserror::Error;

use crate::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Numeric,
    Text,
    Date,
}

/// A sortable column and how its values are compared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortField {
    pub key: String,
    pub kind: FieldKind,
}

impl SortField {
    pub fn new(key: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            key: key.into(),
            kind,
        }
    }

    /// Infers the comparison kind from the column name used by the admin API.
    pub fn infer(key: &str) -> Self {
        let kind = match key {
            "id" | "total_amount" | "amount" | "balance" | "discount" | "price" => {
                FieldKind::Numeric
            }
            k if k.ends_with("_count") || k.ends_with("_total") => FieldKind::Numeric,
            k if k.ends_with("_at") || k.ends_with("_date") || k == "date" => FieldKind::Date,
            _ => FieldKind::Text,
        };
        Self::new(key, kind)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SortSpecError {
    #[error("sort field is empty")]
    EmptyField,
    #[error("unknown sort direction {0:?}, expected asc or desc")]
    UnknownDirection(String),
}

/// Field plus direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Parses `field` or `field:asc|desc`.
    pub fn parse(raw: &str) -> Result<Self, SortSpecError> {
        let (key, direction) = match raw.split_once(':') {
            Some((key, dir)) => (key.trim(), parse_direction(dir.trim())?),
            None => (raw.trim(), SortDirection::Ascending),
        };
        if key.is_empty() {
            return Err(SortSpecError::EmptyField);
        }
        Ok(Self::new(SortField::infer(key), direction))
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dir = match self.direction {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        };
        write!(f, "{}:{}", self.field.key, dir)
    }
}

fn parse_direction(raw: &str) -> Result<SortDirection, SortSpecError> {
    match raw.to_ascii_lowercase().as_str() {
        "asc" | "ascending" => Ok(SortDirection::Ascending),
        "desc" | "descending" => Ok(SortDirection::Descending),
        _ => Err(SortSpecError::UnknownDirection(raw.to_string())),
    }
}

/// Normalized comparison key.
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    Number(f64),
    Text(String),
    Timestamp(i64),
}

impl SortKey {
    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            (SortKey::Timestamp(a), SortKey::Timestamp(b)) => a.cmp(b),
            // Mixed kinds only happen when a record type reports inconsistent
            // keys; order them by variant to keep the comparison total.
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            SortKey::Number(_) => 0,
            SortKey::Text(_) => 1,
            SortKey::Timestamp(_) => 2,
        }
    }
}

/// Anything that can report a normalized key for a sort field.
pub trait Sortable {
    fn sort_key(&self, field: &SortField) -> SortKey;
}

impl Sortable for Record {
    fn sort_key(&self, field: &SortField) -> SortKey {
        if field.key == "id" {
            return match &self.id {
                crate::RecordId::Int(id) => SortKey::Number(*id as f64),
                crate::RecordId::Text(id) => match field.kind {
                    FieldKind::Text => SortKey::Text(id.to_lowercase()),
                    _ => SortKey::Number(id.trim().parse().unwrap_or(0.0)),
                },
            };
        }
        normalize(self.get(&field.key), field.kind)
    }
}

/// Normalizes a raw JSON value for the given field kind.
pub fn normalize(value: Option<&Value>, kind: FieldKind) -> SortKey {
    match kind {
        FieldKind::Numeric => SortKey::Number(numeric(value)),
        FieldKind::Text => SortKey::Text(text(value).to_lowercase()),
        FieldKind::Date => SortKey::Timestamp(timestamp(value)),
    }
}

fn numeric(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        Some(Value::Bool(b)) => f64::from(u8::from(*b)),
        _ => 0.0,
    }
}

fn text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn timestamp(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::String(s)) => parse_timestamp(s).unwrap_or(0),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|ms| ms as i64))
            .unwrap_or(0),
        _ => 0,
    }
}

/// Milliseconds since the epoch for RFC 3339 timestamps or plain dates.
pub fn parse_timestamp(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp_millis());
    }
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc().timestamp_millis());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
}

/// Returns a new vector ordered by `spec`. The input is left untouched.
pub fn sort_records<T: Sortable + Clone>(records: &[T], spec: &SortSpec) -> Vec<T> {
    let mut keyed: Vec<(SortKey, &T)> = records
        .iter()
        .map(|record| (record.sort_key(&spec.field), record))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| {
        let ord = a.compare(b);
        match spec.direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
    keyed.into_iter().map(|(_, record)| record.clone()).collect()
}
