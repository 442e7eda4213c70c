use std::fmt;

use serde::{ser::SerializeMap, Serialize, Serializer};
use serde_json::{Number, Value};

/// Display value of a single record.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordValue {
    Text(String),
    Number(Number),
    Bool(bool),
    Null,
    /// Arrays and objects, shown as compact JSON.
    Structured(Value),
}

impl RecordValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }
}

impl From<Value> for RecordValue {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => Self::Text(s),
            Value::Number(n) => Self::Number(n),
            Value::Bool(b) => Self::Bool(b),
            Value::Null => Self::Null,
            other => Self::Structured(other),
        }
    }
}

impl From<RecordValue> for Value {
    fn from(value: RecordValue) -> Self {
        match value {
            RecordValue::Text(s) => Value::String(s),
            RecordValue::Number(n) => Value::Number(n),
            RecordValue::Bool(b) => Value::Bool(b),
            RecordValue::Null => Value::Null,
            RecordValue::Structured(v) => v,
        }
    }
}

impl From<&str> for RecordValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl fmt::Display for RecordValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => fmt_number(n, f),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Null => f.write_str("null"),
            Self::Structured(v) => write!(f, "{v}"),
        }
    }
}

/// Integral floats print without a trailing `.0`, so `21.0` shows as `21`.
fn fmt_number(n: &Number, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match n.as_f64() {
        Some(v) if n.is_f64() && v.fract() == 0.0 && v.abs() < 1e15 => {
            write!(f, "{}", v as i64)
        }
        _ => write!(f, "{n}"),
    }
}

/// One `{title: value}` entry of a payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub title: String,
    pub value: RecordValue,
}

impl Record {
    pub fn new(title: impl Into<String>, value: impl Into<RecordValue>) -> Self {
        Self {
            title: title.into(),
            value: value.into(),
        }
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.title, &Value::from(self.value.clone()))?;
        map.end()
    }
}

/// Ordered records as served by the data endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Payload(pub Vec<Record>);

impl Payload {
    pub fn records(&self) -> &[Record] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl IntoIterator for Payload {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<Record> for Payload {
    fn from_iter<T: IntoIterator<Item = Record>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
