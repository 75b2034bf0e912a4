//! Runtime record values.
//!
//! [`Value`] mirrors the runtime subset of [`crate::schema::Schema`]: nested
//! records, arrays, and leaves. A leaf holds its text, or nothing when the
//! datum is absent (`null`), which is distinct from an empty string.

use std::{collections::BTreeMap, fmt};

use serde_json::Value as JsonValue;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Record(BTreeMap<String, Value>),
    Array(Vec<Value>),
    Leaf(Option<String>),
}

impl Value {
    pub fn text(text: impl Into<String>) -> Self {
        Value::Leaf(Some(text.into()))
    }

    pub fn absent() -> Self {
        Value::Leaf(None)
    }

    pub fn record<I, N>(fields: I) -> Self
    where
        I: IntoIterator<Item = (N, Value)>,
        N: Into<String>,
    {
        Value::Record(
            fields
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        )
    }

    pub fn array(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Array(items.into_iter().collect())
    }

    /// Looks up a field of a record value. `None` for non-records and for
    /// fields the record does not carry.
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Record(fields) => fields.get(name),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Leaf(None))
    }

    pub fn as_display(&self) -> String {
        match self {
            Value::Leaf(Some(text)) => text.clone(),
            other => other.to_string(),
        }
    }
}

impl From<&JsonValue> for Value {
    fn from(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null => Value::Leaf(None),
            JsonValue::Bool(flag) => Value::text(flag.to_string()),
            JsonValue::Number(number) => Value::text(number.to_string()),
            JsonValue::String(text) => Value::text(text.as_str()),
            JsonValue::Array(items) => Value::Array(items.iter().map(Value::from).collect()),
            JsonValue::Object(fields) => Value::Record(
                fields
                    .iter()
                    .map(|(name, value)| (name.clone(), Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<JsonValue> for Value {
    fn from(value: JsonValue) -> Self {
        Value::from(&value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Leaf(Some(text)) => f.write_str(text),
            Value::Leaf(None) => f.write_str("null"),
            Value::Array(items) => {
                f.write_str("[")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Record(fields) => {
                f.write_str("{")?;
                for (idx, (name, value)) in fields.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name:?}: {value}")?;
                }
                f.write_str("}")
            }
        }
    }
}
