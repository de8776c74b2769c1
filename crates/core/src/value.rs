//! Attribute values.
//!
//! A record slot holds an [`AttributeValue`]: either the `Unset` marker (never
//! assigned since construction), an explicit `Null`, or a concrete [`Value`].
//! `Unset` and `Null` are distinct so that "not supplied" and "supplied as
//! nil" can be told apart by the state tracker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A concrete, non-null primitive value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    String(String),
    Integer(i64),
    Boolean(bool),
    Binary(Vec<u8>),
    DateTime(DateTime<Utc>),
    Uuid(Uuid),
}

impl Value {
    /// Short name of the value's variant, used in validation messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Integer(_) => "integer",
            Value::Boolean(_) => "boolean",
            Value::Binary(_) => "binary",
            Value::DateTime(_) => "datetime",
            Value::Uuid(_) => "uuid",
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }
}

impl core::fmt::Display for Value {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Value::String(v) => f.write_str(v),
            Value::Integer(v) => write!(f, "{v}"),
            Value::Boolean(v) => write!(f, "{v}"),
            Value::Binary(v) => write!(f, "<{} bytes>", v.len()),
            Value::DateTime(v) => write!(f, "{}", v.to_rfc3339()),
            Value::Uuid(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Binary(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::DateTime(value)
    }
}

impl From<Uuid> for Value {
    fn from(value: Uuid) -> Self {
        Value::Uuid(value)
    }
}

/// Content of one attribute slot on a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeValue {
    /// Never assigned since the record was constructed.
    #[default]
    Unset,
    /// Explicitly assigned nil.
    Null,
    Value(Value),
}

impl AttributeValue {
    pub fn is_unset(&self) -> bool {
        matches!(self, AttributeValue::Unset)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            AttributeValue::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            AttributeValue::Value(v) => Some(v),
            _ => None,
        }
    }
}

impl From<Value> for AttributeValue {
    fn from(value: Value) -> Self {
        AttributeValue::Value(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for AttributeValue {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => AttributeValue::Value(v.into()),
            None => AttributeValue::Null,
        }
    }
}

macro_rules! impl_attribute_value_from {
    ($($t:ty),* $(,)?) => {
        $(
            impl From<$t> for AttributeValue {
                fn from(value: $t) -> Self {
                    AttributeValue::Value(Value::from(value))
                }
            }
        )*
    };
}

impl_attribute_value_from!(&str, String, i64, bool, Vec<u8>, DateTime<Utc>, Uuid);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_and_null_are_distinct() {
        assert_ne!(AttributeValue::Unset, AttributeValue::Null);
        assert_eq!(AttributeValue::default(), AttributeValue::Unset);
    }

    #[test]
    fn none_converts_to_null() {
        let value: AttributeValue = Option::<i64>::None.into();
        assert!(value.is_null());
        let value: AttributeValue = Some(25_i64).into();
        assert_eq!(value, AttributeValue::Value(Value::Integer(25)));
    }

    #[test]
    fn values_serialize_with_type_tags() {
        let json = serde_json::to_value(Value::Integer(100)).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "integer", "value": 100 }));
    }
}
