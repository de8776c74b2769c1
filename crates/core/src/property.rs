//! Attribute descriptors and value validation.
//!
//! A descriptor is the type contract of one attribute: its primitive, whether
//! it identifies the record, and the checks a value must pass before it may be
//! stored. Validation never touches record state; callers validate first and
//! mutate only on success.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ModelError, ModelResult};
use crate::value::{AttributeValue, Value};

/// Primitive representation of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Primitive {
    String,
    Integer,
    Boolean,
    /// Raw bytes. Only string or byte content is accepted.
    Binary,
    DateTime,
    Uuid,
}

impl Primitive {
    pub fn name(self) -> &'static str {
        match self {
            Primitive::String => "string",
            Primitive::Integer => "integer",
            Primitive::Boolean => "boolean",
            Primitive::Binary => "binary",
            Primitive::DateTime => "datetime",
            Primitive::Uuid => "uuid",
        }
    }

    /// Coerce a raw value into this primitive's representation.
    ///
    /// Returns the rejection reason on failure.
    pub fn coerce(self, value: Value) -> Result<Value, String> {
        match (self, value) {
            (Primitive::String, v @ Value::String(_)) => Ok(v),

            (Primitive::Integer, v @ Value::Integer(_)) => Ok(v),
            (Primitive::Integer, Value::String(s)) => s
                .trim()
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|_| format!("`{s}` is not an integer")),

            (Primitive::Boolean, v @ Value::Boolean(_)) => Ok(v),
            (Primitive::Boolean, Value::Integer(1)) => Ok(Value::Boolean(true)),
            (Primitive::Boolean, Value::Integer(0)) => Ok(Value::Boolean(false)),
            (Primitive::Boolean, Value::String(s)) => {
                match s.trim().to_ascii_lowercase().as_str() {
                    "true" | "t" | "1" => Ok(Value::Boolean(true)),
                    "false" | "f" | "0" => Ok(Value::Boolean(false)),
                    _ => Err(format!("`{s}` is not a boolean")),
                }
            }

            (Primitive::Binary, v @ Value::Binary(_)) => Ok(v),
            (Primitive::Binary, Value::String(s)) => Ok(Value::Binary(s.into_bytes())),

            (Primitive::DateTime, v @ Value::DateTime(_)) => Ok(v),
            (Primitive::DateTime, Value::String(s)) => DateTime::parse_from_rfc3339(s.trim())
                .map(|dt| Value::DateTime(dt.with_timezone(&Utc)))
                .map_err(|e| format!("`{s}` is not an RFC 3339 timestamp: {e}")),

            (Primitive::Uuid, v @ Value::Uuid(_)) => Ok(v),
            (Primitive::Uuid, Value::String(s)) => Uuid::parse_str(s.trim())
                .map(Value::Uuid)
                .map_err(|e| format!("`{s}` is not a uuid: {e}")),

            (primitive, other) => Err(format!(
                "expected {}, got {}",
                primitive.name(),
                other.type_name()
            )),
        }
    }
}

/// Type contract of a single attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDescriptor {
    name: String,
    primitive: Primitive,
    is_key: bool,
    required: bool,
    serial: bool,
    default: Option<Value>,
    max_length: Option<usize>,
}

impl AttributeDescriptor {
    pub fn new(name: impl Into<String>, primitive: Primitive) -> Self {
        Self {
            name: name.into(),
            primitive,
            is_key: false,
            required: false,
            serial: false,
            default: None,
            max_length: None,
        }
    }

    /// Auto-incrementing integer key, assigned by the adapter on create.
    pub fn serial(name: impl Into<String>) -> Self {
        Self {
            is_key: true,
            required: true,
            serial: true,
            ..Self::new(name, Primitive::Integer)
        }
    }

    /// Mark the attribute as (part of) the record's identity. Keys are required.
    pub fn key(mut self) -> Self {
        self.is_key = true;
        self.required = true;
        self
    }

    /// Reject `Null` assignments.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Value written for this attribute when a new record is saved without it.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Upper bound on string characters or binary bytes.
    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn primitive(&self) -> Primitive {
        self.primitive
    }

    pub fn is_key(&self) -> bool {
        self.is_key
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_serial(&self) -> bool {
        self.serial
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Validate and coerce a value for assignment to this attribute.
    ///
    /// The `Unset` marker is never assignable: only construction produces it.
    pub fn validate(&self, value: AttributeValue) -> ModelResult<AttributeValue> {
        match value {
            AttributeValue::Unset => Err(ModelError::invalid_value(
                &self.name,
                "the unset marker cannot be assigned",
            )),
            AttributeValue::Null if self.required => {
                Err(ModelError::invalid_value(&self.name, "value is required"))
            }
            AttributeValue::Null => Ok(AttributeValue::Null),
            AttributeValue::Value(raw) => {
                let coerced = self
                    .primitive
                    .coerce(raw)
                    .map_err(|reason| ModelError::invalid_value(&self.name, reason))?;
                self.check_length(&coerced)?;
                Ok(AttributeValue::Value(coerced))
            }
        }
    }

    fn check_length(&self, value: &Value) -> ModelResult<()> {
        let Some(max) = self.max_length else {
            return Ok(());
        };
        let len = match value {
            Value::String(s) => s.chars().count(),
            Value::Binary(b) => b.len(),
            _ => return Ok(()),
        };
        if len > max {
            return Err(ModelError::invalid_value(
                &self.name,
                format!("length {len} exceeds maximum of {max}"),
            ));
        }
        Ok(())
    }
}

/// Validate `value` against `descriptor`.
pub fn validate(descriptor: &AttributeDescriptor, value: AttributeValue) -> ModelResult<AttributeValue> {
    descriptor.validate(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn title(primitive: Primitive) -> AttributeDescriptor {
        AttributeDescriptor::new("title", primitive)
    }

    #[test]
    fn binary_accepts_string_content() {
        let coerced = title(Primitive::Binary).validate("value".into()).unwrap();
        assert_eq!(coerced, AttributeValue::Value(Value::Binary(b"value".to_vec())));
    }

    #[test]
    fn binary_rejects_numeric_literal() {
        let err = title(Primitive::Binary)
            .validate(AttributeValue::Value(Value::Integer(1)))
            .unwrap_err();
        match err {
            ModelError::InvalidValue { attribute, reason } => {
                assert_eq!(attribute, "title");
                assert!(reason.contains("expected binary"));
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn integer_typecasts_numeric_strings() {
        let coerced = title(Primitive::Integer).validate(" 42 ".into()).unwrap();
        assert_eq!(coerced, AttributeValue::Value(Value::Integer(42)));
        assert!(title(Primitive::Integer).validate("forty".into()).is_err());
    }

    #[test]
    fn boolean_typecasts_common_spellings() {
        let d = title(Primitive::Boolean);
        assert_eq!(d.validate("t".into()).unwrap(), AttributeValue::from(true));
        assert_eq!(
            d.validate(AttributeValue::Value(Value::Integer(0))).unwrap(),
            AttributeValue::from(false)
        );
        assert!(d.validate("maybe".into()).is_err());
    }

    #[test]
    fn datetime_and_uuid_parse_strings() {
        let at = title(Primitive::DateTime)
            .validate("2024-05-01T12:00:00+02:00".into())
            .unwrap();
        assert_eq!(
            at.as_value().unwrap().to_string(),
            "2024-05-01T10:00:00+00:00"
        );

        let id = Uuid::now_v7();
        let coerced = title(Primitive::Uuid).validate(id.to_string().into()).unwrap();
        assert_eq!(coerced, AttributeValue::from(id));
    }

    #[test]
    fn null_respects_required_flag() {
        assert_eq!(
            title(Primitive::String).validate(AttributeValue::Null).unwrap(),
            AttributeValue::Null
        );
        assert!(title(Primitive::String).required().validate(AttributeValue::Null).is_err());
        assert!(title(Primitive::String).key().validate(AttributeValue::Null).is_err());
    }

    #[test]
    fn unset_marker_is_never_assignable() {
        assert!(title(Primitive::String).validate(AttributeValue::Unset).is_err());
    }

    #[test]
    fn max_length_counts_characters() {
        let d = title(Primitive::String).max_length(3);
        assert!(d.validate("äöü".into()).is_ok());
        assert!(d.validate("abcd".into()).is_err());
    }

    #[test]
    fn serial_is_a_required_integer_key() {
        let id = AttributeDescriptor::serial("id");
        assert_eq!(id.primitive(), Primitive::Integer);
        assert!(id.is_key() && id.is_serial() && id.is_required());
    }
}
