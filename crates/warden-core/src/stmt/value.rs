use super::Type;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

#[derive(Debug, Default, Clone, PartialEq)]
pub enum Value {
    /// Null value
    #[default]
    Null,

    /// Boolean value
    Bool(bool),

    /// Signed 64-bit integer
    I64(i64),

    /// 64-bit float
    F64(f64),

    /// String value
    String(String),

    /// 128-bit universally unique identifier
    Uuid(Uuid),

    /// Calendar date
    Date(NaiveDate),

    /// Instant in UTC
    Timestamp(DateTime<Utc>),
}

impl Value {
    pub const fn null() -> Self {
        Self::Null
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Self::I64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Self::Bool(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the type of the value, or `None` for `Null`.
    pub fn ty(&self) -> Option<Type> {
        Some(match self {
            Self::Null => return None,
            Self::Bool(_) => Type::Bool,
            Self::I64(_) => Type::I64,
            Self::F64(_) => Type::F64,
            Self::String(_) => Type::String,
            Self::Uuid(_) => Type::Uuid,
            Self::Date(_) => Type::Date,
            Self::Timestamp(_) => Type::Timestamp,
        })
    }

    /// Converts a JSON value into a value of type `ty`.
    ///
    /// Strings are accepted for every type and parsed, since request
    /// parameters frequently arrive as query-string text. `null`, arrays and
    /// objects never convert.
    pub fn from_json(json: &serde_json::Value, ty: Type) -> Option<Value> {
        use serde_json::Value as Json;

        match (ty, json) {
            (Type::Bool, Json::Bool(v)) => Some(Value::Bool(*v)),
            (Type::Bool, Json::String(v)) => match v.as_str() {
                "true" => Some(Value::Bool(true)),
                "false" => Some(Value::Bool(false)),
                _ => None,
            },
            (Type::I64, Json::Number(v)) => v
                .as_i64()
                .or_else(|| v.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
                .map(Value::I64),
            (Type::I64, Json::String(v)) => v.trim().parse().ok().map(Value::I64),
            (Type::F64, Json::Number(v)) => v.as_f64().map(Value::F64),
            (Type::F64, Json::String(v)) => v.trim().parse().ok().map(Value::F64),
            (Type::String, Json::String(v)) => Some(Value::String(v.clone())),
            (Type::Uuid, Json::String(v)) => v.parse().ok().map(Value::Uuid),
            (Type::Date, Json::String(v)) => v.parse().ok().map(Value::Date),
            (Type::Timestamp, Json::String(v)) => DateTime::parse_from_rfc3339(v)
                .ok()
                .map(|v| Value::Timestamp(v.with_timezone(&Utc))),
            _ => None,
        }
    }

    /// Converts a value of another type into `ty`, e.g. a principal id string
    /// into a uuid column value.
    pub fn cast(self, ty: Type) -> Option<Value> {
        match (self, ty) {
            (value, ty) if value.ty() == Some(ty) => Some(value),
            (Value::String(v), Type::I64) => v.parse().ok().map(Value::I64),
            (Value::String(v), Type::Uuid) => v.parse().ok().map(Value::Uuid),
            (Value::I64(v), Type::F64) => Some(Value::F64(v as f64)),
            (Value::I64(v), Type::String) => Some(Value::String(v.to_string())),
            (Value::Uuid(v), Type::String) => Some(Value::String(v.to_string())),
            (Value::Timestamp(v), Type::Date) => Some(Value::Date(v.date_naive())),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(src: bool) -> Self {
        Self::Bool(src)
    }
}

impl From<i64> for Value {
    fn from(src: i64) -> Self {
        Self::I64(src)
    }
}

impl From<f64> for Value {
    fn from(src: f64) -> Self {
        Self::F64(src)
    }
}

impl From<String> for Value {
    fn from(src: String) -> Self {
        Self::String(src)
    }
}

impl From<&String> for Value {
    fn from(src: &String) -> Self {
        Self::String(src.clone())
    }
}

impl From<&str> for Value {
    fn from(src: &str) -> Self {
        Self::String(src.to_string())
    }
}

impl From<Uuid> for Value {
    fn from(src: Uuid) -> Self {
        Self::Uuid(src)
    }
}

impl From<NaiveDate> for Value {
    fn from(src: NaiveDate) -> Self {
        Self::Date(src)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(src: DateTime<Utc>) -> Self {
        Self::Timestamp(src)
    }
}

impl<T> From<Option<T>> for Value
where
    Value: From<T>,
{
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::from(value),
            None => Self::Null,
        }
    }
}

impl serde::Serialize for Value {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Bool(v) => serializer.serialize_bool(*v),
            Value::I64(v) => serializer.serialize_i64(*v),
            Value::F64(v) => serializer.serialize_f64(*v),
            Value::String(v) => serializer.serialize_str(v),
            Value::Uuid(v) => serializer.collect_str(v),
            Value::Date(v) => serializer.collect_str(&v.format("%Y-%m-%d")),
            Value::Timestamp(v) => serializer.serialize_str(&v.to_rfc3339()),
        }
    }
}
