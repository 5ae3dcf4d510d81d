use rusqlite::{
    types::{ToSql, ToSqlOutput, Value as SqlValue, ValueRef},
    Row,
};
use tracing::warn;
use warden_core::{
    stmt::{self, Value as CoreValue},
    Error, ExecutionFailure, Result,
};
use warden_sql::TypedValue;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

/// Dates are stored as ISO-8601 text.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Format of `datetime('now')` and `CURRENT_TIMESTAMP`, accepted on read.
const SQLITE_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug)]
pub struct Value(CoreValue);

impl From<CoreValue> for Value {
    fn from(value: CoreValue) -> Self {
        Self(value)
    }
}

impl From<TypedValue> for Value {
    fn from(value: TypedValue) -> Self {
        Self(value.value)
    }
}

/// Text form timestamps are stored and compared in. Fixed width, so text
/// order is chronological order.
pub fn timestamp_text(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

impl Value {
    /// Reads column `index` of `row` as a value of type `ty`.
    pub fn from_sql(row: &Row<'_>, index: usize, ty: stmt::Type) -> Result<CoreValue> {
        let value: SqlValue = row.get(index).map_err(|err| {
            warn!(error = %err, index, "failed to read sqlite column");
            Error::execution(ExecutionFailure::TypeMismatch)
        })?;

        let core_value = match (value, ty) {
            (SqlValue::Null, _) => Some(CoreValue::Null),
            (SqlValue::Integer(value), stmt::Type::Bool) => Some(CoreValue::Bool(value != 0)),
            (SqlValue::Integer(value), stmt::Type::I64) => Some(CoreValue::I64(value)),
            (SqlValue::Integer(value), stmt::Type::F64) => Some(CoreValue::F64(value as f64)),
            (SqlValue::Integer(value), stmt::Type::String) => {
                Some(CoreValue::String(value.to_string()))
            }
            (SqlValue::Real(value), stmt::Type::F64) => Some(CoreValue::F64(value)),
            (SqlValue::Real(value), stmt::Type::I64) if value.fract() == 0.0 => {
                Some(CoreValue::I64(value as i64))
            }
            (SqlValue::Text(value), stmt::Type::String) => Some(CoreValue::String(value)),
            (SqlValue::Text(value), ty) => parse_text(&value, ty),
            _ => None,
        };

        core_value.ok_or_else(|| {
            warn!(index, ?ty, "sqlite column does not match its declared type");
            Error::execution(ExecutionFailure::TypeMismatch)
        })
    }
}

fn parse_text(value: &str, ty: stmt::Type) -> Option<CoreValue> {
    match ty {
        stmt::Type::Uuid => value.parse().ok().map(CoreValue::Uuid),
        stmt::Type::Date => NaiveDate::parse_from_str(value, DATE_FORMAT)
            .ok()
            .map(CoreValue::Date),
        stmt::Type::Timestamp => DateTime::parse_from_rfc3339(value)
            .map(|value| value.with_timezone(&Utc))
            .or_else(|_| {
                NaiveDateTime::parse_from_str(value, SQLITE_DATETIME_FORMAT)
                    .map(|value| value.and_utc())
            })
            .ok()
            .map(CoreValue::Timestamp),
        stmt::Type::I64 => value.trim().parse().ok().map(CoreValue::I64),
        stmt::Type::F64 => value.trim().parse().ok().map(CoreValue::F64),
        stmt::Type::Bool => match value {
            "true" => Some(CoreValue::Bool(true)),
            "false" => Some(CoreValue::Bool(false)),
            _ => None,
        },
        stmt::Type::String => Some(CoreValue::String(value.to_string())),
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        use stmt::Value;

        Ok(match &self.0 {
            Value::Null => ToSqlOutput::Owned(SqlValue::Null),
            Value::Bool(v) => ToSqlOutput::Owned(SqlValue::Integer(*v as i64)),
            Value::I64(v) => ToSqlOutput::Owned(SqlValue::Integer(*v)),
            Value::F64(v) => ToSqlOutput::Owned(SqlValue::Real(*v)),
            Value::String(v) => ToSqlOutput::Borrowed(ValueRef::Text(v.as_bytes())),
            Value::Uuid(v) => ToSqlOutput::Owned(SqlValue::Text(v.to_string())),
            Value::Date(v) => ToSqlOutput::Owned(SqlValue::Text(v.format(DATE_FORMAT).to_string())),
            Value::Timestamp(v) => ToSqlOutput::Owned(SqlValue::Text(timestamp_text(v))),
        })
    }
}
