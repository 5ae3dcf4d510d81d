use postgres_types::{accepts, private::BytesMut, to_sql_checked, IsNull, ToSql, Type};
use tokio_postgres::Row;
use tracing::warn;
use warden_core::{
    stmt::{self, Value as CoreValue},
    Error, ExecutionFailure, Result,
};
use warden_sql::TypedValue;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use uuid::Uuid;

type BoxError = Box<dyn std::error::Error + Sync + Send>;

#[derive(Debug)]
pub struct Value(CoreValue);

impl From<TypedValue> for Value {
    fn from(value: TypedValue) -> Self {
        Self(value.value)
    }
}

impl Value {
    /// Reads column `index` of `row` and converts it to `ty`.
    pub fn from_row(row: &Row, index: usize, ty: stmt::Type) -> Result<CoreValue> {
        let column_ty = row.columns()[index].type_().clone();

        let value = read(row, index, &column_ty).map_err(|err| {
            warn!(error = %err, index, column_ty = %column_ty, "failed to read postgresql column");
            Error::execution(ExecutionFailure::TypeMismatch)
        })?;

        if value.is_null() {
            return Ok(value);
        }

        value.cast(ty).ok_or_else(|| {
            warn!(index, column_ty = %column_ty, ?ty, "postgresql column does not match its declared type");
            Error::execution(ExecutionFailure::TypeMismatch)
        })
    }
}

fn read(row: &Row, index: usize, ty: &Type) -> std::result::Result<CoreValue, BoxError> {
    let value: CoreValue = match *ty {
        Type::BOOL => row.try_get::<_, Option<bool>>(index)?.into(),
        Type::INT2 => row.try_get::<_, Option<i16>>(index)?.map(i64::from).into(),
        Type::INT4 => row.try_get::<_, Option<i32>>(index)?.map(i64::from).into(),
        Type::INT8 => row.try_get::<_, Option<i64>>(index)?.into(),
        Type::FLOAT4 => row.try_get::<_, Option<f32>>(index)?.map(f64::from).into(),
        Type::FLOAT8 => row.try_get::<_, Option<f64>>(index)?.into(),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME => {
            row.try_get::<_, Option<String>>(index)?.into()
        }
        Type::UUID => row.try_get::<_, Option<Uuid>>(index)?.into(),
        Type::DATE => row.try_get::<_, Option<NaiveDate>>(index)?.into(),
        Type::TIMESTAMPTZ => row.try_get::<_, Option<DateTime<Utc>>>(index)?.into(),
        Type::TIMESTAMP => row
            .try_get::<_, Option<NaiveDateTime>>(index)?
            .map(|value| value.and_utc())
            .into(),
        _ => return Err(format!("unsupported column type {ty}").into()),
    };

    Ok(value)
}

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> std::result::Result<IsNull, BoxError>
    where
        Self: Sized,
    {
        match (&self.0, ty) {
            (stmt::Value::Null, _) => Ok(IsNull::Yes),
            (stmt::Value::Bool(value), _) => value.to_sql(ty, out),
            (stmt::Value::I64(value), &Type::INT2) => i16::try_from(*value)?.to_sql(ty, out),
            (stmt::Value::I64(value), &Type::INT4) => i32::try_from(*value)?.to_sql(ty, out),
            (stmt::Value::I64(value), &Type::INT8) => value.to_sql(ty, out),
            (stmt::Value::I64(value), &Type::FLOAT8) => (*value as f64).to_sql(ty, out),
            (stmt::Value::F64(value), &Type::FLOAT4) => (*value as f32).to_sql(ty, out),
            (stmt::Value::F64(value), &Type::FLOAT8) => value.to_sql(ty, out),
            (stmt::Value::String(value), _) => value.to_sql(ty, out),
            (stmt::Value::Uuid(value), &Type::UUID) => value.to_sql(ty, out),
            (stmt::Value::Uuid(value), _) => value.to_string().to_sql(ty, out),
            (stmt::Value::Date(value), &Type::DATE) => value.to_sql(ty, out),
            (stmt::Value::Timestamp(value), &Type::TIMESTAMPTZ) => value.to_sql(ty, out),
            (stmt::Value::Timestamp(value), &Type::TIMESTAMP) => value.naive_utc().to_sql(ty, out),
            (value, ty) => Err(format!("cannot bind {:?} as {ty}", value.ty()).into()),
        }
    }

    accepts!(
        BOOL,
        INT2,
        INT4,
        INT8,
        FLOAT4,
        FLOAT8,
        TEXT,
        VARCHAR,
        BPCHAR,
        UUID,
        DATE,
        TIMESTAMP,
        TIMESTAMPTZ
    );
    to_sql_checked!();
}
