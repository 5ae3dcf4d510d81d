use postgres_types::Type;
use warden_core::stmt;

pub trait TypeExt {
    /// Converts a bound value type to the PostgreSQL type it is sent as.
    fn to_postgres_type(&self) -> Type;
}

impl TypeExt for stmt::Type {
    fn to_postgres_type(&self) -> Type {
        match self {
            stmt::Type::Bool => Type::BOOL,
            stmt::Type::I64 => Type::INT8,
            stmt::Type::F64 => Type::FLOAT8,
            stmt::Type::String => Type::TEXT,
            stmt::Type::Uuid => Type::UUID,
            stmt::Type::Date => Type::DATE,
            stmt::Type::Timestamp => Type::TIMESTAMPTZ,
        }
    }
}
