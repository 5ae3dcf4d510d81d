/// Storage-level type of a column or bound value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    Bool,
    I64,
    F64,
    String,
    Uuid,
    Date,
    Timestamp,
}

impl Type {
    pub fn is_numeric(self) -> bool {
        matches!(self, Type::I64 | Type::F64)
    }

    pub fn is_string(self) -> bool {
        matches!(self, Type::String)
    }
}
