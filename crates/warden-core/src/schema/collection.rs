use super::{Field, FieldType, Ident};

use serde::{Deserialize, Serialize};

/// Fields every collection carries, in column order.
pub const SYSTEM_FIELDS: [(&str, FieldType); 5] = [
    ("id", FieldType::Int),
    ("created_at", FieldType::Datetime),
    ("updated_at", FieldType::Datetime),
    ("created_by_user_id", FieldType::String),
    ("created_by_app_user_id", FieldType::String),
];

/// A runtime-defined logical table.
#[derive(Debug, Clone)]
pub struct Collection {
    /// Immutable identity of the collection
    pub id: CollectionId,

    /// Current name, unique within the project
    pub name: String,

    pub display_name: String,

    /// Physical table storing the collection's records
    pub table: Ident,

    /// Inactive collections cannot be queried
    pub active: bool,

    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CollectionId(pub String);

impl Collection {
    /// Finds a field by logical name, falling back to its column name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .or_else(|| self.fields.iter().find(|field| field.column.as_str() == name))
    }

    /// Fields that may appear in a projection or sort, in column order.
    pub fn readable_fields(&self) -> impl Iterator<Item = &Field> + '_ {
        self.fields.iter().filter(|field| field.is_readable())
    }
}

impl From<&str> for CollectionId {
    fn from(value: &str) -> Self {
        CollectionId(value.to_string())
    }
}

impl std::fmt::Display for CollectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
