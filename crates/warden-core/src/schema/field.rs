use super::{CollectionId, Ident};
use crate::stmt;

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone)]
pub struct Field {
    /// Uniquely identifies the field within its collection. Never changes.
    pub id: FieldId,

    /// Current logical name. Changes on rename; the old name stays reachable
    /// through an alias until it expires.
    pub name: String,

    pub display_name: String,

    pub ty: FieldType,

    /// Physical column storing the field.
    pub column: Ident,

    pub is_required: bool,

    pub is_unique: bool,

    pub is_indexed: bool,

    /// System fields exist on every collection and cannot be deleted.
    pub is_system: bool,

    /// Hidden fields are never projected or sorted on.
    pub is_hidden: bool,

    pub state: FieldState,

    pub relation: Option<Relation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FieldId(pub String);

/// Lifecycle state of a field that still has a physical column.
///
/// Hard-deleted fields have no state: they are removed from the registry
/// together with their column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldState {
    Active,

    /// Hidden from reads and blocked from writes; data is retained.
    SoftDeleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    Int,
    Float,
    Bool,
    Date,
    Datetime,
    Uuid,
    Relation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    pub target: CollectionId,

    /// Field of the target shown in place of the raw id.
    pub display_field: Option<String>,
}

impl Field {
    pub fn is_active(&self) -> bool {
        self.state == FieldState::Active
    }

    /// Active and not hidden.
    pub fn is_readable(&self) -> bool {
        self.is_active() && !self.is_hidden
    }
}

impl FieldType {
    /// The type of the values stored in the field's column. Relations store
    /// the integer id of the target record.
    pub fn value_ty(self) -> stmt::Type {
        match self {
            FieldType::String => stmt::Type::String,
            FieldType::Int | FieldType::Relation => stmt::Type::I64,
            FieldType::Float => stmt::Type::F64,
            FieldType::Bool => stmt::Type::Bool,
            FieldType::Date => stmt::Type::Date,
            FieldType::Datetime => stmt::Type::Timestamp,
            FieldType::Uuid => stmt::Type::Uuid,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Int => "int",
            FieldType::Float => "float",
            FieldType::Bool => "bool",
            FieldType::Date => "date",
            FieldType::Datetime => "datetime",
            FieldType::Uuid => "uuid",
            FieldType::Relation => "relation",
        }
    }

    pub fn is_ordered(self) -> bool {
        matches!(
            self,
            FieldType::String
                | FieldType::Int
                | FieldType::Float
                | FieldType::Date
                | FieldType::Datetime
        )
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
