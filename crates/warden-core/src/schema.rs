mod alias;
pub use alias::{Alias, AliasKind, AliasResolution, AliasTarget};

mod builder;
pub use builder::{Builder, CollectionDef, FieldDef};

mod collection;
pub use collection::{Collection, CollectionId, SYSTEM_FIELDS};

mod field;
pub use field::{Field, FieldId, FieldState, FieldType, Relation};

mod ident;
pub use ident::Ident;

mod registry;
pub use registry::{CollectionRef, FieldRef, Registry};

#[allow(clippy::module_inception)]
mod schema;
pub use schema::Schema;

mod table_ref;
pub use table_ref::TableRef;
