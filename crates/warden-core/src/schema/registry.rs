use super::{
    AliasKind, AliasResolution, Collection, CollectionId, Field, FieldType, Ident, TableRef,
};

use chrono::{DateTime, Utc};

/// Read interface over a project's runtime schema.
///
/// The compilers only ever reach the schema through this trait, and only
/// ever receive physical names as validated [`Ident`]s.
pub trait Registry: Send + Sync {
    /// Version of the snapshot. Changes with every schema mutation.
    fn version(&self) -> u64;

    /// Finds a collection by its current name.
    fn resolve_collection(&self, name: &str) -> Option<CollectionRef<'_>>;

    fn collection_by_id(&self, id: &CollectionId) -> Option<CollectionRef<'_>>;

    /// Finds a field by its current name or its physical column.
    fn resolve_field(&self, collection: &CollectionId, name: &str) -> Option<FieldRef<'_>>;

    fn resolve_alias(
        &self,
        kind: AliasKind<'_>,
        old_name: &str,
        at: DateTime<Utc>,
    ) -> AliasResolution;

    /// Resolves a collection name, following an unexpired rename alias.
    fn lookup_collection(&self, name: &str, at: DateTime<Utc>) -> Option<CollectionRef<'_>> {
        if let Some(collection) = self.resolve_collection(name) {
            return Some(collection);
        }

        match self.resolve_alias(AliasKind::Collection, name, at) {
            AliasResolution::Current(current) => self.resolve_collection(&current),
            AliasResolution::Expired | AliasResolution::Unknown => None,
        }
    }

    /// Resolves a field name: direct name, then physical column, then an
    /// unexpired rename alias.
    fn lookup_field(
        &self,
        collection: &CollectionId,
        name: &str,
        at: DateTime<Utc>,
    ) -> Option<FieldRef<'_>> {
        if let Some(field) = self.resolve_field(collection, name) {
            return Some(field);
        }

        match self.resolve_alias(AliasKind::Field(collection), name, at) {
            AliasResolution::Current(current) => self.resolve_field(collection, &current),
            AliasResolution::Expired | AliasResolution::Unknown => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CollectionRef<'a> {
    pub collection: &'a Collection,

    /// Fully qualified physical table
    pub table: TableRef,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRef<'a> {
    pub field: &'a Field,
}

impl<'a> CollectionRef<'a> {
    pub fn id(&self) -> &'a CollectionId {
        &self.collection.id
    }

    pub fn name(&self) -> &'a str {
        &self.collection.name
    }

    pub fn is_active(&self) -> bool {
        self.collection.active
    }
}

impl<'a> FieldRef<'a> {
    pub fn name(&self) -> &'a str {
        &self.field.name
    }

    pub fn column(&self) -> &'a Ident {
        &self.field.column
    }

    pub fn ty(&self) -> FieldType {
        self.field.ty
    }

    pub fn is_active(&self) -> bool {
        self.field.is_active()
    }

    pub fn is_readable(&self) -> bool {
        self.field.is_readable()
    }
}
