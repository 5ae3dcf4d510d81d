use super::{
    Alias, AliasKind, AliasResolution, AliasTarget, Builder, Collection, CollectionId,
    CollectionRef, FieldRef, Ident, Registry, TableRef,
};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use std::collections::HashMap;

/// Immutable snapshot of one project's schema.
#[derive(Debug, Default)]
pub struct Schema {
    /// Bumped by the registry on every schema mutation.
    pub version: u64,

    /// Namespace qualifying every physical table, if the store uses one.
    pub namespace: Option<Ident>,

    pub(super) collections: IndexMap<CollectionId, Collection>,

    /// Current name -> id
    pub(super) names: HashMap<String, CollectionId>,

    pub(super) aliases: Vec<Alias>,
}

impl Schema {
    pub fn builder() -> Builder {
        Builder::default()
    }

    pub fn collections(&self) -> impl ExactSizeIterator<Item = &Collection> + '_ {
        self.collections.values()
    }

    pub fn aliases(&self) -> &[Alias] {
        &self.aliases
    }

    fn table_ref(&self, collection: &Collection) -> TableRef {
        TableRef {
            namespace: self.namespace.clone(),
            name: collection.table.clone(),
        }
    }

    fn current_name(&self, target: &AliasTarget) -> Option<String> {
        match target {
            AliasTarget::Collection(id) => self.collections.get(id).map(|c| c.name.clone()),
            AliasTarget::Field { collection, field } => self
                .collections
                .get(collection)?
                .fields
                .iter()
                .find(|f| &f.id == field)
                .map(|f| f.name.clone()),
        }
    }
}

impl Registry for Schema {
    fn version(&self) -> u64 {
        self.version
    }

    fn resolve_collection(&self, name: &str) -> Option<CollectionRef<'_>> {
        let id = self.names.get(name)?;
        self.collection_by_id(id)
    }

    fn collection_by_id(&self, id: &CollectionId) -> Option<CollectionRef<'_>> {
        let collection = self.collections.get(id)?;

        Some(CollectionRef {
            collection,
            table: self.table_ref(collection),
        })
    }

    fn resolve_field(&self, collection: &CollectionId, name: &str) -> Option<FieldRef<'_>> {
        let field = self.collections.get(collection)?.field(name)?;
        Some(FieldRef { field })
    }

    fn resolve_alias(
        &self,
        kind: AliasKind<'_>,
        old_name: &str,
        at: DateTime<Utc>,
    ) -> AliasResolution {
        let mut expired = false;

        for alias in &self.aliases {
            if alias.old_name != old_name || !alias.applies_to(kind) {
                continue;
            }

            if alias.is_expired(at) {
                expired = true;
                continue;
            }

            if let Some(name) = self.current_name(&alias.target) {
                return AliasResolution::Current(name);
            }
        }

        if expired {
            AliasResolution::Expired
        } else {
            AliasResolution::Unknown
        }
    }
}
