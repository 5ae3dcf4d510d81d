use super::{
    Alias, AliasTarget, Collection, CollectionId, Field, FieldId, FieldState, FieldType, Ident,
    Relation, Schema, SYSTEM_FIELDS,
};
use crate::{Error, Result};

use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};

/// Assembles a [`Schema`] snapshot, validating every physical identifier.
#[derive(Debug, Default)]
pub struct Builder {
    version: u64,
    namespace: Option<String>,
    collections: Vec<CollectionDef>,
    aliases: Vec<Alias>,
}

/// Unvalidated collection definition.
#[derive(Debug, Clone)]
pub struct CollectionDef {
    id: CollectionId,
    name: String,
    display_name: Option<String>,
    table: Option<String>,
    active: bool,
    fields: Vec<FieldDef>,
}

/// Unvalidated field definition.
#[derive(Debug, Clone)]
pub struct FieldDef {
    id: Option<FieldId>,
    name: String,
    display_name: Option<String>,
    ty: FieldType,
    column: Option<String>,
    is_required: bool,
    is_unique: bool,
    is_indexed: bool,
    is_hidden: bool,
    state: FieldState,
    relation: Option<Relation>,
}

impl Builder {
    pub fn version(&mut self, version: u64) -> &mut Self {
        self.version = version;
        self
    }

    pub fn namespace(&mut self, namespace: impl Into<String>) -> &mut Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn collection(&mut self, collection: CollectionDef) -> &mut Self {
        self.collections.push(collection);
        self
    }

    pub fn alias(&mut self, alias: Alias) -> &mut Self {
        self.aliases.push(alias);
        self
    }

    pub fn build(&self) -> Result<Schema> {
        let namespace = self.namespace.as_deref().map(Ident::new).transpose()?;

        let mut collections = IndexMap::new();
        let mut names = HashMap::new();
        let mut tables = HashSet::new();

        for def in &self.collections {
            let collection = def
                .build()
                .map_err(|err| err.context(crate::err!("collection `{}`", def.name)))?;

            if names
                .insert(collection.name.clone(), collection.id.clone())
                .is_some()
            {
                return Err(Error::invalid_schema(format!(
                    "duplicate collection name `{}`",
                    collection.name
                )));
            }

            if !tables.insert(collection.table.clone()) {
                return Err(Error::invalid_schema(format!(
                    "table `{}` is used by more than one collection",
                    collection.table
                )));
            }

            if collections
                .insert(collection.id.clone(), collection)
                .is_some()
            {
                return Err(Error::invalid_schema(format!(
                    "duplicate collection id `{}`",
                    def.id
                )));
            }
        }

        for alias in &self.aliases {
            let exists = match &alias.target {
                AliasTarget::Collection(id) => collections.contains_key(id),
                AliasTarget::Field { collection, field } => collections
                    .get(collection)
                    .is_some_and(|c: &Collection| c.fields.iter().any(|f| &f.id == field)),
            };

            if !exists {
                return Err(Error::invalid_schema(format!(
                    "alias `{}` points at a missing entity",
                    alias.old_name
                )));
            }
        }

        Ok(Schema {
            version: self.version,
            namespace,
            collections,
            names,
            aliases: self.aliases.clone(),
        })
    }
}

impl CollectionDef {
    pub fn new(id: impl Into<CollectionId>, name: impl Into<String>) -> CollectionDef {
        CollectionDef {
            id: id.into(),
            name: name.into(),
            display_name: None,
            table: None,
            active: true,
            fields: vec![],
        }
    }

    pub fn display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Physical table. Defaults to the collection name.
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    fn build(&self) -> Result<Collection> {
        let table = Ident::new(self.table.as_deref().unwrap_or(&self.name))?;

        let system = SYSTEM_FIELDS.iter().map(|(name, ty)| {
            let mut def = FieldDef::new(*name, *ty);
            def.is_required = *name == "id";
            def.is_unique = *name == "id";
            def.is_indexed = *name == "id";
            (def, true)
        });

        let user = self.fields.iter().cloned().map(|def| (def, false));

        let mut fields: Vec<Field> = vec![];
        let mut names = HashSet::new();
        let mut columns = HashSet::new();

        for (def, is_system) in system.chain(user) {
            let field = def.build(is_system)?;

            if !names.insert(field.name.clone()) || !columns.insert(field.column.clone()) {
                return Err(Error::invalid_schema(format!(
                    "duplicate field `{}`",
                    field.name
                )));
            }

            fields.push(field);
        }

        Ok(Collection {
            id: self.id.clone(),
            name: self.name.clone(),
            display_name: self.display_name.clone().unwrap_or_else(|| self.name.clone()),
            table,
            active: self.active,
            fields,
        })
    }
}

impl FieldDef {
    pub fn new(name: impl Into<String>, ty: FieldType) -> FieldDef {
        FieldDef {
            id: None,
            name: name.into(),
            display_name: None,
            ty,
            column: None,
            is_required: false,
            is_unique: false,
            is_indexed: false,
            is_hidden: false,
            state: FieldState::Active,
            relation: None,
        }
    }

    /// Stable identity. Defaults to the field name.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(FieldId(id.into()));
        self
    }

    pub fn display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Physical column. Defaults to the field name.
    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.is_required = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.is_unique = true;
        self
    }

    pub fn indexed(mut self) -> Self {
        self.is_indexed = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.is_hidden = true;
        self
    }

    pub fn soft_deleted(mut self) -> Self {
        self.state = FieldState::SoftDeleted;
        self
    }

    pub fn relation(mut self, target: impl Into<CollectionId>) -> Self {
        self.relation = Some(Relation {
            target: target.into(),
            display_field: None,
        });
        self
    }

    fn build(self, is_system: bool) -> Result<Field> {
        let column = Ident::new(self.column.as_deref().unwrap_or(&self.name))?;

        if self.ty == FieldType::Relation && self.relation.is_none() {
            return Err(Error::invalid_schema(format!(
                "relation field `{}` has no target collection",
                self.name
            )));
        }

        Ok(Field {
            id: self.id.unwrap_or_else(|| FieldId(self.name.clone())),
            display_name: self.display_name.unwrap_or_else(|| self.name.clone()),
            name: self.name,
            ty: self.ty,
            column,
            is_required: self.is_required,
            is_unique: self.is_unique,
            is_indexed: self.is_indexed,
            is_system,
            is_hidden: self.is_hidden,
            state: self.state,
            relation: self.relation,
        })
    }
}
