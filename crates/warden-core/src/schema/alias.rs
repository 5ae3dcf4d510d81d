use super::{CollectionId, FieldId};

use chrono::{DateTime, Utc};

/// Maps the name an entity had before a rename to the entity itself, for a
/// grace period.
#[derive(Debug, Clone)]
pub struct Alias {
    pub old_name: String,
    pub target: AliasTarget,

    /// `None` keeps the alias alive until it is removed.
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AliasTarget {
    Collection(CollectionId),
    Field {
        collection: CollectionId,
        field: FieldId,
    },
}

/// What kind of entity an old name is looked up for.
#[derive(Debug, Clone, Copy)]
pub enum AliasKind<'a> {
    Collection,
    Field(&'a CollectionId),
}

#[derive(Debug, Clone, PartialEq)]
pub enum AliasResolution {
    /// The entity's current name
    Current(String),

    /// The alias existed but its grace period is over
    Expired,

    Unknown,
}

impl Alias {
    pub fn collection(
        old_name: impl Into<String>,
        collection: impl Into<CollectionId>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Alias {
        Alias {
            old_name: old_name.into(),
            target: AliasTarget::Collection(collection.into()),
            expires_at,
        }
    }

    pub fn field(
        old_name: impl Into<String>,
        collection: impl Into<CollectionId>,
        field: FieldId,
        expires_at: Option<DateTime<Utc>>,
    ) -> Alias {
        Alias {
            old_name: old_name.into(),
            target: AliasTarget::Field {
                collection: collection.into(),
                field,
            },
            expires_at,
        }
    }

    pub fn is_expired(&self, at: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= at)
    }

    pub(crate) fn applies_to(&self, kind: AliasKind<'_>) -> bool {
        match (&self.target, kind) {
            (AliasTarget::Collection(_), AliasKind::Collection) => true,
            (AliasTarget::Field { collection, .. }, AliasKind::Field(id)) => collection == id,
            _ => false,
        }
    }
}
