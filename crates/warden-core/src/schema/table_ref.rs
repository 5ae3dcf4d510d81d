use super::Ident;

/// A physical table, optionally qualified by a namespace (a PostgreSQL schema
/// holding one project's tables).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableRef {
    pub namespace: Option<Ident>,
    pub name: Ident,
}
