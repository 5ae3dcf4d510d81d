use crate::{schema::TableRef, stmt::Expr};

/// `SELECT COUNT(*) FROM <source> WHERE <filter>`
#[derive(Debug, Clone, PartialEq)]
pub struct Count {
    pub source: TableRef,
    pub filter: Expr,
}
