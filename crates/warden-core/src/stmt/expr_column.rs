use super::{Expr, Type};
use crate::schema::Ident;

/// References a physical column of the statement's source table.
///
/// The name is an [`Ident`], so it has already been resolved through the
/// schema registry and validated as a safe identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExprColumn {
    pub name: Ident,
    pub ty: Type,
}

impl ExprColumn {
    pub fn new(name: Ident, ty: Type) -> ExprColumn {
        ExprColumn { name, ty }
    }
}

impl Expr {
    pub fn column(name: Ident, ty: Type) -> Expr {
        ExprColumn::new(name, ty).into()
    }
}

impl From<ExprColumn> for Expr {
    fn from(value: ExprColumn) -> Self {
        Self::Column(value)
    }
}
