use super::{ExprColumn, Limit, OrderByExpr};
use crate::{schema::TableRef, stmt::Expr};

/// `SELECT <returning> FROM <source> WHERE <filter> ORDER BY .. LIMIT ..`
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    /// Table to read from
    pub source: TableRef,

    /// Columns returned for each row
    pub returning: Vec<ExprColumn>,

    /// Row filter
    pub filter: Expr,

    pub order_by: Vec<OrderByExpr>,

    pub limit: Option<Limit>,
}
