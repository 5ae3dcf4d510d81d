use super::{Direction, ExprColumn};

#[derive(Debug, Clone, PartialEq)]
pub struct OrderByExpr {
    /// The column to order by
    pub column: ExprColumn,

    /// Ascending or descending
    pub order: Direction,
}

impl OrderByExpr {
    pub fn asc(column: ExprColumn) -> OrderByExpr {
        OrderByExpr {
            column,
            order: Direction::Asc,
        }
    }

    pub fn desc(column: ExprColumn) -> OrderByExpr {
        OrderByExpr {
            column,
            order: Direction::Desc,
        }
    }
}
