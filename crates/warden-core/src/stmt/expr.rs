use super::*;

/// A boolean or scalar expression over the columns of a single table.
///
/// The expression tree is deliberately small: it can only describe what the
/// predicate compiler is able to produce, so every shape it can take has a
/// known, parameterized SQL rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// AND a set of boolean expressions
    And(ExprAnd),

    /// Binary comparison
    BinaryOp(ExprBinaryOp),

    /// References a column of the source table
    Column(ExprColumn),

    /// True unless the operand is true
    IsNotTrue(ExprIsNotTrue),

    /// Checks if a string expression matches an escaped `LIKE` pattern
    Like(ExprLike),

    /// Negates a boolean expression
    Not(ExprNot),

    /// OR a set of boolean expressions
    Or(ExprOr),

    /// A constant value. Serialized as a bound parameter unless it is a
    /// boolean.
    Value(Value),
}

impl Expr {
    /// Returns true if the expression is the `true` boolean expression
    pub fn is_true(&self) -> bool {
        matches!(self, Self::Value(Value::Bool(true)))
    }

    /// Returns true if the expression is the `false` boolean expression
    pub fn is_false(&self) -> bool {
        matches!(self, Self::Value(Value::Bool(false)))
    }

    /// Returns true if the expression is a constant value.
    pub fn is_value(&self) -> bool {
        matches!(self, Self::Value(_))
    }

    /// Calls `f` with every column referenced by the expression.
    pub fn for_each_column(&self, f: &mut impl FnMut(&ExprColumn)) {
        match self {
            Expr::And(expr) => expr.iter().for_each(|e| e.for_each_column(f)),
            Expr::Or(expr) => expr.iter().for_each(|e| e.for_each_column(f)),
            Expr::Not(expr) => expr.expr.for_each_column(f),
            Expr::IsNotTrue(expr) => expr.expr.for_each_column(f),
            Expr::BinaryOp(expr) => {
                expr.lhs.for_each_column(f);
                expr.rhs.for_each_column(f);
            }
            Expr::Like(expr) => expr.expr.for_each_column(f),
            Expr::Column(expr) => f(expr),
            Expr::Value(_) => {}
        }
    }
}

impl Default for Expr {
    fn default() -> Self {
        Self::Value(Value::Bool(true))
    }
}

impl From<bool> for Expr {
    fn from(value: bool) -> Self {
        Self::Value(Value::Bool(value))
    }
}

impl From<Value> for Expr {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<i64> for Expr {
    fn from(value: i64) -> Self {
        Self::Value(value.into())
    }
}

impl From<&str> for Expr {
    fn from(value: &str) -> Self {
        Self::Value(value.into())
    }
}

impl From<String> for Expr {
    fn from(value: String) -> Self {
        Self::Value(value.into())
    }
}
