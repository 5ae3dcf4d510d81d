use super::*;

/// `<expr> IS NOT TRUE`: holds when the operand is false or unknown.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprIsNotTrue {
    pub expr: Box<Expr>,
}

impl Expr {
    /// Two-valued negation. Unlike [`Expr::not`], a row where `expr` is
    /// unknown (a comparison against `NULL`) satisfies the result.
    pub fn is_not_true(expr: impl Into<Self>) -> Self {
        match expr.into() {
            expr if expr.is_true() => false.into(),
            expr if expr.is_false() => true.into(),
            expr => ExprIsNotTrue {
                expr: Box::new(expr),
            }
            .into(),
        }
    }
}

impl From<ExprIsNotTrue> for Expr {
    fn from(value: ExprIsNotTrue) -> Self {
        Self::IsNotTrue(value)
    }
}
