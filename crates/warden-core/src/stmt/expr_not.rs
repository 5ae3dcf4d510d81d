use super::*;

#[derive(Debug, Clone, PartialEq)]
pub struct ExprNot {
    pub expr: Box<Expr>,
}

impl Expr {
    pub fn not(expr: impl Into<Self>) -> Self {
        match expr.into() {
            expr if expr.is_true() => false.into(),
            expr if expr.is_false() => true.into(),
            Expr::Not(not) => *not.expr,
            expr => ExprNot {
                expr: Box::new(expr),
            }
            .into(),
        }
    }
}

impl From<ExprNot> for Expr {
    fn from(value: ExprNot) -> Self {
        Self::Not(value)
    }
}
