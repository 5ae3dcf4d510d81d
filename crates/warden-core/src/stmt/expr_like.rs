use super::*;

/// Tests if the string expression matches a `LIKE` pattern.
///
/// The pattern is always built through [`Expr::contains`] or
/// [`Expr::starts_with`], which escape `%`, `_` and `\` in the user-supplied
/// text. Serializers must emit `ESCAPE '\'` alongside it.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprLike {
    pub expr: Box<Expr>,
    pub pattern: String,
}

impl Expr {
    pub fn contains(expr: impl Into<Self>, needle: &str) -> Self {
        ExprLike {
            expr: Box::new(expr.into()),
            pattern: format!("%{}%", like::escape(needle)),
        }
        .into()
    }

    pub fn starts_with(expr: impl Into<Self>, prefix: &str) -> Self {
        ExprLike {
            expr: Box::new(expr.into()),
            pattern: format!("{}%", like::escape(prefix)),
        }
        .into()
    }
}

impl From<ExprLike> for Expr {
    fn from(value: ExprLike) -> Self {
        Self::Like(value)
    }
}
