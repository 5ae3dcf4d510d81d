use super::{Delimited, Formatter, Params, ToSql};

use warden_core::stmt;

/// An expression in operand position, carrying the type of the column it is
/// compared against so bound values can be typed.
struct Operand<'a> {
    expr: &'a stmt::Expr,
    ty: Option<&'a stmt::Type>,
}

impl ToSql for &stmt::Expr {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        use stmt::Expr::*;

        match self {
            And(expr) if expr.operands.is_empty() => fmt!(f, "TRUE"),
            And(expr) => {
                fmt!(f, "(" Delimited(&expr.operands, " AND ") ")");
            }
            Or(expr) if expr.operands.is_empty() => fmt!(f, "FALSE"),
            Or(expr) => {
                fmt!(f, "(" Delimited(&expr.operands, " OR ") ")");
            }
            Not(expr) => {
                let operand = &*expr.expr;
                fmt!(f, "NOT (" operand ")");
            }
            IsNotTrue(expr) => {
                let operand = &*expr.expr;
                fmt!(f, "(" operand ") IS NOT TRUE");
            }
            BinaryOp(expr) => {
                let (lhs_ty, rhs_ty) = operand_types(&expr.lhs, &expr.rhs);
                let lhs = Operand {
                    expr: &expr.lhs,
                    ty: lhs_ty,
                };
                let rhs = Operand {
                    expr: &expr.rhs,
                    ty: rhs_ty,
                };

                fmt!(f, lhs " " expr.op " " rhs);
            }
            Like(expr) => {
                let pattern = stmt::Value::from(&expr.pattern);
                let placeholder = f.params.push(&pattern, Some(&stmt::Type::String));

                let operand = &*expr.expr;
                fmt!(f, operand " LIKE " placeholder " ESCAPE '\\'");
            }
            Column(expr) => fmt!(f, &expr.name),
            Value(_) => fmt!(f, Operand { expr: self, ty: None }),
        }
    }
}

impl ToSql for Operand<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        match self.expr {
            stmt::Expr::Value(stmt::Value::Bool(true)) => fmt!(f, "TRUE"),
            stmt::Expr::Value(stmt::Value::Bool(false)) => fmt!(f, "FALSE"),
            stmt::Expr::Value(value) => {
                let placeholder = f.params.push(value, self.ty);
                fmt!(f, placeholder);
            }
            expr => fmt!(f, expr),
        }
    }
}

impl ToSql for stmt::BinaryOp {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        f.dst.push_str(match self {
            stmt::BinaryOp::Eq => "=",
            stmt::BinaryOp::Gt => ">",
            stmt::BinaryOp::Ge => ">=",
            stmt::BinaryOp::Lt => "<",
            stmt::BinaryOp::Le => "<=",
            stmt::BinaryOp::Ne => "<>",
        })
    }
}

/// Types each side of a comparison with the column on the other side.
fn operand_types<'a>(
    lhs: &'a stmt::Expr,
    rhs: &'a stmt::Expr,
) -> (Option<&'a stmt::Type>, Option<&'a stmt::Type>) {
    let ty = |expr: &'a stmt::Expr| match expr {
        stmt::Expr::Column(column) => Some(&column.ty),
        _ => None,
    };

    (ty(rhs), ty(lhs))
}
