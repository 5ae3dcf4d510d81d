use super::{like, BinaryOp, Expr, Value};

use std::cmp::Ordering;
use std::collections::HashMap;

use indexmap::IndexMap;

/// Column lookup used when evaluating an expression against an in-memory
/// row. Missing columns read as `Null`.
pub trait Row {
    fn column(&self, name: &str) -> Option<&Value>;
}

impl Row for HashMap<String, Value> {
    fn column(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

impl Row for IndexMap<String, Value> {
    fn column(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

impl Row for [(&str, Value)] {
    fn column(&self, name: &str) -> Option<&Value> {
        self.iter().find(|(k, _)| *k == name).map(|(_, v)| v)
    }
}

impl<const N: usize> Row for [(&str, Value); N] {
    fn column(&self, name: &str) -> Option<&Value> {
        self[..].column(name)
    }
}

impl Expr {
    /// Returns `true` if the row satisfies the expression, using SQL
    /// three-valued logic: comparisons involving `Null` are unknown, and
    /// unknown does not match.
    pub fn matches(&self, row: &(impl Row + ?Sized)) -> bool {
        self.eval_bool(row) == Some(true)
    }

    fn eval_bool(&self, row: &(impl Row + ?Sized)) -> Option<bool> {
        match self {
            Expr::And(expr) => {
                let mut ret = Some(true);
                for operand in expr {
                    match operand.eval_bool(row) {
                        Some(false) => return Some(false),
                        None => ret = None,
                        Some(true) => {}
                    }
                }
                ret
            }
            Expr::Or(expr) => {
                let mut ret = Some(false);
                for operand in expr {
                    match operand.eval_bool(row) {
                        Some(true) => return Some(true),
                        None => ret = None,
                        Some(false) => {}
                    }
                }
                ret
            }
            Expr::Not(expr) => expr.expr.eval_bool(row).map(|v| !v),
            Expr::IsNotTrue(expr) => Some(expr.expr.eval_bool(row) != Some(true)),
            Expr::BinaryOp(expr) => {
                let lhs = expr.lhs.eval_value(row);
                let rhs = expr.rhs.eval_value(row);
                let ordering = lhs.sql_cmp(&rhs)?;
                Some(match expr.op {
                    BinaryOp::Eq => ordering == Ordering::Equal,
                    BinaryOp::Ne => ordering != Ordering::Equal,
                    BinaryOp::Gt => ordering == Ordering::Greater,
                    BinaryOp::Ge => ordering != Ordering::Less,
                    BinaryOp::Lt => ordering == Ordering::Less,
                    BinaryOp::Le => ordering != Ordering::Greater,
                })
            }
            Expr::Like(expr) => match expr.expr.eval_value(row) {
                Value::String(text) => Some(like::matches(&expr.pattern, &text)),
                _ => None,
            },
            Expr::Column(_) | Expr::Value(_) => match self.eval_value(row) {
                Value::Bool(v) => Some(v),
                _ => None,
            },
        }
    }

    fn eval_value(&self, row: &(impl Row + ?Sized)) -> Value {
        match self {
            Expr::Column(column) => row
                .column(column.name.as_str())
                .cloned()
                .unwrap_or(Value::Null),
            Expr::Value(value) => value.clone(),
            expr => expr.eval_bool(row).map(Value::Bool).unwrap_or(Value::Null),
        }
    }
}
