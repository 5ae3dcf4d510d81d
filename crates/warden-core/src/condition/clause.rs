use super::{Condition, Operand};

#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    /// Compares a field against an operand.
    Compare(Comparison),

    /// Holds for any principal other than anonymous.
    Authenticated,

    /// Holds if any branch holds. No branches never holds.
    Or(Vec<Condition>),

    /// Holds unless the inner condition holds. A row whose compared column is
    /// `NULL` satisfies the negation.
    Not(Condition),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    /// Logical field name, physical column name or a field alias.
    pub field: String,

    /// Operator as written in the definition. Checked against the field type
    /// when the condition is compiled.
    pub operator: String,

    pub operand: Operand,
}

impl Clause {
    pub fn compare(field: impl Into<String>, operator: &str, operand: Operand) -> Clause {
        Clause::Compare(Comparison {
            field: field.into(),
            operator: operator.to_string(),
            operand,
        })
    }

    /// Names of every parameter the clause references, nested groups
    /// included.
    pub fn params(&self) -> Vec<&str> {
        match self {
            Clause::Compare(Comparison {
                operand: Operand::Param(name),
                ..
            }) => vec![name],
            Clause::Compare(_) | Clause::Authenticated => vec![],
            Clause::Or(branches) => branches.iter().flat_map(|branch| branch.params()).collect(),
            Clause::Not(inner) => inner.params().collect(),
        }
    }
}
