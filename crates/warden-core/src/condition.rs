mod clause;
pub use clause::{Clause, Comparison};

mod operand;
pub use operand::{Operand, SpecialValue};

mod operator;
pub use operator::Operator;

mod parse;

/// A declarative row condition: a conjunction of clauses.
///
/// An empty condition holds for every row. Disjunction and negation nest as
/// [`Clause::Or`] and [`Clause::Not`] groups.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Condition {
    pub clauses: Vec<Clause>,
}

impl Condition {
    pub fn new(clauses: Vec<Clause>) -> Condition {
        Condition { clauses }
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// Appends a comparison clause.
    pub fn and(mut self, field: impl Into<String>, operator: &str, operand: Operand) -> Self {
        self.clauses.push(Clause::compare(field, operator, operand));
        self
    }

    /// Names of every parameter the condition references.
    pub fn params(&self) -> impl Iterator<Item = &str> + '_ {
        self.clauses.iter().flat_map(Clause::params)
    }
}

impl From<Vec<Clause>> for Condition {
    fn from(clauses: Vec<Clause>) -> Self {
        Condition { clauses }
    }
}
