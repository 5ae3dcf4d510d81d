use crate::stmt::Statement;

#[derive(Debug, Clone)]
pub enum Operation {
    /// Run a read-only statement.
    Query(Statement),
}

impl From<Statement> for Operation {
    fn from(value: Statement) -> Self {
        Operation::Query(value)
    }
}
