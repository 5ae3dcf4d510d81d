use super::Error;

/// Coarse classification of a store failure.
///
/// Drivers map their native errors onto this set. The native error itself is
/// never stored in [`Error`], so store diagnostics (SQL text, constraint
/// names, values) cannot reach the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionFailure {
    /// The query did not complete in time, or the store was busy.
    Timeout,
    /// A constraint was violated.
    Constraint,
    /// A bound value or a stored value did not match the column type.
    TypeMismatch,
    /// The connection to the store was lost or could not be established.
    Connection,
    Other,
}

#[derive(Debug)]
pub(super) struct ExecutionError {
    failure: ExecutionFailure,
}

impl ExecutionError {
    pub(super) fn is_timeout(&self) -> bool {
        self.failure == ExecutionFailure::Timeout
    }
}

impl std::error::Error for ExecutionError {}

impl core::fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self.failure {
            ExecutionFailure::Timeout => f.write_str("query execution timed out"),
            ExecutionFailure::Constraint => {
                f.write_str("query execution failed: constraint violation")
            }
            ExecutionFailure::TypeMismatch => f.write_str("query execution failed: type mismatch"),
            ExecutionFailure::Connection => {
                f.write_str("query execution failed: store unavailable")
            }
            ExecutionFailure::Other => f.write_str("query execution failed"),
        }
    }
}

impl Error {
    /// Creates an execution error of the given category.
    pub fn execution(failure: ExecutionFailure) -> Error {
        Error::from(super::ErrorKind::Execution(ExecutionError { failure }))
    }

    /// Returns `true` if this error is an execution error.
    pub fn is_execution(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::Execution(_)))
    }

    /// Returns the execution failure category, if this is an execution error.
    pub fn execution_failure(&self) -> Option<ExecutionFailure> {
        self.chain().find_map(|err| match err.kind() {
            super::ErrorKind::Execution(err) => Some(err.failure),
            _ => None,
        })
    }
}
