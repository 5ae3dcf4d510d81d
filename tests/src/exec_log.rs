use crate::logging_driver::DriverOp;
use std::sync::{Arc, Mutex};
use warden_core::{driver::Operation, stmt::Statement};

/// A wrapper around the operations log that provides a clean API for tests
#[derive(Clone)]
pub struct ExecLog {
    ops: Arc<Mutex<Vec<DriverOp>>>,
}

impl ExecLog {
    pub(crate) fn new(ops: Arc<Mutex<Vec<DriverOp>>>) -> Self {
        Self { ops }
    }

    /// Get the number of logged operations
    pub fn len(&self) -> usize {
        self.ops.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.lock().unwrap().is_empty()
    }

    /// Number of row queries, as opposed to counts
    pub fn selects(&self) -> usize {
        self.count(|op| matches!(op, Operation::Query(Statement::Select(_))))
    }

    pub fn counts(&self) -> usize {
        self.count(|op| matches!(op, Operation::Query(Statement::Count(_))))
    }

    /// Count operations matching the given predicate
    pub fn count<F>(&self, predicate: F) -> usize
    where
        F: Fn(&Operation) -> bool,
    {
        self.ops
            .lock()
            .unwrap()
            .iter()
            .filter(|op| predicate(&op.operation))
            .count()
    }

    /// Every SQL text sent to the store, in order
    pub fn sql(&self) -> Vec<String> {
        self.ops.lock().unwrap().iter().map(|op| op.sql.clone()).collect()
    }

    /// Check if any logged SQL text contains `needle`
    pub fn sql_contains(&self, needle: &str) -> bool {
        self.ops.lock().unwrap().iter().any(|op| op.sql.contains(needle))
    }

    /// Check if any bound parameter renders as `needle`
    pub fn params_contain(&self, needle: &str) -> bool {
        self.ops
            .lock()
            .unwrap()
            .iter()
            .flat_map(|op| op.params.iter())
            .any(|param| param.value.as_str() == Some(needle))
    }

    pub fn clear(&self) {
        self.ops.lock().unwrap().clear();
    }

    /// Get access to all operations for custom assertions
    pub fn with_ops<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&[DriverOp]) -> R,
    {
        let ops = self.ops.lock().unwrap();
        f(&ops)
    }
}
