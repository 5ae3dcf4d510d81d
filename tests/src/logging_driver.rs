use std::{
    borrow::Cow,
    sync::{Arc, Mutex},
};
use warden_core::{
    async_trait,
    driver::{Connection, Driver, Operation, Response},
    Result,
};
use warden_sql::{Serializer, TypedValue};

#[derive(Debug)]
pub struct LoggingDriver {
    inner: Box<dyn Driver>,

    /// Log of all operations executed through this driver
    ops_log: Arc<Mutex<Vec<DriverOp>>>,
}

impl LoggingDriver {
    pub fn new(driver: Box<dyn Driver>) -> Self {
        Self {
            inner: driver,
            ops_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Get a handle to access the operations log
    pub fn ops_log_handle(&self) -> Arc<Mutex<Vec<DriverOp>>> {
        self.ops_log.clone()
    }
}

#[async_trait]
impl Driver for LoggingDriver {
    fn url(&self) -> Cow<'_, str> {
        self.inner.url()
    }

    async fn connect(&self) -> Result<Box<dyn Connection>> {
        Ok(Box::new(LoggingConnection {
            inner: self.inner.connect().await?,
            ops_log: self.ops_log_handle(),
        }))
    }

    fn max_connections(&self) -> Option<usize> {
        self.inner.max_connections()
    }
}

#[derive(Debug)]
pub struct DriverOp {
    pub operation: Operation,

    /// The statement as the SQLite driver renders it.
    pub sql: String,

    /// Values bound to the statement's placeholders, in order.
    pub params: Vec<TypedValue>,

    /// Rows or count returned; `None` when the operation failed.
    pub returned: Option<u64>,
}

/// A connection wrapper that logs every operation for assertions
#[derive(Debug)]
pub struct LoggingConnection {
    inner: Box<dyn Connection>,
    ops_log: Arc<Mutex<Vec<DriverOp>>>,
}

#[async_trait]
impl Connection for LoggingConnection {
    async fn exec(&mut self, operation: Operation) -> Result<Response> {
        let Operation::Query(stmt) = &operation;

        let mut params = vec![];
        let sql = Serializer::sqlite().serialize(stmt, &mut params);

        let logged = operation.clone();
        let response = self.inner.exec(operation).await;

        let returned = match &response {
            Ok(Response::Rows(rows)) => Some(rows.len() as u64),
            Ok(Response::Count(count)) => Some(*count),
            Err(_) => None,
        };

        self.ops_log
            .lock()
            .expect("Failed to acquire ops log lock")
            .push(DriverOp {
                operation: logged,
                sql,
                params,
                returned,
            });

        response
    }
}
