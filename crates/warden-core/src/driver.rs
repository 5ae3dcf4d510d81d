mod operation;
pub use operation::Operation;

mod response;
pub use response::Response;

use crate::{async_trait, Result};

use std::{borrow::Cow, fmt::Debug};

/// Opens connections to a relational store.
#[async_trait]
pub trait Driver: Debug + Send + Sync + 'static {
    /// The URL the driver connects to, without credentials.
    fn url(&self) -> Cow<'_, str>;

    async fn connect(&self) -> Result<Box<dyn Connection>>;

    /// Upper bound on concurrently open connections, if the store imposes
    /// one.
    fn max_connections(&self) -> Option<usize> {
        None
    }
}

/// A single open connection. Operations on one connection run sequentially.
#[async_trait]
pub trait Connection: Debug + Send + 'static {
    /// Serializes and runs an operation.
    ///
    /// Native store errors are mapped onto [`crate::ExecutionFailure`]
    /// categories before they are returned.
    async fn exec(&mut self, op: Operation) -> Result<Response>;
}
