mod value;
pub(crate) use value::Value;
pub use value::timestamp_text;

use rusqlite::{Connection as RusqliteConnection, ErrorCode, InterruptHandle};
use std::{
    borrow::Cow,
    fmt,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
    time::Duration,
};
use tracing::warn;
use url::Url;
use warden_core::{
    async_trait,
    driver::{Driver, Operation, Response},
    stmt::{self, Statement},
    Error, ExecutionFailure, Result,
};
use warden_sql::{Serializer, TypedValue};

/// How long a connection waits on a locked database before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug)]
pub enum Sqlite {
    File(PathBuf),
    InMemory,
}

impl Sqlite {
    /// Create a new SQLite driver with an arbitrary connection URL
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url_str = url.into();
        let url =
            Url::parse(&url_str).map_err(|err| Error::invalid_connection_url(err.to_string()))?;

        if url.scheme() != "sqlite" {
            return Err(Error::invalid_connection_url(format!(
                "connection URL does not have a `sqlite` scheme; url={url_str}"
            )));
        }

        if url.path() == ":memory:" {
            Ok(Self::InMemory)
        } else {
            Ok(Self::File(PathBuf::from(url.path())))
        }
    }

    /// Create an in-memory SQLite database
    pub fn in_memory() -> Self {
        Self::InMemory
    }

    /// Open a SQLite database at the specified file path
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self::File(path.as_ref().to_path_buf())
    }
}

#[async_trait]
impl Driver for Sqlite {
    fn url(&self) -> Cow<'_, str> {
        match self {
            Sqlite::InMemory => Cow::Borrowed("sqlite::memory:"),
            Sqlite::File(path) => Cow::Owned(format!("sqlite:{}", path.display())),
        }
    }

    async fn connect(&self) -> Result<Box<dyn warden_core::Connection>> {
        let connection = match self {
            Sqlite::File(path) => Connection::open(path)?,
            Sqlite::InMemory => Connection::in_memory()?,
        };
        Ok(Box::new(connection))
    }

    /// Each in-memory connection is its own database.
    fn max_connections(&self) -> Option<usize> {
        matches!(self, Self::InMemory).then_some(1)
    }
}

/// A rusqlite connection driven from a blocking thread, so callers can time
/// out while a statement runs.
pub struct Connection {
    connection: Arc<Mutex<RusqliteConnection>>,
    interrupt: InterruptHandle,
}

impl Connection {
    pub fn in_memory() -> Result<Self> {
        Self::configure(RusqliteConnection::open_in_memory().map_err(execution_error)?)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let connection = RusqliteConnection::open(path).map_err(|err| {
            warn!(error = %err, "failed to open sqlite database");
            Error::execution(ExecutionFailure::Connection)
        })?;

        Self::configure(connection)
    }

    fn configure(connection: RusqliteConnection) -> Result<Self> {
        // `contains` and `starts_with` are case-sensitive on every store.
        connection
            .pragma_update(None, "case_sensitive_like", true)
            .map_err(execution_error)?;
        connection
            .busy_timeout(BUSY_TIMEOUT)
            .map_err(execution_error)?;

        Ok(Self {
            interrupt: connection.get_interrupt_handle(),
            connection: Arc::new(Mutex::new(connection)),
        })
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection").finish_non_exhaustive()
    }
}

#[async_trait]
impl warden_core::Connection for Connection {
    async fn exec(&mut self, op: Operation) -> Result<Response> {
        let Operation::Query(statement) = op;
        let connection = self.connection.clone();

        // Dropped without completing (a timeout): stop the running statement.
        let guard = InterruptOnDrop {
            handle: &self.interrupt,
            armed: true,
        };

        let response = tokio::task::spawn_blocking(move || {
            let connection = connection.lock().map_err(|_| {
                warn!("sqlite connection poisoned by an earlier panic");
                Error::execution(ExecutionFailure::Connection)
            })?;

            query(&connection, &statement)
        })
        .await;

        guard.disarm();

        response.map_err(|err| {
            warn!(error = %err, "sqlite query task failed");
            Error::execution(ExecutionFailure::Other)
        })?
    }
}

struct InterruptOnDrop<'a> {
    handle: &'a InterruptHandle,
    armed: bool,
}

impl InterruptOnDrop<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for InterruptOnDrop<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.handle.interrupt();
        }
    }
}

fn query(connection: &RusqliteConnection, statement: &Statement) -> Result<Response> {
    let mut params: Vec<TypedValue> = vec![];
    let sql = Serializer::sqlite().serialize(statement, &mut params);
    let params = params.into_iter().map(Value::from).collect::<Vec<_>>();

    let mut prepared = connection.prepare_cached(&sql).map_err(execution_error)?;

    match statement {
        Statement::Count(_) => {
            let count: i64 = prepared
                .query_row(rusqlite::params_from_iter(params.iter()), |row| row.get(0))
                .map_err(execution_error)?;

            Ok(Response::Count(count.max(0) as u64))
        }
        Statement::Select(select) => {
            let mut rows = prepared
                .query(rusqlite::params_from_iter(params.iter()))
                .map_err(execution_error)?;

            let mut ret = vec![];

            while let Some(row) = rows.next().map_err(execution_error)? {
                let fields = select
                    .returning
                    .iter()
                    .enumerate()
                    .map(|(index, column)| Value::from_sql(row, index, column.ty))
                    .collect::<Result<Vec<_>>>()?;

                ret.push(stmt::ValueRecord::from_vec(fields));
            }

            Ok(Response::Rows(ret))
        }
    }
}

/// Maps a native error onto a failure category. The native error is only
/// logged.
fn execution_error(err: rusqlite::Error) -> Error {
    let failure = match &err {
        rusqlite::Error::SqliteFailure(err, _) => match err.code {
            ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked => ExecutionFailure::Timeout,
            ErrorCode::OperationInterrupted => ExecutionFailure::Timeout,
            ErrorCode::ConstraintViolation => ExecutionFailure::Constraint,
            ErrorCode::TypeMismatch => ExecutionFailure::TypeMismatch,
            ErrorCode::CannotOpen | ErrorCode::NotADatabase => ExecutionFailure::Connection,
            _ => ExecutionFailure::Other,
        },
        rusqlite::Error::InvalidColumnType(..) | rusqlite::Error::FromSqlConversionFailure(..) => {
            ExecutionFailure::TypeMismatch
        }
        _ => ExecutionFailure::Other,
    };

    warn!(error = %err, ?failure, "sqlite query failed");
    Error::execution(failure)
}
