mod adhoc;
mod authorization_denied;
mod connection_pool;
mod execution;
mod invalid_connection_url;
mod invalid_definition;
mod invalid_schema;
mod param_validation;
mod plan_stale;
mod unknown_field;
mod unknown_operator;

use adhoc::AdhocError;
use authorization_denied::AuthorizationDenied;
use connection_pool::ConnectionPoolError;
pub use execution::ExecutionFailure;
use execution::ExecutionError;
use invalid_connection_url::InvalidConnectionUrl;
use invalid_definition::InvalidDefinition;
use invalid_schema::InvalidSchema;
use param_validation::ParamValidationError;
use plan_stale::PlanStaleError;
use std::sync::Arc;
use unknown_field::UnknownFieldError;
use unknown_operator::UnknownOperatorError;

/// Returns early with an ad-hoc error built from format arguments.
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::Error::from_args(format_args!($($arg)*)))
    };
}

/// Builds an ad-hoc error from format arguments.
#[macro_export]
macro_rules! err {
    ($($arg:tt)*) => {
        $crate::Error::from_args(format_args!($($arg)*))
    };
}

/// An error that can occur while authorizing, compiling or executing a query.
#[derive(Clone)]
pub struct Error {
    inner: Option<Arc<ErrorInner>>,
}

#[derive(Debug)]
struct ErrorInner {
    kind: ErrorKind,
    cause: Option<Error>,
}

impl Error {
    /// Adds context to this error.
    ///
    /// Context is displayed in reverse order: the most recently added context is shown first,
    /// followed by earlier context, ending with the root cause.
    #[inline(always)]
    pub fn context(self, consequent: impl IntoError) -> Error {
        self.context_impl(consequent.into_error())
    }

    #[inline(never)]
    #[cold]
    fn context_impl(self, consequent: Error) -> Error {
        let kind = match consequent.inner {
            Some(inner) => match Arc::try_unwrap(inner) {
                Ok(inner) => inner.kind,
                Err(shared) => ErrorKind::Adhoc(AdhocError::new(shared.kind.to_string())),
            },
            None => ErrorKind::Unknown,
        };

        Error {
            inner: Some(Arc::new(ErrorInner {
                kind,
                cause: Some(self),
            })),
        }
    }

    fn chain(&self) -> impl Iterator<Item = &Error> {
        let mut err = self;
        core::iter::once(err).chain(core::iter::from_fn(move || {
            err = err.inner.as_ref().and_then(|inner| inner.cause.as_ref())?;
            Some(err)
        }))
    }

    fn kind(&self) -> &ErrorKind {
        self.inner
            .as_ref()
            .map(|inner| &inner.kind)
            .unwrap_or(&ErrorKind::Unknown)
    }

    /// Returns `true` if any error in the context chain matches `f`.
    fn any_kind(&self, f: impl Fn(&ErrorKind) -> bool) -> bool {
        self.chain().any(|err| f(err.kind()))
    }

    /// Returns `true` if the failed operation may be attempted one more time.
    ///
    /// Only store timeouts qualify. Compilation and authorization failures are
    /// deterministic and retrying them cannot change the outcome.
    pub fn is_retryable(&self) -> bool {
        self.any_kind(|kind| matches!(kind, ErrorKind::Execution(err) if err.is_timeout()))
    }

    /// Returns `true` if the error was raised before any store I/O because the
    /// request or a stored definition is malformed.
    pub fn is_compile_error(&self) -> bool {
        self.any_kind(|kind| {
            matches!(
                kind,
                ErrorKind::UnknownField(_)
                    | ErrorKind::UnknownOperator(_)
                    | ErrorKind::ParamValidation(_)
                    | ErrorKind::InvalidDefinition(_)
            )
        })
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self.kind() {
            ErrorKind::ConnectionPool(err) => Some(err),
            ErrorKind::Anyhow(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let mut it = self.chain().peekable();
        while let Some(err) = it.next() {
            core::fmt::Display::fmt(err.kind(), f)?;
            if it.peek().is_some() {
                f.write_str(": ")?;
            }
        }
        Ok(())
    }
}

impl core::fmt::Debug for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        if !f.alternate() {
            core::fmt::Display::fmt(self, f)
        } else {
            let Some(ref inner) = self.inner else {
                return f.debug_struct("Error").field("kind", &"None").finish();
            };
            f.debug_struct("Error")
                .field("kind", &inner.kind)
                .field("cause", &inner.cause)
                .finish()
        }
    }
}

#[derive(Debug)]
enum ErrorKind {
    Anyhow(anyhow::Error),
    Adhoc(AdhocError),
    UnknownField(UnknownFieldError),
    UnknownOperator(UnknownOperatorError),
    ParamValidation(ParamValidationError),
    AuthorizationDenied(AuthorizationDenied),
    PlanStale(PlanStaleError),
    Execution(ExecutionError),
    InvalidDefinition(InvalidDefinition),
    InvalidSchema(InvalidSchema),
    ConnectionPool(ConnectionPoolError),
    InvalidConnectionUrl(InvalidConnectionUrl),
    Unknown,
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        use self::ErrorKind::*;

        match self {
            Anyhow(err) => core::fmt::Display::fmt(err, f),
            Adhoc(err) => core::fmt::Display::fmt(err, f),
            UnknownField(err) => core::fmt::Display::fmt(err, f),
            UnknownOperator(err) => core::fmt::Display::fmt(err, f),
            ParamValidation(err) => core::fmt::Display::fmt(err, f),
            AuthorizationDenied(err) => core::fmt::Display::fmt(err, f),
            PlanStale(err) => core::fmt::Display::fmt(err, f),
            Execution(err) => core::fmt::Display::fmt(err, f),
            InvalidDefinition(err) => core::fmt::Display::fmt(err, f),
            InvalidSchema(err) => core::fmt::Display::fmt(err, f),
            ConnectionPool(err) => core::fmt::Display::fmt(err, f),
            InvalidConnectionUrl(err) => core::fmt::Display::fmt(err, f),
            Unknown => f.write_str("unknown warden error"),
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error {
            inner: Some(Arc::new(ErrorInner { kind, cause: None })),
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Error {
        Error::from(ErrorKind::Anyhow(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error {
        Error::invalid_definition(err.to_string())
    }
}

impl From<uuid::Error> for Error {
    fn from(err: uuid::Error) -> Error {
        Error::from(anyhow::Error::from(err))
    }
}

/// Trait for types that can be converted into an Error.
pub trait IntoError {
    /// Converts this type into an Error.
    fn into_error(self) -> Error;
}

impl IntoError for Error {
    #[inline(always)]
    fn into_error(self) -> Error {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_size() {
        let expected_size = core::mem::size_of::<usize>();
        assert_eq!(expected_size, core::mem::size_of::<Error>());
    }

    #[test]
    fn error_from_args() {
        let err = Error::from_args(format_args!("test error: {}", 42));
        assert_eq!(err.to_string(), "test error: 42");
    }

    #[test]
    fn error_chain_display() {
        let root = Error::from_args(format_args!("root cause"));
        let mid = Error::from_args(format_args!("middle context"));
        let top = Error::from_args(format_args!("top context"));

        let chained = root.context(mid).context(top);
        assert_eq!(
            chained.to_string(),
            "top context: middle context: root cause"
        );
    }

    #[test]
    fn kind_predicates_see_through_context() {
        let err = Error::unknown_field("todos", "legacy_status").context(err!("view `open_todos`"));
        assert!(err.is_unknown_field());
        assert!(err.is_compile_error());
        assert!(!err.is_retryable());
    }

    #[test]
    fn unknown_field_display() {
        let err = Error::unknown_field("todos", "nope");
        assert_eq!(err.to_string(), "unknown field `nope` on collection `todos`");
    }

    #[test]
    fn unknown_operator_display() {
        let err = Error::unknown_operator("done", "contains", Some("bool"));
        assert_eq!(
            err.to_string(),
            "operator `contains` is not supported for field `done` of type bool"
        );
    }

    #[test]
    fn authorization_denied_is_uniform() {
        let missing = Error::authorization_denied();
        let forbidden = Error::authorization_denied();
        assert_eq!(missing.to_string(), forbidden.to_string());
        assert_eq!(missing.to_string(), "authorization denied");
    }

    #[test]
    fn plan_stale_display() {
        let err = Error::plan_stale("open_todos", 2, 3);
        assert_eq!(
            err.to_string(),
            "stale plan for view `open_todos`: compiled at version 2, current version 3"
        );

        let err = Error::plan_stale_schema(1, 2);
        assert!(err.is_plan_stale());
        assert_eq!(
            err.to_string(),
            "stale plan for schema: compiled at version 1, current version 2"
        );
    }

    #[test]
    fn execution_timeout_is_retryable() {
        let err = Error::execution(ExecutionFailure::Timeout);
        assert!(err.is_retryable());
        assert!(!err.is_compile_error());

        let err = Error::execution(ExecutionFailure::Constraint);
        assert!(!err.is_retryable());
    }

    #[test]
    fn execution_does_not_leak_store_diagnostics() {
        let err = Error::execution(ExecutionFailure::Other);
        assert_eq!(err.to_string(), "query execution failed");
    }

    #[test]
    fn anyhow_bridge() {
        let anyhow_err = anyhow::anyhow!("something failed");
        let our_err: Error = anyhow_err.into();
        assert_eq!(our_err.to_string(), "something failed");
    }
}
