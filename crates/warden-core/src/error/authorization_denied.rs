use super::Error;

/// The request is not permitted.
///
/// Raised when no allow policy matched, a deny policy matched, the principal
/// kind is not admitted, or the collection does not exist. The message is the
/// same in every case so callers cannot probe which collections exist.
#[derive(Debug)]
pub(super) struct AuthorizationDenied;

impl std::error::Error for AuthorizationDenied {}

impl core::fmt::Display for AuthorizationDenied {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str("authorization denied")
    }
}

impl Error {
    /// Creates an authorization denied error.
    pub fn authorization_denied() -> Error {
        Error::from(super::ErrorKind::AuthorizationDenied(AuthorizationDenied))
    }

    /// Returns `true` if this error is an authorization denial.
    pub fn is_authorization_denied(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::AuthorizationDenied(_)))
    }
}
