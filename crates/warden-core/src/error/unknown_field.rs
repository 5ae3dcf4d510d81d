use super::Error;

/// Error when a condition, projection or sort references a field the schema
/// registry cannot resolve.
///
/// This covers fields that never existed, fields that were soft-deleted, and
/// fields whose column was dropped. None of these ever reach the store.
#[derive(Debug)]
pub(super) struct UnknownFieldError {
    collection: Box<str>,
    field: Box<str>,
}

impl std::error::Error for UnknownFieldError {}

impl core::fmt::Display for UnknownFieldError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "unknown field `{}` on collection `{}`",
            self.field, self.collection
        )
    }
}

impl Error {
    /// Creates an unknown field error.
    pub fn unknown_field(collection: impl Into<String>, field: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::UnknownField(UnknownFieldError {
            collection: collection.into().into(),
            field: field.into().into(),
        }))
    }

    /// Returns `true` if this error is an unknown field error.
    pub fn is_unknown_field(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::UnknownField(_)))
    }
}
