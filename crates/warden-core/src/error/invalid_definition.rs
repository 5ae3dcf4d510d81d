use super::Error;

/// A stored policy condition or view definition could not be decoded or is
/// structurally invalid (e.g. a filter references a parameter that is not
/// declared in the view's parameter schema).
#[derive(Debug)]
pub(super) struct InvalidDefinition {
    message: Box<str>,
}

impl std::error::Error for InvalidDefinition {}

impl core::fmt::Display for InvalidDefinition {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid definition: {}", self.message)
    }
}

impl Error {
    /// Creates an invalid definition error.
    pub fn invalid_definition(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::InvalidDefinition(InvalidDefinition {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is an invalid definition error.
    pub fn is_invalid_definition(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::InvalidDefinition(_)))
    }
}
