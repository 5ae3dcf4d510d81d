use super::Error;

/// Error when a request parameter is missing or has the wrong type, or when a
/// bound value cannot be coerced to the type of the field it is compared to.
#[derive(Debug)]
pub(super) struct ParamValidationError {
    message: Box<str>,
}

impl std::error::Error for ParamValidationError {}

impl core::fmt::Display for ParamValidationError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid parameter: {}", self.message)
    }
}

impl Error {
    /// Creates a parameter validation error.
    pub fn param_validation(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::ParamValidation(ParamValidationError {
            message: message.into().into(),
        }))
    }

    /// Creates the error raised when a required parameter is absent.
    pub fn missing_param(name: &str) -> Error {
        Error::param_validation(format!("missing required parameter `{name}`"))
    }

    /// Returns `true` if this error is a parameter validation error.
    pub fn is_param_validation(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::ParamValidation(_)))
    }
}
