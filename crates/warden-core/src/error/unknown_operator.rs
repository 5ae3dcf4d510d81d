use super::Error;

/// Error when an operator does not exist, or is not supported for the type of
/// the field it is applied to (e.g. `contains` on a bool field).
#[derive(Debug)]
pub(super) struct UnknownOperatorError {
    field: Box<str>,
    operator: Box<str>,
    field_ty: Option<Box<str>>,
}

impl std::error::Error for UnknownOperatorError {}

impl core::fmt::Display for UnknownOperatorError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match &self.field_ty {
            Some(ty) => write!(
                f,
                "operator `{}` is not supported for field `{}` of type {}",
                self.operator, self.field, ty
            ),
            None => write!(
                f,
                "unknown operator `{}` on field `{}`",
                self.operator, self.field
            ),
        }
    }
}

impl Error {
    /// Creates an unknown operator error. `field_ty` is `None` when the
    /// operator name itself is not recognized.
    pub fn unknown_operator(
        field: impl Into<String>,
        operator: impl Into<String>,
        field_ty: Option<&str>,
    ) -> Error {
        Error::from(super::ErrorKind::UnknownOperator(UnknownOperatorError {
            field: field.into().into(),
            operator: operator.into().into(),
            field_ty: field_ty.map(Into::into),
        }))
    }

    /// Returns `true` if this error is an unknown operator error.
    pub fn is_unknown_operator(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::UnknownOperator(_)))
    }
}
