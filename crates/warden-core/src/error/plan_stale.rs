use super::Error;

/// A cached query plan was compiled against an older version of its view or
/// of the project schema.
#[derive(Debug)]
pub(super) struct PlanStaleError {
    /// The definition that changed.
    subject: Box<str>,
    planned: u64,
    current: u64,
}

impl std::error::Error for PlanStaleError {}

impl core::fmt::Display for PlanStaleError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "stale plan for {}: compiled at version {}, current version {}",
            self.subject, self.planned, self.current
        )
    }
}

impl Error {
    /// Creates a stale plan error for a view that changed.
    pub fn plan_stale(view: impl Into<String>, planned: u64, current: u64) -> Error {
        Error::stale(format!("view `{}`", view.into()), planned, current)
    }

    /// Creates a stale plan error for a schema that changed.
    pub fn plan_stale_schema(planned: u64, current: u64) -> Error {
        Error::stale("schema".to_string(), planned, current)
    }

    fn stale(subject: String, planned: u64, current: u64) -> Error {
        Error::from(super::ErrorKind::PlanStale(PlanStaleError {
            subject: subject.into(),
            planned,
            current,
        }))
    }

    /// Returns `true` if this error is a stale plan error.
    pub fn is_plan_stale(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::PlanStale(_)))
    }
}
