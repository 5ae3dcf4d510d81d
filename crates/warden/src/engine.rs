//! Pure, request-scoped compilation stages.
//!
//! Nothing in this module performs I/O except [`exec`], which only talks to
//! the connection it is handed.

pub mod exec;
pub use exec::Page;

pub mod policy;
pub use policy::Authorization;

pub mod predicate;
pub use predicate::{ConditionIssue, FieldResolver, ParamValues, Scope};

pub mod records;
pub use records::{RecordQuery, SortField};

pub mod view;
pub use view::{ExecuteRequest, Projected, QueryPlan, ViewPage, ViewStamp};
