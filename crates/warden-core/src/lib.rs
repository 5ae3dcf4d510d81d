pub mod condition;
pub use condition::Condition;

pub mod driver;
pub use driver::Connection;

mod error;
pub use error::{Error, ExecutionFailure, IntoError};

pub mod policy;
pub use policy::Policy;

pub mod principal;
pub use principal::Principal;

pub mod schema;
pub use schema::Schema;

pub mod stmt;

pub mod view;
pub use view::View;

/// A Result type alias that uses Warden's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;

pub use async_trait::async_trait;
