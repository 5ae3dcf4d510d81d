pub mod serializer;
pub use serializer::{Params, Placeholder, Serializer, TypedValue};

pub use warden_core::stmt::Statement;
