//! Validation phase.

pub mod types;
pub mod validator;

pub use types::{coerces, dtype_compatible, parse_bool};
pub use validator::SchemaValidator;
