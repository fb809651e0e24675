//! Error types for the consumed interfaces (value mapper, host bridge).
//!
//! The evaluator itself is total and never returns `Err`; evaluation failures
//! surface as [`crate::value::Val::Error`]. This enum covers the impure edges
//! only, and its `Display` renderings are the messages that end up inside
//! `Val::Error` when a host invocation or a value mapping fails.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Failures of the host-function bridge and the value mapper
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("fail to load class '{0}'")]
    ClassNotFound(String),

    #[error("fail to get method with name '{method}' and arguments '{arg_types}' from class '{class}'")]
    MethodNotFound {
        class: String,
        method: String,
        arg_types: String,
    },

    #[error("fail to invoke method with name '{method}' from class '{class}': {reason}")]
    InvocationFailed {
        class: String,
        method: String,
        reason: String,
    },

    #[error("fail to map value: {0}")]
    MappingError(String),
}
