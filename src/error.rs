//! Error types.
//!
//! Two families live here, and they never meet:
//!
//! - [`ConfigError`] is returned while *building* a pipeline. It is fatal to
//!   setup and never travels through an invocation.
//! - [`BoxError`] is what travels *through* an invocation. Handlers and
//!   steps return whatever error type they like; `?` boxes it.
//!
//! [`Error`] covers the failures the pipeline itself produces at run time,
//! which today means a step or the handler panicked.

use thiserror::Error;

use crate::stage::Stage;

/// An opaque error raised by the handler or a step.
///
/// Any `std::error::Error + Send + Sync` converts into it with `?`, as do
/// `&str` and `String`.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Returned by [`Pipeline::use_middleware`](crate::Pipeline::use_middleware)
/// when the middleware cannot be registered.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The middleware has none of the `before`, `after` or `on_error` slots.
    #[error("middleware `{name}` provides none of `before`, `after` or `on_error`")]
    EmptyMiddleware {
        /// Name the middleware was created with.
        name: String,
    },
}

/// Failures produced by the pipeline itself during an invocation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    /// A step or the handler panicked instead of returning.
    ///
    /// The panic is caught at the runner boundary and routed like any other
    /// error: to the error stage when it happens in `before`, the handler or
    /// `after`, straight to the caller when it happens in the error stage.
    #[error("{stage} stage panicked: {message}")]
    Panicked {
        /// Stage that was running.
        stage: Stage,
        /// Panic payload, when it was a string.
        message: String,
    },
}
