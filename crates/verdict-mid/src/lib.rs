//! Middleware for the verdict handler chain
//!
//! Install in this order: [`Logger`], [`Errors`], [`Panics`].

mod errors;
mod logger;
mod panics;

pub use errors::{ErrorReporter, Errors, TracingReporter, log_line};
pub use logger::{Logger, request_line};
pub use panics::Panics;
