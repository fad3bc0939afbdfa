//! Request error classification and response mapping
//!
//! Handlers return a [`Failure`] instead of writing error responses
//! themselves. The outermost middleware classifies it with [`classify`]
//! and writes a single [`ErrorEnvelope`] through [`respond`].

mod classify;
mod context;
mod error;
mod handler;
mod respond;

pub use classify::{Classification, ErrorEnvelope, classify, generic_message};
pub use context::{RemoteAddr, RequestContext};
pub use error::{ApplicationError, BoxError, ChainError, Failure, FieldError, FieldErrors, ResultExt};
pub use handler::{BoxHandler, Chain, Handler, Middleware, PathParams, Request, run};
pub use respond::{BufferedResponse, DecodeError, EmitError, ResponseSink, decode, respond};

/// Boxed future returned by adapted domain handlers
pub use futures::future::BoxFuture;
