use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures::future::BoxFuture;

use crate::error::Failure;
use crate::respond::ResponseSink;

/// Request as seen by handlers: buffered body, context in the extensions
pub type Request = http::Request<Bytes>;

/// Shared, type-erased handler
pub type BoxHandler = Arc<dyn Handler>;

/// A unit of work in the chain
///
/// Writes a response to the sink, or returns a failure for an outer
/// layer to turn into one.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn call(&self, request: Request, sink: &mut dyn ResponseSink) -> Result<(), Failure>;
}

/// Wraps a handler in another handler of the same shape
pub trait Middleware: Send + Sync {
    fn wrap(&self, next: BoxHandler) -> BoxHandler;
}

impl<F> Middleware for F
where
    F: Fn(BoxHandler) -> BoxHandler + Send + Sync,
{
    fn wrap(&self, next: BoxHandler) -> BoxHandler {
        self(next)
    }
}

/// Ordered middleware folded around terminal handlers
///
/// The first middleware added runs first, i.e. it is the outermost layer.
#[derive(Clone, Default)]
pub struct Chain {
    middleware: Vec<Arc<dyn Middleware>>,
}

impl Chain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, middleware: impl Middleware + 'static) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// Compose every middleware around `terminal`
    #[must_use]
    pub fn build(&self, terminal: BoxHandler) -> BoxHandler {
        self.middleware
            .iter()
            .rev()
            .fold(terminal, |next, middleware| middleware.wrap(next))
    }
}

struct HandlerFn<F>(F);

#[async_trait]
impl<F> Handler for HandlerFn<F>
where
    F: for<'a> Fn(Request, &'a mut dyn ResponseSink) -> BoxFuture<'a, Result<(), Failure>> + Send + Sync,
{
    async fn call(&self, request: Request, sink: &mut dyn ResponseSink) -> Result<(), Failure> {
        (self.0)(request, sink).await
    }
}

/// Adapt a domain function into a chain handler
///
/// The function writes its own success response; its failure is handed
/// back to the caller untouched.
///
/// ```
/// use http::StatusCode;
/// use verdict_core::{Failure, Request, ResponseSink, respond, run};
///
/// async fn list(_request: Request, sink: &mut dyn ResponseSink) -> Result<(), Failure> {
///     respond(sink, &["widget"], StatusCode::OK)?;
///     Ok(())
/// }
///
/// let handler = run(|request, sink| Box::pin(list(request, sink)));
/// # drop(handler);
/// ```
pub fn run<F>(f: F) -> BoxHandler
where
    F: for<'a> Fn(Request, &'a mut dyn ResponseSink) -> BoxFuture<'a, Result<(), Failure>> + Send + Sync + 'static,
{
    Arc::new(HandlerFn(f))
}

/// Named path segments matched by the router
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams(Vec<(String, String)>);

impl PathParams {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Path parameter `name` of `request`
    #[must_use]
    pub fn of<'r>(request: &'r Request, name: &str) -> Option<&'r str> {
        request.extensions().get::<Self>()?.get(name)
    }
}

impl<K, V> FromIterator<(K, V)> for PathParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
