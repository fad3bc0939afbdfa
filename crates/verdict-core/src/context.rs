use std::net::SocketAddr;

use jiff::Timestamp;

/// Per-request values shared down the handler chain
///
/// Inserted into the request extensions by the outermost transport layer.
/// Handlers only read it.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Correlation identifier joining all log lines of one request
    pub trace_id: String,
    /// When the request entered the service
    pub started_at: Timestamp,
    /// Arbitrary request-scoped values
    pub values: http::Extensions,
}

impl RequestContext {
    /// Create a context stamped with the current time
    #[must_use]
    pub fn new(trace_id: impl Into<String>) -> Self {
        Self {
            trace_id: trace_id.into(),
            started_at: Timestamp::now(),
            values: http::Extensions::new(),
        }
    }

    /// Attach a request-scoped value, replacing any previous value of the same type
    #[must_use]
    pub fn with_value<T>(mut self, value: T) -> Self
    where
        T: Clone + Send + Sync + 'static,
    {
        self.values.insert(value);
        self
    }

    /// Read a request-scoped value by type
    #[must_use]
    pub fn value<T>(&self) -> Option<&T>
    where
        T: Send + Sync + 'static,
    {
        self.values.get::<T>()
    }

    /// Look up a populated context in the request extensions
    ///
    /// A context with an empty trace identifier counts as absent.
    #[must_use]
    pub fn from_request<B>(request: &http::Request<B>) -> Option<&Self> {
        request
            .extensions()
            .get::<Self>()
            .filter(|context| !context.trace_id.is_empty())
    }
}

/// Peer address of the connection that sent the request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteAddr(pub SocketAddr);
