use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use http::{Method, StatusCode};
use jiff::Timestamp;
use verdict_core::{
    BoxHandler, ChainError, Failure, Handler, Middleware, RemoteAddr, Request, RequestContext, ResponseSink,
};

/// Logs one [`request_line`] per request once the chain has answered
#[derive(Debug, Clone, Copy, Default)]
pub struct Logger;

impl Middleware for Logger {
    fn wrap(&self, next: BoxHandler) -> BoxHandler {
        Arc::new(LoggerHandler { next })
    }
}

struct LoggerHandler {
    next: BoxHandler,
}

#[async_trait]
impl Handler for LoggerHandler {
    async fn call(&self, request: Request, sink: &mut dyn ResponseSink) -> Result<(), Failure> {
        let Some(context) = RequestContext::from_request(&request).cloned() else {
            return Err(ChainError::MissingContext.into());
        };
        let method = request.method().clone();
        let path = request.uri().path().to_owned();

        let result = self.next.call(request, sink).await;

        let status = sink.status().unwrap_or(StatusCode::OK);
        let remote = context.value::<RemoteAddr>().map(|RemoteAddr(addr)| *addr);
        let elapsed_ms = i64::try_from(Timestamp::now().duration_since(context.started_at).as_millis()).unwrap_or(i64::MAX);

        tracing::info!(
            trace_id = %context.trace_id,
            status = status.as_u16(),
            %method,
            %path,
            elapsed_ms,
            "{}",
            request_line(&context.trace_id, status, &method, &path, remote, elapsed_ms)
        );

        result
    }
}

/// `<trace id> : (<status>) : <METHOD> <path> -> <remote> (<elapsed>ms)`
///
/// An unknown peer address is written as `-`.
#[must_use]
pub fn request_line(
    trace_id: &str,
    status: StatusCode,
    method: &Method,
    path: &str,
    remote: Option<SocketAddr>,
    elapsed_ms: i64,
) -> String {
    let remote = remote.map_or_else(|| "-".to_owned(), |addr| addr.to_string());
    format!("{trace_id} : ({}) : {method} {path} -> {remote} ({elapsed_ms}ms)", status.as_u16())
}
