use std::sync::Arc;

use async_trait::async_trait;
use verdict_core::{
    BoxHandler, ChainError, Classification, Failure, Handler, Middleware, Request, RequestContext, ResponseSink,
    classify, respond,
};

/// Operator-facing record of failed requests
///
/// Built once at startup and shared by every request.
pub trait ErrorReporter: Send + Sync {
    /// Record a failure that is about to be answered
    fn report(&self, context: &RequestContext, classification: &Classification, failure: &Failure);

    /// Record a failure to write the error response itself
    fn report_emit_failure(&self, context: &RequestContext, failure: &Failure) {
        tracing::error!(trace_id = %context.trace_id, "{} : EMIT : {failure:#}", context.trace_id);
    }
}

/// `<trace id> : ERROR : <failure with its full annotation chain>`
#[must_use]
pub fn log_line(trace_id: &str, failure: &Failure) -> String {
    format!("{trace_id} : ERROR : {failure:#}")
}

/// Reports failures through `tracing`
#[derive(Debug, Clone)]
pub struct TracingReporter {
    service: String,
}

impl TracingReporter {
    #[must_use]
    pub fn new(service: impl Into<String>) -> Self {
        Self { service: service.into() }
    }
}

impl ErrorReporter for TracingReporter {
    fn report(&self, context: &RequestContext, classification: &Classification, failure: &Failure) {
        tracing::error!(
            service = %self.service,
            trace_id = %context.trace_id,
            status = classification.status.as_u16(),
            "{}",
            log_line(&context.trace_id, failure)
        );
    }
}

/// Turns failures from the chain into error responses
///
/// Every failure is reported, classified and answered with one
/// [`ErrorEnvelope`](verdict_core::ErrorEnvelope). The failure is then
/// consumed; only a failure to write the response reaches the caller.
#[derive(Clone)]
pub struct Errors {
    reporter: Arc<dyn ErrorReporter>,
}

impl Errors {
    #[must_use]
    pub fn new(reporter: Arc<dyn ErrorReporter>) -> Self {
        Self { reporter }
    }
}

impl Middleware for Errors {
    fn wrap(&self, next: BoxHandler) -> BoxHandler {
        Arc::new(ErrorsHandler {
            reporter: Arc::clone(&self.reporter),
            next,
        })
    }
}

struct ErrorsHandler {
    reporter: Arc<dyn ErrorReporter>,
    next: BoxHandler,
}

#[async_trait]
impl Handler for ErrorsHandler {
    async fn call(&self, request: Request, sink: &mut dyn ResponseSink) -> Result<(), Failure> {
        let Some(context) = RequestContext::from_request(&request).cloned() else {
            return Err(ChainError::MissingContext.into());
        };

        let Err(failure) = self.next.call(request, sink).await else {
            return Ok(());
        };

        let classification = classify(&failure);
        self.reporter.report(&context, &classification, &failure);

        let status = classification.status;
        if let Err(e) = respond(sink, &classification.into_envelope(), status) {
            let failure = Failure::from(e);
            self.reporter.report_emit_failure(&context, &failure);
            return Err(failure);
        }

        Ok(())
    }
}
