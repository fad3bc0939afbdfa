use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use verdict_core::{BoxHandler, ChainError, Failure, Handler, Middleware, Request, ResponseSink};

/// Turns a panic further down the chain into an internal failure
///
/// Install inside [`Errors`](crate::Errors) so the panic is classified and
/// answered like any other failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct Panics;

impl Middleware for Panics {
    fn wrap(&self, next: BoxHandler) -> BoxHandler {
        Arc::new(PanicsHandler { next })
    }
}

struct PanicsHandler {
    next: BoxHandler,
}

#[async_trait]
impl Handler for PanicsHandler {
    async fn call(&self, request: Request, sink: &mut dyn ResponseSink) -> Result<(), Failure> {
        match AssertUnwindSafe(self.next.call(request, sink)).catch_unwind().await {
            Ok(result) => result,
            Err(payload) => Err(ChainError::Panicked(panic_message(payload.as_ref())).into()),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use futures::future;
    use http::StatusCode;
    use verdict_core::{BufferedResponse, classify, run};

    use super::*;

    fn explode(request: &Request) -> Result<(), Failure> {
        let id = request.uri().path().len();
        panic!("index out of bounds: the len is 0 but the index is {id}");
    }

    #[tokio::test]
    async fn panic_becomes_internal_failure() {
        let handler = Panics.wrap(run(|r, _| Box::pin(future::ready(explode(&r)))));

        let failure = handler
            .call(Request::new(Bytes::new()), &mut BufferedResponse::new())
            .await
            .unwrap_err();

        assert_eq!(
            failure.to_string(),
            "panic: index out of bounds: the len is 0 but the index is 1"
        );
        assert_eq!(classify(&failure).status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn no_panic_is_transparent() {
        let handler = Panics.wrap(run(|_, _| Box::pin(future::ready(Ok::<(), Failure>(())))));

        handler
            .call(Request::new(Bytes::new()), &mut BufferedResponse::new())
            .await
            .unwrap();
    }

    #[test]
    fn static_and_owned_payloads() {
        assert_eq!(panic_message(&"boom"), "boom");
        assert_eq!(panic_message(&String::from("bang")), "bang");
        assert_eq!(panic_message(&42_u8), "unknown panic payload");
    }
}
