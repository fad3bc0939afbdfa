use axum::Router;
use axum::body::Body;
use axum::extract::rejection::RawPathParamsRejection;
use axum::extract::{RawPathParams, State};
use axum::response::{IntoResponse, Response};
use axum::routing::MethodFilter;
use http::StatusCode;
use http_body_util::LengthLimitError;
use verdict_core::{BoxHandler, BufferedResponse, Chain, PathParams, RequestContext};

/// Routes whose handlers all run inside one middleware chain
pub struct App {
    router: Router,
    chain: Chain,
    body_limit: usize,
}

impl App {
    /// `body_limit` caps the buffered request body in bytes
    #[must_use]
    pub fn new(chain: Chain, body_limit: usize) -> Self {
        Self {
            router: Router::new(),
            chain,
            body_limit,
        }
    }

    /// Register `handler` for `method` requests to `path`
    ///
    /// The handler is wrapped in the app's middleware chain. Path parameters
    /// use axum syntax (`/v1/products/{id}`) and are readable through
    /// [`PathParams`].
    #[must_use]
    pub fn handle(mut self, method: MethodFilter, path: &str, handler: BoxHandler) -> Self {
        let endpoint = Endpoint {
            handler: self.chain.build(handler),
            body_limit: self.body_limit,
        };

        self.router = self
            .router
            .route(path, axum::routing::on(method, dispatch).with_state(endpoint));
        self
    }

    pub fn into_router(self) -> Router {
        self.router
    }
}

#[derive(Clone)]
struct Endpoint {
    handler: BoxHandler,
    body_limit: usize,
}

/// Run one request through the chain and turn the sink into a response
///
/// Whatever the chain returns as a failure has already escaped error
/// handling; it is logged and answered with a bare 500.
async fn dispatch(
    State(endpoint): State<Endpoint>,
    params: Result<RawPathParams, RawPathParamsRejection>,
    request: axum::extract::Request,
) -> Response {
    let (mut parts, body) = request.into_parts();

    let body = match axum::body::to_bytes(body, endpoint.body_limit).await {
        Ok(body) => body,
        Err(e) if is_length_limit(&e) => return StatusCode::PAYLOAD_TOO_LARGE.into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "failed to read request body");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    if let Ok(params) = params {
        parts.extensions.insert(params.iter().collect::<PathParams>());
    }

    let trace_id = parts
        .extensions
        .get::<RequestContext>()
        .map_or_else(|| "-".to_owned(), |context| context.trace_id.clone());

    let mut sink = BufferedResponse::new();
    if let Err(failure) = endpoint.handler.call(http::Request::from_parts(parts, body), &mut sink).await {
        tracing::error!(%trace_id, "{trace_id} : FATAL : {failure:#}");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    sink.into_response().map(Body::from)
}

fn is_length_limit(error: &axum::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(error);
    while let Some(e) = source {
        if e.is::<LengthLimitError>() {
            return true;
        }
        source = e.source();
    }
    false
}
