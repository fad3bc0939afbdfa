use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Request};
use axum::middleware::Next;
use axum::response::Response;
use http::{HeaderName, HeaderValue};
use uuid::Uuid;
use verdict_core::{RemoteAddr, RequestContext};

/// Longest incoming request id reused as a trace id
const MAX_TRACE_ID_LEN: usize = 128;

/// Middleware that attaches a `RequestContext` to every request
///
/// Reuses the caller's request id when present, otherwise generates one,
/// and echoes it back under the same header.
pub async fn request_context_middleware(request_id_header: HeaderName, mut request: Request, next: Next) -> Response {
    let trace_id = request
        .headers()
        .get(&request_id_header)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty() && value.len() <= MAX_TRACE_ID_LEN)
        .map_or_else(|| Uuid::new_v4().to_string(), ToOwned::to_owned);

    let mut context = RequestContext::new(trace_id.clone());
    if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        context = context.with_value(RemoteAddr(*addr));
    }

    request.extensions_mut().insert(context);

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::try_from(trace_id) {
        response.headers_mut().insert(request_id_header, value);
    }

    response
}
