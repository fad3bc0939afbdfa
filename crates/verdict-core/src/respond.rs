use bytes::{Bytes, BytesMut};
use http::header::{self, HeaderMap, HeaderName, HeaderValue};
use http::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::error::{ApplicationError, BoxError};
use crate::handler::Request;

/// Where a handler writes its response
///
/// Provided by the transport for each request. A request gets at most one
/// response; writing twice is a bug in the caller and is not detected here.
pub trait ResponseSink: Send {
    /// Set the response status
    fn write_status(&mut self, status: StatusCode);

    /// Set a response header, replacing any previous value
    fn insert_header(&mut self, name: HeaderName, value: HeaderValue);

    /// Append to the response body
    ///
    /// # Errors
    ///
    /// Returns an error if the transport can no longer accept the body.
    fn write_body(&mut self, body: Bytes) -> Result<(), BoxError>;

    /// Status written so far, if any
    fn status(&self) -> Option<StatusCode>;
}

/// Failure to emit a response
#[derive(Debug, Error)]
pub enum EmitError {
    #[error("serializing response body: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("writing response body: {0}")]
    Write(#[source] BoxError),
}

/// Serialize `payload` as JSON and write it with `status`
///
/// The payload is serialized before anything reaches the sink. `204 No
/// Content` writes the status alone.
///
/// Must be called at most once per request.
///
/// # Errors
///
/// Returns [`EmitError::Serialize`] if the payload cannot be serialized
/// (the sink is left untouched) and [`EmitError::Write`] if the sink
/// rejects the body.
pub fn respond<T>(sink: &mut dyn ResponseSink, payload: &T, status: StatusCode) -> Result<(), EmitError>
where
    T: Serialize + ?Sized,
{
    if status == StatusCode::NO_CONTENT {
        sink.write_status(status);
        return Ok(());
    }

    let body = serde_json::to_vec(payload)?;

    sink.write_status(status);
    sink.insert_header(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    sink.write_body(Bytes::from(body)).map_err(EmitError::Write)
}

/// Request body that could not be decoded
#[derive(Debug, Error)]
#[error("decoding request body: {0}")]
pub struct DecodeError(#[from] serde_json::Error);

/// Decode the JSON request body
///
/// # Errors
///
/// Returns a `400 Bad Request` application error describing why the body
/// is not valid JSON for `T`.
pub fn decode<T: DeserializeOwned>(request: &Request) -> Result<T, ApplicationError> {
    serde_json::from_slice(request.body())
        .map_err(|e| ApplicationError::bad_request(DecodeError::from(e)))
}

/// Sink that buffers the response in memory until the chain returns
#[derive(Debug, Default)]
pub struct BufferedResponse {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: BytesMut,
}

impl BufferedResponse {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Finish the response; a chain that wrote nothing yields an empty `200 OK`
    #[must_use]
    pub fn into_response(self) -> http::Response<Bytes> {
        let mut response = http::Response::new(self.body.freeze());
        *response.status_mut() = self.status.unwrap_or(StatusCode::OK);
        *response.headers_mut() = self.headers;
        response
    }
}

impl ResponseSink for BufferedResponse {
    fn write_status(&mut self, status: StatusCode) {
        self.status = Some(status);
    }

    fn insert_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    fn write_body(&mut self, body: Bytes) -> Result<(), BoxError> {
        self.body.extend_from_slice(&body);
        Ok(())
    }

    fn status(&self) -> Option<StatusCode> {
        self.status
    }
}
