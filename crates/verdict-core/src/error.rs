use std::fmt;

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Type-erased error used as the cause of a failure
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A single field that failed validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub reason: String,
}

impl FieldError {
    #[must_use]
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// A failure deliberately authored for the client
///
/// Carries the status code to answer with and, for validation failures,
/// the offending fields. The cause's text is shown to the client when the
/// status is below 500.
///
/// This type does not implement [`std::error::Error`] so that it converts
/// into [`Failure::Application`] rather than [`Failure::Internal`].
#[derive(Debug)]
pub struct ApplicationError {
    cause: BoxError,
    status: StatusCode,
    fields: Vec<FieldError>,
}

impl ApplicationError {
    #[must_use]
    pub fn new(status: StatusCode, cause: impl Into<BoxError>) -> Self {
        Self {
            cause: cause.into(),
            status,
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn bad_request(cause: impl Into<BoxError>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, cause)
    }

    #[must_use]
    pub fn not_found(cause: impl Into<BoxError>) -> Self {
        Self::new(StatusCode::NOT_FOUND, cause)
    }

    #[must_use]
    pub fn with_fields(mut self, fields: Vec<FieldError>) -> Self {
        self.fields = fields;
        self
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldError] {
        &self.fields
    }

    #[must_use]
    pub fn cause(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self.cause.as_ref()
    }
}

impl fmt::Display for ApplicationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.cause)?;
        if f.alternate() {
            write_sources(f, self.cause.as_ref())?;
        }
        Ok(())
    }
}

/// Collects field validation failures
#[derive(Debug, Default)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: impl Into<String>, reason: impl Into<String>) {
        self.0.push(FieldError::new(field, reason));
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Turn the collected failures into a `400 Bad Request`
    ///
    /// # Errors
    ///
    /// Returns an [`ApplicationError`] listing every collected field when
    /// at least one field failed.
    pub fn into_result(self) -> Result<(), ApplicationError> {
        if self.0.is_empty() {
            return Ok(());
        }

        Err(ApplicationError::bad_request("field validation error").with_fields(self.0))
    }
}

/// Faults in how the handler chain itself was assembled or ran
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("request context missing from request extensions")]
    MissingContext,
    #[error("panic: {0}")]
    Panicked(String),
}

/// The failure value propagated up the handler chain
///
/// Converts from any [`std::error::Error`] as [`Failure::Internal`] and
/// from [`ApplicationError`] as [`Failure::Application`], so `?` works in
/// handlers. Intermediate handlers annotate failures with
/// [`ResultExt::context`] without hiding the root cause.
#[derive(Debug)]
pub enum Failure {
    /// Client-facing failure with a chosen status
    Application(ApplicationError),
    /// Anything else: infrastructure failures, bugs
    Internal(BoxError),
    /// Context added on the way up
    Annotated { context: String, source: Box<Self> },
}

impl Failure {
    #[must_use]
    pub fn internal(error: impl Into<BoxError>) -> Self {
        Self::Internal(error.into())
    }

    /// Wrap this failure in another layer of context
    #[must_use]
    pub fn annotate(self, context: impl fmt::Display) -> Self {
        Self::Annotated {
            context: context.to_string(),
            source: Box::new(self),
        }
    }

    /// The innermost failure below every annotation layer
    #[must_use]
    pub fn root_cause(&self) -> &Self {
        let mut current = self;
        while let Self::Annotated { source, .. } = current {
            current = source;
        }
        current
    }

    /// The application error at the root, if the failure was authored as one
    #[must_use]
    pub fn as_application(&self) -> Option<&ApplicationError> {
        match self.root_cause() {
            Self::Application(error) => Some(error),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_application(&self) -> bool {
        self.as_application().is_some()
    }

    /// Number of annotation layers above the root cause
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self;
        while let Self::Annotated { source, .. } = current {
            depth += 1;
            current = source;
        }
        depth
    }
}

/// `{}` prints the annotation chain; `{:#}` also follows `source()` of the root cause
impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Annotated { context, source } => {
                write!(f, "{context}: ")?;
                fmt::Display::fmt(source, f)
            }
            Self::Application(error) => fmt::Display::fmt(error, f),
            Self::Internal(error) => {
                write!(f, "{error}")?;
                if f.alternate() {
                    write_sources(f, error.as_ref())?;
                }
                Ok(())
            }
        }
    }
}

impl<E> From<E> for Failure
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn from(error: E) -> Self {
        Self::Internal(Box::new(error))
    }
}

impl From<ApplicationError> for Failure {
    fn from(error: ApplicationError) -> Self {
        Self::Application(error)
    }
}

fn write_sources(f: &mut fmt::Formatter<'_>, error: &(dyn std::error::Error + 'static)) -> fmt::Result {
    let mut source = error.source();
    while let Some(cause) = source {
        write!(f, ": {cause}")?;
        source = cause.source();
    }
    Ok(())
}

/// Annotate the error of a `Result` on its way up the chain
pub trait ResultExt<T> {
    /// # Errors
    ///
    /// Returns the original failure wrapped in `context`.
    fn context<C: fmt::Display>(self, context: C) -> Result<T, Failure>;

    /// # Errors
    ///
    /// Returns the original failure wrapped in the context built by `f`.
    fn with_context<C, F>(self, f: F) -> Result<T, Failure>
    where
        C: fmt::Display,
        F: FnOnce() -> C;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<Failure>,
{
    fn context<C: fmt::Display>(self, context: C) -> Result<T, Failure> {
        self.map_err(|error| error.into().annotate(context))
    }

    fn with_context<C, F>(self, f: F) -> Result<T, Failure>
    where
        C: fmt::Display,
        F: FnOnce() -> C,
    {
        self.map_err(|error| error.into().annotate(f()))
    }
}
