//! Error types and result definitions for stream operations.
//!
//! Provides a single error type with classification and captured diagnostic metadata. A
//! [`ReactorError`] carries a kind, a static description, optional detail and an optional source.

use std::backtrace::Backtrace;
use std::borrow::Cow;
use std::error;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

/// Convenient result type for stream and catalog operations.
pub type ReactorResult<T> = Result<T, ReactorError>;

/// Detailed payload stored for single [`ReactorError`] instances.
#[derive(Debug, Clone)]
struct ErrorPayload {
    kind: ErrorKind,
    description: Cow<'static, str>,
    detail: Option<Cow<'static, str>>,
    source: Option<Arc<dyn error::Error + Send + Sync>>,
    location: &'static Location<'static>,
    backtrace: Arc<Backtrace>,
}

/// Main error type of the crate.
///
/// [`ReactorError`] is cheap to clone so that a terminal error can be delivered to a subscriber
/// and also returned to the caller that awaited the stream.
#[derive(Debug, Clone)]
pub struct ReactorError {
    payload: ErrorPayload,
}

/// Specific categories of errors that can occur while running streams.
#[derive(PartialEq, Eq, Copy, Clone, Debug, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    // Flow Control Errors
    BackpressureViolation,
    InvalidDemand,
    StreamCancelled,

    // Fault & Retry Errors
    SimulatedFault,
    RetryExhausted,

    // Consumer & Producer Errors
    ConsumerError,
    ProducerPanic,
    InvalidState,

    // Catalog Errors
    DocumentNotFound,
    ValidationError,
}

impl ReactorError {
    /// Returns the [`ErrorKind`] of this error.
    pub fn kind(&self) -> ErrorKind {
        self.payload.kind
    }

    /// Returns the static description of this error.
    pub fn description(&self) -> &str {
        self.payload.description.as_ref()
    }

    /// Returns the detailed error information if available.
    pub fn detail(&self) -> Option<&str> {
        self.payload.detail.as_deref()
    }

    /// Returns the captured backtrace for this error.
    pub fn backtrace(&self) -> &Backtrace {
        self.payload.backtrace.as_ref()
    }

    /// Returns the captured callsite location for this error.
    pub fn location(&self) -> &'static Location<'static> {
        self.payload.location
    }

    /// Attaches an originating [`error::Error`] to this error and returns the modified instance.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: error::Error + Send + Sync + 'static,
    {
        self.payload.source = Some(Arc::new(source));

        self
    }

    /// Creates a [`ReactorError`] from its components.
    #[track_caller]
    fn from_components(
        kind: ErrorKind,
        description: Cow<'static, str>,
        detail: Option<Cow<'static, str>>,
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    ) -> Self {
        ReactorError {
            payload: ErrorPayload {
                kind,
                description,
                detail,
                source,
                location: Location::caller(),
                backtrace: Arc::new(Backtrace::capture()),
            },
        }
    }
}

impl PartialEq for ReactorError {
    /// Errors compare equal when their kinds match.
    fn eq(&self, other: &ReactorError) -> bool {
        self.payload.kind == other.payload.kind
    }
}

impl fmt::Display for ReactorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        let payload = &self.payload;
        let location = payload.location;
        write!(
            f,
            "[{:?}] {} @ {}:{}:{}",
            payload.kind,
            payload.description,
            location.file(),
            location.line(),
            location.column()
        )?;

        write_detail(payload.detail.as_deref(), f, 1)?;
        write_backtrace(payload.backtrace.as_ref(), f, 1)?;

        Ok(())
    }
}

impl error::Error for ReactorError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        self.payload
            .source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn error::Error + 'static))
    }
}

/// Writes the captured backtrace with indentation.
fn write_backtrace(
    backtrace: &Backtrace,
    f: &mut fmt::Formatter<'_>,
    indent: usize,
) -> fmt::Result {
    let indent_str = "  ".repeat(indent);

    let rendered_backtrace = format!("{backtrace}");
    if !rendered_backtrace.trim().is_empty() {
        write!(f, "\n{indent_str}Backtrace:")?;
        for line in rendered_backtrace.lines() {
            if line.trim().is_empty() {
                write!(f, "\n{indent_str}  ")?;
            } else {
                write!(f, "\n{indent_str}  {line}")?;
            }
        }
    }

    Ok(())
}

/// Writes the detail block with indentation.
fn write_detail(detail: Option<&str>, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
    let Some(detail) = detail else {
        return Ok(());
    };

    let indent_str = "  ".repeat(indent);
    if detail.trim().is_empty() {
        return write!(f, "\n{indent_str}Detail: <empty>");
    }

    write!(f, "\n{indent_str}Detail:")?;
    for line in detail.lines() {
        if line.trim().is_empty() {
            write!(f, "\n{indent_str}  ")?;
        } else {
            write!(f, "\n{indent_str}  {line}")?;
        }
    }

    Ok(())
}

/// Creates a [`ReactorError`] from an error kind and static description.
impl From<(ErrorKind, &'static str)> for ReactorError {
    #[track_caller]
    fn from((kind, desc): (ErrorKind, &'static str)) -> ReactorError {
        ReactorError::from_components(kind, Cow::Borrowed(desc), None, None)
    }
}

/// Creates a [`ReactorError`] from an error kind, static description, and dynamic detail.
impl<D> From<(ErrorKind, &'static str, D)> for ReactorError
where
    D: Into<Cow<'static, str>>,
{
    #[track_caller]
    fn from((kind, desc, detail): (ErrorKind, &'static str, D)) -> ReactorError {
        ReactorError::from_components(kind, Cow::Borrowed(desc), Some(detail.into()), None)
    }
}

/// Converts a [`tokio::task::JoinError`] into [`ErrorKind::ProducerPanic`] or
/// [`ErrorKind::StreamCancelled`].
impl From<tokio::task::JoinError> for ReactorError {
    #[track_caller]
    fn from(err: tokio::task::JoinError) -> ReactorError {
        let (kind, description) = if err.is_panic() {
            (ErrorKind::ProducerPanic, "Producer task panicked")
        } else {
            (ErrorKind::StreamCancelled, "Producer task was aborted")
        };

        let detail = err.to_string();
        ReactorError::from_components(
            kind,
            Cow::Borrowed(description),
            Some(Cow::Owned(detail)),
            Some(Arc::new(err)),
        )
    }
}
