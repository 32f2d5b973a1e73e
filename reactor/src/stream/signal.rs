use std::fmt;

use crate::error::ReactorError;

/// Signals flowing from a producer to its consumer.
///
/// A stream delivers any number of [`Signal::Next`] followed by at most one terminal signal.
#[derive(Debug, Clone)]
pub enum Signal<T> {
    /// A delivered item.
    Next(T),
    /// Terminal failure.
    Error(ReactorError),
    /// Terminal success.
    Complete,
}

impl<T> Signal<T> {
    /// Returns `true` for [`Signal::Error`] and [`Signal::Complete`].
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Signal::Next(_))
    }
}

/// Terminal state of a subscription as observed by the caller of
/// [`crate::stream::subscribe`].
#[derive(Debug, Clone, PartialEq)]
pub enum StreamOutcome {
    /// The source completed normally.
    Completed,
    /// The source, the consumer or the flow-control protocol failed.
    Errored(ReactorError),
    /// The consumer cancelled the subscription before a terminal signal arrived.
    Cancelled,
}

impl StreamOutcome {
    /// Returns `true` if the stream completed normally.
    pub fn is_completed(&self) -> bool {
        matches!(self, StreamOutcome::Completed)
    }

    /// Returns the terminal error, if any.
    pub fn error(&self) -> Option<&ReactorError> {
        match self {
            StreamOutcome::Errored(err) => Some(err),
            _ => None,
        }
    }

    /// Converts the outcome into a result, treating cancellation as success.
    pub fn into_result(self) -> Result<(), ReactorError> {
        match self {
            StreamOutcome::Errored(err) => Err(err),
            StreamOutcome::Completed | StreamOutcome::Cancelled => Ok(()),
        }
    }
}

impl fmt::Display for StreamOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamOutcome::Completed => write!(f, "completed"),
            StreamOutcome::Errored(err) => write!(f, "errored ({:?})", err.kind()),
            StreamOutcome::Cancelled => write!(f, "cancelled"),
        }
    }
}
