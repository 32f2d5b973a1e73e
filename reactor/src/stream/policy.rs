use crate::error::{ErrorKind, ReactorError};

/// Retry behavior for a classified stream error.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum RetryDirective {
    /// The source can be resubscribed from its initial state.
    Resubscribe,
    /// The error is terminal for the stream.
    NoRetry,
}

/// Policy describing how a [`ReactorError`] reaching a retrying stream should be handled.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct ErrorHandlingPolicy {
    retry_directive: RetryDirective,
    solution: Option<&'static str>,
}

impl ErrorHandlingPolicy {
    const fn new(retry_directive: RetryDirective, solution: Option<&'static str>) -> Self {
        Self {
            retry_directive,
            solution,
        }
    }

    /// Returns the retry directive for this policy.
    pub fn retry_directive(&self) -> RetryDirective {
        self.retry_directive
    }

    /// Returns an optional operator-facing solution message.
    pub fn solution(&self) -> Option<&'static str> {
        self.solution
    }
}

/// Builds an [`ErrorHandlingPolicy`] from a [`ReactorError`].
pub fn build_error_handling_policy(error: &ReactorError) -> ErrorHandlingPolicy {
    match error.kind() {
        // Source faults are the only errors a fresh subscription can recover from.
        ErrorKind::SimulatedFault => ErrorHandlingPolicy::new(RetryDirective::Resubscribe, None),

        ErrorKind::BackpressureViolation => ErrorHandlingPolicy::new(
            RetryDirective::NoRetry,
            Some("Make sure the producer only emits through its emitter."),
        ),
        ErrorKind::InvalidDemand => ErrorHandlingPolicy::new(
            RetryDirective::NoRetry,
            Some("Request a positive number of items."),
        ),
        ErrorKind::RetryExhausted => ErrorHandlingPolicy::new(
            RetryDirective::NoRetry,
            Some("Increase the retry budget or fix the failing source."),
        ),

        _ => ErrorHandlingPolicy::new(RetryDirective::NoRetry, None),
    }
}
