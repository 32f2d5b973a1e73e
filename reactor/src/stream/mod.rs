//! Demand-driven streams between one producer and one consumer.
//!
//! A [`Publisher`] is a cold source: every subscription runs it from its initial state on its
//! own tokio task. The producer pushes items through an [`Emitter`], which waits until the
//! consumer has granted demand through its [`Subscription`]. The consumer is a [`Subscriber`]
//! whose callbacks run sequentially on the task that called [`subscribe`].
//!
//! On top of these building blocks the module provides:
//!
//! - [`BoundedPullConsumer`], which keeps at most one batch of items in flight.
//! - [`IntervalPublisher`], a timer-driven counter with an optional injected fault.
//! - [`with_retry`], which rebuilds and resubscribes a failing source within a retry budget.

mod bounded;
mod driver;
mod emitter;
mod interval;
mod policy;
mod publisher;
mod retry;
mod signal;
mod subscriber;
mod subscription;

pub use bounded::{BoundedPullConsumer, ConsumerReport, ConsumerState, subscribe_bounded};
pub use driver::subscribe;
pub use emitter::{Emitter, Termination};
pub use interval::{EmissionState, IntervalPublisher};
pub use policy::{ErrorHandlingPolicy, RetryDirective, build_error_handling_policy};
pub use publisher::{IterPublisher, Publisher, StreamPublisher};
pub use retry::{Retry, RetryState, with_retry};
pub use signal::{Signal, StreamOutcome};
pub use subscriber::{Collect, ForEach, Subscriber};
pub use subscription::Subscription;
