//! Demand-driven streaming primitives with explicit backpressure.
//!
//! The crate connects one producer with one consumer per subscription. Consumers grant demand,
//! producers wait for it, and every delivery is checked against what was granted. On top of the
//! protocol in [`stream`] the crate provides a batch-bounded consumer, a timer-driven source with
//! fault injection and a bounded retry wrapper. The [`catalog`] module exposes a small product
//! catalog whose listings can be streamed through the same machinery.

pub mod catalog;
pub mod concurrency;
pub mod error;
mod macros;
pub mod stream;
