//! Concurrency primitives underpinning the stream plumbing.
//!
//! The stream layer coordinates exactly one producer task with one consumer task per
//! subscription. The primitives in this module are small and single-purpose:
//!
//! - [`demand`] keeps the running demand balance that bounds how far a producer may run ahead
//!   of its consumer. A balance is either finite or unbounded, and a zero-sized request is
//!   rejected.
//! - [`timer`] provides the repeating timer that drives scheduled emission, with idempotent
//!   cancellation so a terminal transition can cancel it without tracking whether someone
//!   else already did.
//!
//! Higher level coordination (demand waits, cancellation propagation and the signal channel)
//! lives in [`crate::stream`].

pub mod demand;
pub mod timer;
