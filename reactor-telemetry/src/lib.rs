//! Logging setup shared by the reactor binaries and tests.

pub mod tracing;
