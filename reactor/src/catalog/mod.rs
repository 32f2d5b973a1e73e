//! Product and category catalog over a pluggable document store.
//!
//! [`ProductService`] holds the catalog operations and is generic over the [`DocumentStore`]
//! used for products and categories. [`MemoryStore`] is the bundled implementation. Listings can
//! be streamed through a [`crate::stream::BoundedPullConsumer`] with
//! [`ProductService::stream_all`].

mod document;
mod memory;
mod service;
mod store;

pub use document::{Category, Document, Product};
pub use memory::MemoryStore;
pub use service::ProductService;
pub use store::DocumentStore;
