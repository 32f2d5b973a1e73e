use std::future::Future;

use crate::catalog::document::Document;
use crate::error::ReactorResult;

/// Persistence capability for catalog documents.
///
/// Implementations assign an id to documents saved without one and must be safe to share
/// between tasks.
pub trait DocumentStore<D>
where
    D: Document,
{
    /// Inserts `document`, or replaces the stored document with the same id.
    ///
    /// Returns the stored document with its id set.
    fn save(&self, document: D) -> impl Future<Output = ReactorResult<D>> + Send;

    /// Returns the document with the given id, if any.
    fn find_by_id(&self, id: &str) -> impl Future<Output = ReactorResult<Option<D>>> + Send;

    /// Returns all documents in insertion order.
    fn find_all(&self) -> impl Future<Output = ReactorResult<Vec<D>>> + Send;

    /// Removes `document` from the store.
    ///
    /// Fails with [`crate::error::ErrorKind::DocumentNotFound`] when the document was never
    /// saved or is no longer stored.
    fn delete(&self, document: &D) -> impl Future<Output = ReactorResult<()>> + Send;
}
