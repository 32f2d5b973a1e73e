use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::bail;
use crate::catalog::document::Document;
use crate::catalog::store::DocumentStore;
use crate::error::{ErrorKind, ReactorResult};

/// Inner state of [`MemoryStore`].
#[derive(Debug)]
struct Inner<D> {
    /// Documents keyed by their insertion sequence number.
    documents: BTreeMap<u64, D>,
    /// Maps document ids to their sequence number.
    sequence_by_id: HashMap<String, u64>,
    next_sequence: u64,
}

/// In-memory [`DocumentStore`].
///
/// Ids are random UUIDs assigned on first save. Listing returns documents in the order they were
/// first saved, replacing a document keeps its position. All data is lost when the store is
/// dropped.
#[derive(Debug, Clone)]
pub struct MemoryStore<D> {
    inner: Arc<Mutex<Inner<D>>>,
}

impl<D> MemoryStore<D> {
    /// Creates a new empty memory store.
    pub fn new() -> Self {
        let inner = Inner {
            documents: BTreeMap::new(),
            sequence_by_id: HashMap::new(),
            next_sequence: 0,
        };

        Self {
            inner: Arc::new(Mutex::new(inner)),
        }
    }
}

impl<D> Default for MemoryStore<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> DocumentStore<D> for MemoryStore<D>
where
    D: Document,
{
    async fn save(&self, mut document: D) -> ReactorResult<D> {
        let mut inner = self.inner.lock().await;

        let id = match document.id().map(str::to_string) {
            Some(id) => id,
            None => {
                let id = Uuid::new_v4().to_string();
                document.set_id(id.clone());
                id
            }
        };

        let sequence = match inner.sequence_by_id.get(&id).copied() {
            Some(sequence) => sequence,
            None => {
                let sequence = inner.next_sequence;
                inner.next_sequence += 1;
                inner.sequence_by_id.insert(id, sequence);
                sequence
            }
        };
        inner.documents.insert(sequence, document.clone());

        Ok(document)
    }

    async fn find_by_id(&self, id: &str) -> ReactorResult<Option<D>> {
        let inner = self.inner.lock().await;

        Ok(inner
            .sequence_by_id
            .get(id)
            .and_then(|sequence| inner.documents.get(sequence))
            .cloned())
    }

    async fn find_all(&self) -> ReactorResult<Vec<D>> {
        let inner = self.inner.lock().await;

        Ok(inner.documents.values().cloned().collect())
    }

    async fn delete(&self, document: &D) -> ReactorResult<()> {
        let Some(id) = document.id() else {
            bail!(
                ErrorKind::DocumentNotFound,
                "Cannot delete a document that was never saved"
            );
        };

        let mut inner = self.inner.lock().await;
        let Some(sequence) = inner.sequence_by_id.remove(id) else {
            bail!(
                ErrorKind::DocumentNotFound,
                "Document to delete does not exist",
                format!("id {id}")
            );
        };
        inner.documents.remove(&sequence);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::document::Category;

    #[tokio::test]
    async fn save_assigns_id_and_keeps_insertion_order() {
        let store = MemoryStore::new();

        let first = store.save(Category::new("Sport")).await.unwrap();
        let second = store.save(Category::new("Furniture")).await.unwrap();

        assert!(first.id.is_some());
        assert_ne!(first.id, second.id);

        let names: Vec<_> = store
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .map(|category| category.name)
            .collect();
        assert_eq!(names, vec!["Sport", "Furniture"]);
    }

    #[tokio::test]
    async fn saving_an_existing_document_replaces_it_in_place() {
        let store = MemoryStore::new();
        let mut first = store.save(Category::new("Sport")).await.unwrap();
        store.save(Category::new("Furniture")).await.unwrap();

        first.name = "Outdoor".to_string();
        store.save(first.clone()).await.unwrap();

        let all = store.find_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0], first);
    }

    #[tokio::test]
    async fn delete_removes_document() {
        let store = MemoryStore::new();
        let category = store.save(Category::new("Sport")).await.unwrap();
        let id = category.id.clone().unwrap();

        store.delete(&category).await.unwrap();

        assert!(store.find_by_id(&id).await.unwrap().is_none());
        assert!(store.find_all().await.unwrap().is_empty());

        let err = store.delete(&category).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DocumentNotFound);
    }

    #[tokio::test]
    async fn unsaved_document_cannot_be_deleted() {
        let store = MemoryStore::new();

        let err = store.delete(&Category::new("Sport")).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::DocumentNotFound);
    }
}
