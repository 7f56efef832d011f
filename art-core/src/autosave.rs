//! Autosave: persist the document on every change.

use std::sync::Arc;

use crate::store::PreferenceStore;
use crate::{Document, DocumentId};

/// Receives every republished document.
pub trait DocumentObserver: Send + Sync {
    /// Called once per document change with the up-to-date document.
    fn document_changed(&self, document: &Document);
}

/// Writes the serialized document to a [`PreferenceStore`] on each change.
///
/// Writes are fire-and-forget: failures are logged and dropped, and every
/// change produces exactly one write.
#[derive(Clone)]
pub struct AutosaveSink {
    key: String,
    store: Arc<dyn PreferenceStore>,
}

impl AutosaveSink {
    /// Create a sink for the document with the given identity.
    #[must_use]
    pub fn new(id: DocumentId, store: Arc<dyn PreferenceStore>) -> Self {
        Self {
            key: id.storage_key(),
            store,
        }
    }

    /// The preference key documents are saved under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl std::fmt::Debug for AutosaveSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutosaveSink")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl DocumentObserver for AutosaveSink {
    fn document_changed(&self, document: &Document) {
        let bytes = match document.to_json_bytes() {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!("Failed to serialize document {}: {e}", document.id());
                return;
            }
        };
        tracing::debug!(
            key = %self.key,
            json = %String::from_utf8_lossy(&bytes),
            "Autosaving document"
        );
        if let Err(e) = self.store.set(&self.key, &bytes) {
            tracing::warn!("Failed to autosave document to {}: {e}", self.key);
        }
    }
}

/// Load the document saved for `id`, or an empty one.
///
/// Missing keys, unreadable storage, and corrupt bytes all fall back to an
/// empty document.
#[must_use]
pub fn load_document(id: DocumentId, store: &dyn PreferenceStore) -> Document {
    let key = id.storage_key();
    match store.get(&key) {
        Ok(Some(bytes)) => Document::from_json_bytes(id, &bytes).unwrap_or_else(|e| {
            tracing::warn!("Discarding unreadable document {key}: {e}");
            Document::new(id)
        }),
        Ok(None) => {
            tracing::debug!("No saved document under {key}, starting empty");
            Document::new(id)
        }
        Err(e) => {
            tracing::warn!("Failed to read document {key}: {e}");
            Document::new(id)
        }
    }
}

/// IDs of all documents saved in `store`.
///
/// # Errors
///
/// Returns an error if the store's keys cannot be listed.
pub fn saved_document_ids(
    store: &dyn PreferenceStore,
) -> Result<Vec<DocumentId>, crate::store::StoreError> {
    Ok(store
        .keys()?
        .iter()
        .filter_map(|key| DocumentId::from_storage_key(key))
        .collect())
}
