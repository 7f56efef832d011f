//! Integration tests for document persistence.
//!
//! Saves documents through the autosave sink into a file store, drops
//! everything, and reloads from the same directory (simulating an app restart).

use std::sync::Arc;

use art_core::{
    load_document, saved_document_ids, AutosaveSink, Document, DocumentId, DocumentObserver,
    FileStore, Offset, PreferenceStore,
};
use proptest::prelude::*;
use url::Url;

#[test]
fn test_document_survives_restart() {
    let dir = tempfile::tempdir().expect("tempdir");
    let id = DocumentId::new();

    // Phase 1: edit and autosave
    let moved = {
        let store: Arc<dyn PreferenceStore> = Arc::new(FileStore::new(dir.path()).expect("store"));
        let sink = AutosaveSink::new(id, store);
        let mut document = Document::new(id);

        document.add_emoji("🌞", 100, 50, 80);
        sink.document_changed(&document);

        let moved = document.add_emoji("🌊", 10, 300, 40);
        sink.document_changed(&document);

        document
            .emoji_mut(moved)
            .expect("just added")
            .translate(Offset::new(5.0, -5.0));
        sink.document_changed(&document);

        document.set_background_url(Some(
            Url::parse("https://example.com/beach.jpg").expect("url"),
        ));
        sink.document_changed(&document);
        moved
    };

    // Phase 2: reopen
    let store = FileStore::new(dir.path()).expect("reopen");
    let document = load_document(id, &store);
    assert_eq!(document.emoji_count(), 2);
    let emoji = document.emoji(moved).expect("moved emoji persisted");
    assert_eq!((emoji.x, emoji.y), (15, 295));
    assert_eq!(
        document.background_url().map(Url::as_str),
        Some("https://example.com/beach.jpg")
    );

    assert_eq!(saved_document_ids(&store).expect("ids"), [id]);
}

#[test]
fn test_documents_are_isolated_by_identity() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store: Arc<dyn PreferenceStore> = Arc::new(FileStore::new(dir.path()).expect("store"));

    let first = DocumentId::new();
    let second = DocumentId::new();

    let mut document = Document::new(first);
    document.add_emoji("🐱", 0, 0, 20);
    AutosaveSink::new(first, Arc::clone(&store)).document_changed(&document);

    assert_eq!(load_document(first, store.as_ref()).emoji_count(), 1);
    assert!(load_document(second, store.as_ref()).is_empty());
}

#[test]
fn test_corrupt_file_loads_empty() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FileStore::new(dir.path()).expect("store");
    let id = DocumentId::new();

    store
        .set(&id.storage_key(), b"\xff\xfe definitely not json")
        .expect("set");
    let document = load_document(id, &store);
    assert!(document.is_empty());
    assert!(document.background_url().is_none());
}

proptest! {
    #[test]
    fn prop_saved_document_reloads_identically(
        emojis in prop::collection::vec(
            ("[a-z😀🌲]{1,3}", -1000i32..1000, -1000i32..1000, 1i32..500),
            0..20,
        )
    ) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path()).expect("store");
        let id = DocumentId::new();

        let mut document = Document::new(id);
        for (text, x, y, size) in emojis {
            document.add_emoji(text, x, y, size);
        }
        let store: Arc<dyn PreferenceStore> = Arc::new(store);
        AutosaveSink::new(id, Arc::clone(&store)).document_changed(&document);

        prop_assert_eq!(load_document(id, store.as_ref()), document);
    }
}
