//! Integration tests for the document view-model.
//!
//! Covers autosave write accounting, reload across view-model instances, and
//! the background fetch ordering guarantees.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use art_app::{BackgroundState, DocumentViewModel, ViewModelEvent};
use art_core::{Document, DocumentId, EmojiId, MemoryStore, Offset, Point, PreferenceStore};
use art_image::{ByteSource, FetchError, ImageFetcher};
use async_trait::async_trait;
use proptest::prelude::*;
use tokio::sync::oneshot;
use url::Url;

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 100, 50, 255]));
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .expect("encode png");
    bytes
}

fn url(s: &str) -> Url {
    Url::parse(s).expect("valid url")
}

/// Holds each fetch until the test releases it.
#[derive(Default)]
struct GatedSource {
    gates: Mutex<HashMap<String, oneshot::Receiver<Vec<u8>>>>,
}

impl GatedSource {
    fn gate(&self, url: &str) -> oneshot::Sender<Vec<u8>> {
        let (tx, rx) = oneshot::channel();
        self.gates
            .lock()
            .expect("lock")
            .insert(url.to_string(), rx);
        tx
    }
}

#[async_trait]
impl ByteSource for GatedSource {
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        let rx = self
            .gates
            .lock()
            .expect("lock")
            .remove(url.as_str())
            .ok_or_else(|| FetchError::Status {
                status: 404,
                url: url.to_string(),
            })?;
        rx.await
            .map_err(|_| FetchError::DataUri("gate dropped".to_string()))
    }
}

/// Panics instead of answering.
struct PanickingSource;

#[async_trait]
impl ByteSource for PanickingSource {
    async fn fetch(&self, _url: &Url) -> Result<Vec<u8>, FetchError> {
        panic!("source blew up");
    }
}

fn open_with(
    id: DocumentId,
    store: &Arc<MemoryStore>,
    source: &Arc<GatedSource>,
) -> DocumentViewModel {
    let store: Arc<dyn PreferenceStore> = store.clone();
    DocumentViewModel::open(id, store, ImageFetcher::new(source.clone()))
}

fn saved(store: &MemoryStore, id: DocumentId) -> Document {
    let bytes = store
        .get(&id.storage_key())
        .expect("readable")
        .expect("saved");
    Document::from_json_bytes(id, &bytes).expect("valid document")
}

// ===========================================================================
// Autosave
// ===========================================================================

#[tokio::test]
async fn test_every_mutation_writes_once_with_current_state() {
    let store = Arc::new(MemoryStore::new());
    let source = Arc::new(GatedSource::default());
    let id = DocumentId::new();
    let mut vm = open_with(id, &store, &source);
    assert_eq!(store.write_count(), 0, "opening must not write");

    let emoji = vm.add_emoji("🐸", Point::new(10.0, 10.0), 30.0);
    assert_eq!(store.write_count(), 1);
    assert_eq!(saved(&store, id).emoji_count(), 1);

    vm.move_emoji(emoji, Offset::new(5.0, 5.0));
    assert_eq!(store.write_count(), 2);
    assert_eq!(saved(&store, id).emoji(emoji).map(|e| (e.x, e.y)), Some((15, 15)));

    vm.scale_emoji(emoji, 2.0);
    assert_eq!(store.write_count(), 3);
    assert_eq!(saved(&store, id).emoji(emoji).map(|e| e.size), Some(60));

    let _gate = source.gate("https://img.test/pond.png");
    vm.set_background_url(Some(url("https://img.test/pond.png")));
    assert_eq!(store.write_count(), 4);
    assert_eq!(
        saved(&store, id).background_url().map(Url::as_str),
        Some("https://img.test/pond.png")
    );
}

#[tokio::test]
async fn test_background_completion_does_not_write() {
    let store = Arc::new(MemoryStore::new());
    let source = Arc::new(GatedSource::default());
    let mut vm = open_with(DocumentId::new(), &store, &source);

    let gate = source.gate("https://img.test/a.png");
    vm.set_background_url(Some(url("https://img.test/a.png")));
    let writes = store.write_count();

    gate.send(png_bytes(2, 2)).expect("fetch waiting");
    assert_eq!(vm.settle_background().await, BackgroundState::Ready);
    assert_eq!(store.write_count(), writes);
}

#[tokio::test]
async fn test_reopen_restores_document_and_refetches_background() {
    let store = Arc::new(MemoryStore::new());
    let source = Arc::new(GatedSource::default());
    let id = DocumentId::new();

    let emoji = {
        let mut vm = open_with(id, &store, &source);
        let emoji = vm.add_emoji("🦄", Point::new(1.0, 2.0), 64.0);
        let _gate = source.gate("https://img.test/rainbow.png");
        vm.set_background_url(Some(url("https://img.test/rainbow.png")));
        emoji
    };

    let gate = source.gate("https://img.test/rainbow.png");
    let mut vm = open_with(id, &store, &source);
    assert_eq!(vm.emojis().len(), 1);
    assert_eq!(vm.emoji(emoji).map(|e| e.text.as_str()), Some("🦄"));
    assert_eq!(vm.background_state(), BackgroundState::Fetching);
    assert!(vm.background_image().is_none());

    gate.send(png_bytes(7, 3)).expect("fetch waiting");
    vm.settle_background().await;
    assert_eq!(
        vm.background_image().map(|image| image.dimensions()),
        Some((7, 3))
    );
}

#[test]
fn test_corrupt_saved_document_opens_empty() {
    let store = Arc::new(MemoryStore::new());
    let source = Arc::new(GatedSource::default());
    let id = DocumentId::new();
    store
        .set(&id.storage_key(), b"{\"emojis\": 42}")
        .expect("set");

    let vm = open_with(id, &store, &source);
    assert!(vm.emojis().is_empty());
    assert!(vm.background_url().is_none());
    assert_eq!(vm.background_state(), BackgroundState::Idle);
}

// ===========================================================================
// Background fetch ordering
// ===========================================================================

#[tokio::test]
async fn test_setting_background_clears_image_synchronously() {
    let store = Arc::new(MemoryStore::new());
    let source = Arc::new(GatedSource::default());
    let mut vm = open_with(DocumentId::new(), &store, &source);

    let first = source.gate("https://img.test/one.png");
    vm.set_background_url(Some(url("https://img.test/one.png")));
    first.send(png_bytes(1, 1)).expect("fetch waiting");
    vm.settle_background().await;
    assert!(vm.background_image().is_some());

    let _second = source.gate("https://img.test/two.png");
    vm.set_background_url(Some(url("https://img.test/two.png")));
    assert!(vm.background_image().is_none());
    assert_eq!(vm.background_state(), BackgroundState::Fetching);
}

#[tokio::test]
async fn test_only_latest_background_is_displayed() {
    let store = Arc::new(MemoryStore::new());
    let source = Arc::new(GatedSource::default());
    let mut vm = open_with(DocumentId::new(), &store, &source);

    let first = source.gate("https://img.test/first.png");
    let second = source.gate("https://img.test/second.png");

    vm.set_background_url(Some(url("https://img.test/first.png")));
    tokio::task::yield_now().await;
    vm.set_background_url(Some(url("https://img.test/second.png")));

    // The replaced fetch resolves first; it must never show up.
    let _ = first.send(png_bytes(1, 1));
    tokio::task::yield_now().await;
    vm.poll_background();
    assert!(vm.background_image().is_none());

    second.send(png_bytes(4, 4)).expect("fetch waiting");
    assert_eq!(vm.settle_background().await, BackgroundState::Ready);
    assert_eq!(
        vm.background_image().map(|image| image.dimensions()),
        Some((4, 4))
    );

    // Nothing else is left to apply.
    assert!(!vm.poll_background());
}

#[tokio::test]
async fn test_latest_failure_wins_over_earlier_success() {
    let store = Arc::new(MemoryStore::new());
    let source = Arc::new(GatedSource::default());
    let mut vm = open_with(DocumentId::new(), &store, &source);

    let first = source.gate("https://img.test/good.png");
    let second = source.gate("https://img.test/bad.png");
    vm.set_background_url(Some(url("https://img.test/good.png")));
    vm.set_background_url(Some(url("https://img.test/bad.png")));

    let _ = first.send(png_bytes(3, 3));
    second
        .send(b"<html>404</html>".to_vec())
        .expect("fetch waiting");

    assert_eq!(vm.settle_background().await, BackgroundState::Failed);
    assert!(vm.background_image().is_none());
}

#[tokio::test]
async fn test_clearing_background_cancels_fetch() {
    let store = Arc::new(MemoryStore::new());
    let source = Arc::new(GatedSource::default());
    let mut vm = open_with(DocumentId::new(), &store, &source);

    let gate = source.gate("https://img.test/late.png");
    vm.set_background_url(Some(url("https://img.test/late.png")));
    vm.set_background_url(None);
    let _ = gate.send(png_bytes(2, 2));

    assert_eq!(vm.settle_background().await, BackgroundState::Idle);
    assert!(vm.background_image().is_none());
    assert!(vm.background_url().is_none());
}

#[tokio::test]
async fn test_background_url_is_resolved_before_storing() {
    let store = Arc::new(MemoryStore::new());
    let source = Arc::new(GatedSource::default());
    let mut vm = open_with(DocumentId::new(), &store, &source);

    let gate = source.gate("https://cdn.test/cat.png");
    vm.set_background_url(Some(url(
        "https://search.test/imgres?imgurl=https%3A%2F%2Fcdn.test%2Fcat.png",
    )));
    assert_eq!(
        vm.background_url().map(Url::as_str),
        Some("https://cdn.test/cat.png")
    );

    gate.send(png_bytes(6, 6)).expect("fetch waiting");
    assert_eq!(vm.settle_background().await, BackgroundState::Ready);
}

#[tokio::test]
async fn test_panicking_source_settles_as_failed() {
    let store: Arc<dyn PreferenceStore> = Arc::new(MemoryStore::new());
    let mut vm =
        DocumentViewModel::create(store, ImageFetcher::new(Arc::new(PanickingSource)));

    vm.set_background_url(Some(url("https://img.test/boom.png")));
    let state = tokio::time::timeout(std::time::Duration::from_secs(5), vm.settle_background())
        .await
        .expect("settles instead of hanging");
    assert_eq!(state, BackgroundState::Failed);
    assert!(vm.background_image().is_none());
}

// ===========================================================================
// Notifications
// ===========================================================================

#[tokio::test]
async fn test_events_follow_intents() {
    let store = Arc::new(MemoryStore::new());
    let source = Arc::new(GatedSource::default());
    let mut vm = open_with(DocumentId::new(), &store, &source);
    let id = vm.id();
    let mut events = vm.subscribe();

    vm.add_emoji("🎯", Point::default(), 20.0);
    vm.move_emoji(EmojiId::new(), Offset::new(1.0, 1.0));
    assert_eq!(
        events.try_recv().expect("document event"),
        ViewModelEvent::DocumentChanged { document: id }
    );
    assert!(events.try_recv().is_err(), "no-op move must not notify");

    let gate = source.gate("https://img.test/target.png");
    vm.set_background_url(Some(url("https://img.test/target.png")));
    gate.send(png_bytes(1, 2)).expect("fetch waiting");
    vm.settle_background().await;

    assert_eq!(
        events.try_recv().expect("document event"),
        ViewModelEvent::DocumentChanged { document: id }
    );
    assert_eq!(
        events.try_recv().expect("image event"),
        ViewModelEvent::BackgroundImageChanged {
            document: id,
            available: true
        }
    );
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #[test]
    fn prop_added_emoji_are_counted_and_unique(
        adds in prop::collection::vec(
            ("[😀-😏]", -500.0f64..500.0, -500.0f64..500.0, 1.0f64..200.0),
            0..40,
        )
    ) {
        let store = Arc::new(MemoryStore::new());
        let source = Arc::new(GatedSource::default());
        let mut vm = open_with(DocumentId::new(), &store, &source);

        for (text, x, y, size) in &adds {
            vm.add_emoji(text, Point::new(*x, *y), *size);
        }

        prop_assert_eq!(vm.emojis().len(), adds.len());
        let unique: std::collections::HashSet<_> = vm.emojis().iter().map(|e| e.id).collect();
        prop_assert_eq!(unique.len(), adds.len());
        prop_assert_eq!(store.write_count(), adds.len() as u64);
    }

    #[test]
    fn prop_unknown_ids_never_change_the_document(
        moves in prop::collection::vec((-100.0f64..100.0, -100.0f64..100.0, 0.1f64..4.0), 1..20)
    ) {
        let store = Arc::new(MemoryStore::new());
        let source = Arc::new(GatedSource::default());
        let mut vm = open_with(DocumentId::new(), &store, &source);
        vm.add_emoji("🧱", Point::new(5.0, 5.0), 10.0);
        let before = vm.emojis().to_vec();

        for (dx, dy, factor) in moves {
            vm.move_emoji(EmojiId::new(), Offset::new(dx, dy));
            vm.scale_emoji(EmojiId::new(), factor);
        }

        prop_assert_eq!(vm.emojis(), before.as_slice());
        prop_assert_eq!(store.write_count(), 1);
    }
}
