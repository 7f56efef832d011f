//! The document view-model.
//!
//! [`DocumentViewModel`] owns one [`Document`] and the transient view state
//! (zoom, pan), exposes the editing intents, and drives the two side effects
//! of a change: autosave through the registered [`DocumentObserver`]s, and
//! background image fetching through an [`ImageFetcher`].
//!
//! All state lives on the owner's context. The fetch task only produces a
//! completion message; the owner applies it with
//! [`DocumentViewModel::poll_background`] or
//! [`DocumentViewModel::settle_background`].

use std::sync::Arc;

use art_core::emoji::truncate;
use art_core::{
    load_document, AutosaveSink, Document, DocumentId, DocumentObserver, Emoji, EmojiId, Offset,
    Point, PreferenceStore, ViewState,
};
use art_image::{image_url, BackgroundImage, FetchCompletion, ImageFetcher};
use tokio::sync::broadcast;
use url::Url;

use crate::event::ViewModelEvent;

/// Capacity of the change notification channel.
const EVENT_CAPACITY: usize = 64;

/// Where the background image fetch stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundState {
    /// No background reference.
    Idle,
    /// A fetch for the current reference is in flight.
    Fetching,
    /// The current reference was fetched and decoded.
    Ready,
    /// The current reference could not be fetched or decoded.
    Failed,
}

/// View-model binding one persisted document to the UI.
///
/// Two view-models are equal when they edit the same document.
pub struct DocumentViewModel {
    document: Document,
    background_image: Option<BackgroundImage>,
    background_state: BackgroundState,
    view: ViewState,
    fetcher: ImageFetcher,
    observers: Vec<Box<dyn DocumentObserver>>,
    events: broadcast::Sender<ViewModelEvent>,
}

impl DocumentViewModel {
    /// Open the document `id`, loading whatever was saved for it in `store`.
    ///
    /// Falls back to an empty document when nothing (or nothing readable) is
    /// saved. Every later change is autosaved to `store`. If the loaded
    /// document has a background, its fetch starts immediately on the
    /// fetcher's runtime.
    #[must_use]
    pub fn open(id: DocumentId, store: Arc<dyn PreferenceStore>, fetcher: ImageFetcher) -> Self {
        let document = load_document(id, store.as_ref());
        tracing::info!(
            document = %id,
            emojis = document.emoji_count(),
            "Opened document"
        );
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        let mut view_model = Self {
            document,
            background_image: None,
            background_state: BackgroundState::Idle,
            view: ViewState::default(),
            fetcher,
            observers: vec![Box::new(AutosaveSink::new(id, store))],
            events,
        };
        if view_model.document.background_url().is_some() {
            view_model.fetch_background();
        }
        view_model
    }

    /// Open a brand new document with a fresh identity.
    #[must_use]
    pub fn create(store: Arc<dyn PreferenceStore>, fetcher: ImageFetcher) -> Self {
        Self::open(DocumentId::new(), store, fetcher)
    }

    /// The document identity.
    #[must_use]
    pub fn id(&self) -> DocumentId {
        self.document.id()
    }

    /// The document being edited.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Placed emoji, in insertion order.
    #[must_use]
    pub fn emojis(&self) -> &[Emoji] {
        self.document.emojis()
    }

    /// Look up a placed emoji.
    #[must_use]
    pub fn emoji(&self, id: EmojiId) -> Option<&Emoji> {
        self.document.emoji(id)
    }

    /// Subscribe to change notifications.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ViewModelEvent> {
        self.events.subscribe()
    }

    /// Register another observer of document changes.
    ///
    /// Observers run after the autosave sink, in registration order.
    pub fn add_observer(&mut self, observer: impl DocumentObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    // -----------------------------------------------------------------------
    // Intents
    // -----------------------------------------------------------------------

    /// Place a new emoji. Position and size are truncated to integers.
    pub fn add_emoji(&mut self, text: &str, location: Point, size: f64) -> EmojiId {
        let id = self.document.add_emoji(
            text,
            truncate(location.x),
            truncate(location.y),
            truncate(size),
        );
        self.publish_document();
        id
    }

    /// Move an emoji by `offset`. Unknown emoji are ignored.
    pub fn move_emoji(&mut self, emoji: EmojiId, offset: Offset) {
        let Some(target) = self.document.emoji_mut(emoji) else {
            tracing::debug!(%emoji, "Ignoring move of unknown emoji");
            return;
        };
        target.translate(offset);
        self.publish_document();
    }

    /// Scale an emoji's size by `factor`, rounding half to even. Unknown emoji
    /// are ignored.
    pub fn scale_emoji(&mut self, emoji: EmojiId, factor: f64) {
        let Some(target) = self.document.emoji_mut(emoji) else {
            tracing::debug!(%emoji, "Ignoring scale of unknown emoji");
            return;
        };
        target.scale(factor);
        self.publish_document();
    }

    /// The background reference.
    #[must_use]
    pub fn background_url(&self) -> Option<&Url> {
        self.document.background_url()
    }

    /// Replace the background reference and restart the image fetch.
    ///
    /// The URL is resolved to its image URL first. The displayed image is
    /// cleared before this returns; any in-flight fetch is discarded. Requires
    /// a Tokio runtime when `url` is `Some`.
    pub fn set_background_url(&mut self, url: Option<Url>) {
        self.document
            .set_background_url(url.as_ref().map(image_url));
        self.publish_document();
        self.fetch_background();
    }

    // -----------------------------------------------------------------------
    // Background image
    // -----------------------------------------------------------------------

    /// The decoded background image, if one is available.
    #[must_use]
    pub fn background_image(&self) -> Option<&BackgroundImage> {
        self.background_image.as_ref()
    }

    /// Where the background fetch stands.
    #[must_use]
    pub fn background_state(&self) -> BackgroundState {
        self.background_state
    }

    /// Apply a finished background fetch, if one has arrived.
    ///
    /// Never waits. Returns `true` when a result was applied.
    pub fn poll_background(&mut self) -> bool {
        match self.fetcher.try_complete() {
            Some(completion) => {
                self.apply_completion(completion);
                true
            }
            None => false,
        }
    }

    /// Wait for the current background fetch to finish and apply it.
    ///
    /// Returns immediately when nothing is being fetched.
    pub async fn settle_background(&mut self) -> BackgroundState {
        if let Some(completion) = self.fetcher.next_completion().await {
            self.apply_completion(completion);
        }
        self.background_state
    }

    fn fetch_background(&mut self) {
        let had_image = self.background_image.take().is_some();
        match self.document.background_url().cloned() {
            Some(url) => {
                self.fetcher.start(url);
                self.background_state = BackgroundState::Fetching;
            }
            None => {
                self.fetcher.cancel();
                self.background_state = BackgroundState::Idle;
            }
        }
        if had_image {
            self.notify(ViewModelEvent::BackgroundImageChanged {
                document: self.id(),
                available: false,
            });
        }
    }

    fn apply_completion(&mut self, completion: FetchCompletion) {
        let available = completion.image.is_some();
        tracing::info!(
            document = %self.id(),
            url = %completion.url,
            available,
            "Background fetch finished"
        );
        self.background_image = completion.image;
        self.background_state = if available {
            BackgroundState::Ready
        } else {
            BackgroundState::Failed
        };
        self.notify(ViewModelEvent::BackgroundImageChanged {
            document: self.id(),
            available,
        });
    }

    // -----------------------------------------------------------------------
    // View state
    // -----------------------------------------------------------------------

    /// Current zoom scale.
    #[must_use]
    pub fn zoom_scale(&self) -> f64 {
        self.view.zoom_scale()
    }

    /// Set the zoom scale. Non-finite or non-positive scales are ignored.
    pub fn set_zoom_scale(&mut self, scale: f64) {
        if self.view.set_zoom_scale(scale) {
            self.notify(ViewModelEvent::ViewStateChanged {
                document: self.id(),
            });
        }
    }

    /// Current pan offset.
    #[must_use]
    pub fn pan_offset(&self) -> Offset {
        self.view.pan_offset
    }

    /// Set the pan offset.
    pub fn set_pan_offset(&mut self, offset: Offset) {
        self.view.pan_offset = offset;
        self.notify(ViewModelEvent::ViewStateChanged {
            document: self.id(),
        });
    }

    fn publish_document(&self) {
        for observer in &self.observers {
            observer.document_changed(&self.document);
        }
        self.notify(ViewModelEvent::DocumentChanged {
            document: self.id(),
        });
    }

    fn notify(&self, event: ViewModelEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

impl PartialEq for DocumentViewModel {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for DocumentViewModel {}

impl std::hash::Hash for DocumentViewModel {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl std::fmt::Debug for DocumentViewModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentViewModel")
            .field("id", &self.id())
            .field("emojis", &self.document.emoji_count())
            .field("background_url", &self.document.background_url())
            .field("background_state", &self.background_state)
            .field("view", &self.view)
            .finish_non_exhaustive()
    }
}
