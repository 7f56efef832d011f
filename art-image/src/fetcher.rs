//! Cancellable background image fetching.
//!
//! [`ImageFetcher`] runs at most one fetch at a time. Starting a new fetch
//! aborts the previous task and bumps a generation counter; completions are
//! tagged with the generation they were started under and the owner drops any
//! completion whose generation is no longer current. Completions are never
//! applied from the fetch task itself, only from the owner's context through
//! [`ImageFetcher::try_complete`] or [`ImageFetcher::next_completion`].
//!
//! Fetch tasks run on the Tokio runtime captured when the fetcher is built, so
//! the owner may live on a thread outside the runtime. Without a runtime every
//! fetch completes at once without an image.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use url::Url;

use crate::decode::{decode_image, BackgroundImage};
use crate::error::FetchError;
use crate::source::ByteSource;

/// Result of one finished fetch.
#[derive(Debug, Clone)]
pub struct FetchCompletion {
    /// Generation the fetch was started under.
    pub generation: u64,
    /// URL that was fetched.
    pub url: Url,
    /// Decoded image, or `None` if fetching or decoding failed.
    pub image: Option<BackgroundImage>,
}

/// Owner-side handle for background image fetches.
pub struct ImageFetcher {
    source: Arc<dyn ByteSource>,
    timeout: Option<Duration>,
    runtime: Option<Handle>,
    generation: u64,
    in_flight: Option<JoinHandle<()>>,
    pending: bool,
    tx: mpsc::UnboundedSender<FetchCompletion>,
    rx: mpsc::UnboundedReceiver<FetchCompletion>,
}

impl ImageFetcher {
    /// Create a fetcher over the given byte source.
    ///
    /// Fetches are spawned on the current Tokio runtime, if there is one. Use
    /// [`ImageFetcher::with_runtime`] when building the fetcher elsewhere.
    #[must_use]
    pub fn new(source: Arc<dyn ByteSource>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            source,
            timeout: None,
            runtime: Handle::try_current().ok(),
            generation: 0,
            in_flight: None,
            pending: false,
            tx,
            rx,
        }
    }

    /// Bound each fetch by `timeout`. A timed-out fetch completes without an image.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Spawn fetches on `runtime`.
    #[must_use]
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Whether a fetch has been started and its result not yet taken.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Start fetching `url`, replacing any in-flight fetch.
    ///
    /// Returns the new generation. With no runtime available the fetch
    /// completes immediately without an image.
    pub fn start(&mut self, url: Url) -> u64 {
        self.abort_in_flight();
        self.generation += 1;
        self.pending = true;

        let generation = self.generation;
        let mut report = CompletionGuard {
            tx: self.tx.clone(),
            generation,
            url,
            image: None,
        };

        let Some(runtime) = self.runtime.as_ref() else {
            tracing::warn!(url = %report.url, "No async runtime for background fetch");
            return generation;
        };

        let source = Arc::clone(&self.source);
        let timeout = self.timeout;
        tracing::debug!(generation, url = %report.url, "Starting background fetch");
        self.in_flight = Some(runtime.spawn(async move {
            report.image = fetch_and_decode(source.as_ref(), &report.url, timeout).await;
        }));
        generation
    }

    /// Cancel any in-flight fetch. Its result will never be delivered.
    pub fn cancel(&mut self) {
        self.abort_in_flight();
        self.generation += 1;
        self.pending = false;
    }

    /// Take the current fetch's completion if it has arrived, without waiting.
    ///
    /// Stale completions from replaced fetches are discarded.
    pub fn try_complete(&mut self) -> Option<FetchCompletion> {
        while let Ok(completion) = self.rx.try_recv() {
            if let Some(current) = self.accept(completion) {
                return Some(current);
            }
        }
        None
    }

    /// Wait for the current fetch's completion.
    ///
    /// Returns `None` immediately when no fetch is pending. Stale completions
    /// from replaced fetches are discarded.
    pub async fn next_completion(&mut self) -> Option<FetchCompletion> {
        while self.pending {
            let completion = self.rx.recv().await?;
            if let Some(current) = self.accept(completion) {
                return Some(current);
            }
        }
        None
    }

    fn accept(&mut self, completion: FetchCompletion) -> Option<FetchCompletion> {
        if completion.generation != self.generation || !self.pending {
            tracing::debug!(
                stale = completion.generation,
                current = self.generation,
                "Discarding stale background fetch"
            );
            return None;
        }
        self.pending = false;
        self.in_flight = None;
        Some(completion)
    }

    fn abort_in_flight(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}

impl Drop for ImageFetcher {
    fn drop(&mut self) {
        self.abort_in_flight();
    }
}

impl std::fmt::Debug for ImageFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageFetcher")
            .field("generation", &self.generation)
            .field("pending", &self.pending)
            .field("timeout", &self.timeout)
            .field("runtime", &self.runtime.is_some())
            .finish_non_exhaustive()
    }
}

/// Sends the completion for one fetch when dropped.
///
/// A task that panics still reports, without an image. Aborted tasks report
/// under a generation the owner has already moved past.
struct CompletionGuard {
    tx: mpsc::UnboundedSender<FetchCompletion>,
    generation: u64,
    url: Url,
    image: Option<BackgroundImage>,
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        if std::thread::panicking() {
            tracing::warn!("Background fetch of {} panicked", self.url);
        }
        // The receiver lives as long as the fetcher; a send error means it was dropped.
        let _ = self.tx.send(FetchCompletion {
            generation: self.generation,
            url: self.url.clone(),
            image: self.image.take(),
        });
    }
}

async fn fetch_and_decode(
    source: &dyn ByteSource,
    url: &Url,
    timeout: Option<Duration>,
) -> Option<BackgroundImage> {
    let bytes = match timeout {
        Some(limit) => tokio::time::timeout(limit, source.fetch(url))
            .await
            .unwrap_or(Err(FetchError::Timeout(limit))),
        None => source.fetch(url).await,
    };
    let bytes = match bytes {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!("Background fetch of {url} failed: {e}");
            return None;
        }
    };
    match decode_image(&bytes) {
        Ok(image) => {
            tracing::debug!(
                width = image.width,
                height = image.height,
                format = %image.format,
                "Decoded background image"
            );
            Some(image)
        }
        Err(e) => {
            tracing::warn!("Background at {url} is not an image: {e}");
            None
        }
    }
}
