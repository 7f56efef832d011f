//! Command execution for the `emoji-art` binary.

use std::fmt;
use std::sync::Arc;

use anyhow::Context;
use art_core::{saved_document_ids, DocumentId, Emoji, FileStore, Offset, Point, PreferenceStore};
use art_image::{HttpSource, ImageFetcher};
use url::Url;

use crate::view_model::{BackgroundState, DocumentViewModel};
use crate::{AppConfig, Command};

/// What a command leaves behind, for printing.
#[derive(Debug, Clone, PartialEq)]
pub enum Summary {
    /// State of the edited document after the command.
    Document {
        /// Document identity.
        id: DocumentId,
        /// Background reference.
        background_url: Option<Url>,
        /// Background fetch outcome.
        background: BackgroundState,
        /// Decoded background dimensions, if any.
        background_size: Option<(u32, u32)>,
        /// Placed emoji.
        emojis: Vec<Emoji>,
    },
    /// Saved document identities.
    Documents(Vec<DocumentId>),
}

impl Summary {
    fn of(view_model: &DocumentViewModel) -> Self {
        let document = view_model.document();
        Self::Document {
            id: document.id(),
            background_url: document.background_url().cloned(),
            background: view_model.background_state(),
            background_size: view_model.background_image().map(|image| image.dimensions()),
            emojis: document.emojis().to_vec(),
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Document {
                id,
                background_url,
                background,
                background_size,
                emojis,
            } => {
                writeln!(f, "document {id}")?;
                match (background_url, background_size) {
                    (Some(url), Some((w, h))) => writeln!(f, "background {url} ({w}x{h})")?,
                    (Some(url), None) => writeln!(f, "background {url} ({background:?})")?,
                    (None, _) => writeln!(f, "background none")?,
                }
                for emoji in emojis {
                    writeln!(
                        f,
                        "  {} {} at ({}, {}) size {}",
                        emoji.id, emoji.text, emoji.x, emoji.y, emoji.size
                    )?;
                }
                Ok(())
            }
            Self::Documents(ids) => {
                for id in ids {
                    writeln!(f, "{id}")?;
                }
                Ok(())
            }
        }
    }
}

/// Run one command against the configured data directory.
///
/// Edits are autosaved as they happen; any background fetch is awaited before
/// the summary is taken.
///
/// # Errors
///
/// Returns an error if the data directory or HTTP client cannot be set up.
pub async fn run(config: &AppConfig, command: &Command) -> anyhow::Result<Summary> {
    let store = FileStore::new(&config.data_dir).with_context(|| {
        format!(
            "failed to open data directory {}",
            config.data_dir.display()
        )
    })?;

    if matches!(command, Command::List) {
        return Ok(Summary::Documents(saved_document_ids(&store)?));
    }

    let source = HttpSource::new(&config.fetch).context("failed to build HTTP client")?;
    let fetcher = ImageFetcher::new(Arc::new(source)).with_timeout(config.fetch.timeout);
    let store: Arc<dyn PreferenceStore> = Arc::new(store);
    let mut view_model = match config.document {
        Some(id) => DocumentViewModel::open(id, store, fetcher),
        None => DocumentViewModel::create(store, fetcher),
    };

    apply(&mut view_model, command);
    view_model.settle_background().await;
    Ok(Summary::of(&view_model))
}

/// Apply one editing intent.
pub fn apply(view_model: &mut DocumentViewModel, command: &Command) {
    match command {
        Command::Show | Command::List => {}
        Command::Add { text, x, y, size } => {
            let id = view_model.add_emoji(text, Point::new(*x, *y), *size);
            tracing::info!(%id, "Added emoji");
        }
        Command::Move { emoji, dx, dy } => {
            view_model.move_emoji(*emoji, Offset::new(*dx, *dy));
        }
        Command::Scale { emoji, factor } => {
            view_model.scale_emoji(*emoji, *factor);
        }
        Command::Background { url } => {
            view_model.set_background_url(url.clone());
        }
    }
}
