//! # Emoji Art
//!
//! Document view-model and command-line host for the Emoji Art editor.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p art-app -- --document 67e55044-10b1-426f-9247-bb680e5fe0c8 add 🌵 --x 120 --y 80 --size 64
//! cargo run -p art-app -- --document 67e55044-10b1-426f-9247-bb680e5fe0c8 background https://example.com/desert.png
//! cargo run -p art-app -- list
//! ```
//!
//! ## Architecture
//!
//! - `AppArgs` - Command-line arguments parsed with clap
//! - `AppConfig` - Data directory, document identity, and fetch settings
//! - `DocumentViewModel` - Intents, autosave, and background fetching
//! - `commands` - Runs one intent against a view-model and reports the result

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

pub mod commands;
pub mod event;
pub mod view_model;

pub use commands::{run, Summary};
pub use event::ViewModelEvent;
pub use view_model::{BackgroundState, DocumentViewModel};

use std::path::PathBuf;
use std::time::Duration;

use art_core::{DocumentId, EmojiId};
use art_image::FetchConfig;
use clap::{Parser, Subcommand};
use url::Url;

/// Default directory documents are saved in.
pub const DEFAULT_DATA_DIR: &str = "emoji-art-data";

/// Command-line arguments for emoji-art.
#[derive(Debug, Clone, Parser)]
#[command(name = "emoji-art")]
#[command(about = "Place emoji on a background image; every edit is autosaved")]
#[command(version)]
pub struct AppArgs {
    /// Directory documents are saved in
    #[arg(long, env = "EMOJI_ART_DATA_DIR", default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Document to open (a new one is created when omitted)
    #[arg(long, env = "EMOJI_ART_DOCUMENT")]
    pub document: Option<DocumentId>,

    /// Give up on a background fetch after this many seconds (0 waits forever)
    #[arg(long, env = "EMOJI_ART_FETCH_TIMEOUT", default_value = "30")]
    pub fetch_timeout_secs: u64,

    /// What to do with the document
    #[command(subcommand)]
    pub command: Command,
}

/// Editing intents exposed on the command line.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print the document
    Show,
    /// Place an emoji
    Add {
        /// The glyph to place
        text: String,
        /// X position
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        x: f64,
        /// Y position
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        y: f64,
        /// Font size
        #[arg(long, default_value = "40")]
        size: f64,
    },
    /// Move an emoji
    Move {
        /// Emoji to move
        emoji: EmojiId,
        /// Horizontal offset
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        dx: f64,
        /// Vertical offset
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        dy: f64,
    },
    /// Scale an emoji's size
    Scale {
        /// Emoji to scale
        emoji: EmojiId,
        /// Scale factor
        #[arg(long)]
        factor: f64,
    },
    /// Set the background image URL (omit to clear it)
    Background {
        /// Image or image-search result URL
        url: Option<Url>,
    },
    /// List saved documents
    List,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory documents are saved in.
    pub data_dir: PathBuf,
    /// Document to open, or `None` for a new one.
    pub document: Option<DocumentId>,
    /// Background fetch settings.
    pub fetch: FetchConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AppConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            document: None,
            fetch: FetchConfig::default(),
        }
    }
}

impl From<&AppArgs> for AppConfig {
    fn from(args: &AppArgs) -> Self {
        let timeout = (args.fetch_timeout_secs > 0)
            .then(|| Duration::from_secs(args.fetch_timeout_secs));
        Self {
            data_dir: args.data_dir.clone(),
            document: args.document,
            fetch: FetchConfig {
                timeout,
                ..FetchConfig::default()
            },
        }
    }
}
