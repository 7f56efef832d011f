//! # Emoji Art Core
//!
//! Document model for the Emoji Art editor.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                  art-core                   │
//! ├─────────────────────────────────────────────┤
//! │  Document        │  Persistence             │
//! │  - Placed emoji  │  - Preference stores     │
//! │  - Background    │  - Autosave sink         │
//! │  - JSON codec    │  - Load-or-empty         │
//! ├─────────────────────────────────────────────┤
//! │  Geometry: points, offsets, zoom/pan state  │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod autosave;
pub mod document;
pub mod emoji;
pub mod error;
pub mod geometry;
pub mod store;

pub use autosave::{load_document, saved_document_ids, AutosaveSink, DocumentObserver};
pub use document::{Document, DocumentId};
pub use emoji::{round_half_even, Emoji, EmojiId};
pub use error::{DocumentError, DocumentResult};
pub use geometry::{Offset, Point, ViewState};
pub use store::{FileStore, MemoryStore, PreferenceStore, StoreError};
