//! Change notifications published by the view-model.

use art_core::DocumentId;

/// Something the rendering layer should re-read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewModelEvent {
    /// Emoji or background reference changed (and was autosaved).
    DocumentChanged {
        /// Document that changed.
        document: DocumentId,
    },
    /// The displayed background image was set or cleared.
    BackgroundImageChanged {
        /// Document whose background changed.
        document: DocumentId,
        /// Whether an image is now available.
        available: bool,
    },
    /// Zoom or pan changed.
    ViewStateChanged {
        /// Document whose view changed.
        document: DocumentId,
    },
}
