//! The document: an ordered list of placed emoji over an optional background.

use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::{DocumentResult, Emoji, EmojiId};

/// Prefix of the preference key a document is saved under.
pub const STORAGE_KEY_PREFIX: &str = "Document.";

/// Stable identity of a document, assigned once at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(Uuid);

impl DocumentId {
    /// Create a new unique document ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// The preference key this document is persisted under.
    ///
    /// Uses the hyphenated upper-case form, e.g.
    /// `Document.67E55044-10B1-426F-9247-BB680E5FE0C8`.
    #[must_use]
    pub fn storage_key(&self) -> String {
        format!("{STORAGE_KEY_PREFIX}{:X}", self.0)
    }

    /// Recover a document ID from a preference key.
    ///
    /// Returns `None` for keys that don't belong to a document.
    #[must_use]
    pub fn from_storage_key(key: &str) -> Option<Self> {
        key.strip_prefix(STORAGE_KEY_PREFIX)
            .and_then(|rest| Uuid::parse_str(rest).ok())
            .map(Self)
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for DocumentId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// A document containing placed emoji and a background reference.
///
/// The identity travels in the storage key, not in the serialized body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(skip)]
    id: DocumentId,
    /// Placed emoji, in insertion order.
    #[serde(default)]
    emojis: Vec<Emoji>,
    /// URL of the background image.
    #[serde(default)]
    background_url: Option<Url>,
}

impl Document {
    /// Create a new empty document with the given identity.
    #[must_use]
    pub fn new(id: DocumentId) -> Self {
        Self {
            id,
            emojis: Vec::new(),
            background_url: None,
        }
    }

    /// The document identity.
    #[must_use]
    pub fn id(&self) -> DocumentId {
        self.id
    }

    /// Placed emoji, in insertion order.
    #[must_use]
    pub fn emojis(&self) -> &[Emoji] {
        &self.emojis
    }

    /// Append a new emoji with a fresh identity.
    pub fn add_emoji(&mut self, text: impl Into<String>, x: i32, y: i32, size: i32) -> EmojiId {
        let emoji = Emoji::new(text, x, y, size);
        let id = emoji.id;
        self.emojis.push(emoji);
        id
    }

    /// Get an emoji by ID.
    #[must_use]
    pub fn emoji(&self, id: EmojiId) -> Option<&Emoji> {
        self.emojis.iter().find(|e| e.id == id)
    }

    /// Get a mutable reference to an emoji by ID.
    pub fn emoji_mut(&mut self, id: EmojiId) -> Option<&mut Emoji> {
        self.emojis.iter_mut().find(|e| e.id == id)
    }

    /// Current background URL.
    #[must_use]
    pub fn background_url(&self) -> Option<&Url> {
        self.background_url.as_ref()
    }

    /// Replace the background URL.
    pub fn set_background_url(&mut self, url: Option<Url>) {
        self.background_url = url;
    }

    /// Get the number of emoji in the document.
    #[must_use]
    pub fn emoji_count(&self) -> usize {
        self.emojis.len()
    }

    /// Check if the document has no emoji.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.emojis.is_empty()
    }

    /// Serialize the document to JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_bytes(&self) -> DocumentResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Deserialize a document from JSON bytes, attaching the given identity.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a valid document.
    pub fn from_json_bytes(id: DocumentId, bytes: &[u8]) -> DocumentResult<Self> {
        let mut document: Self = serde_json::from_slice(bytes)?;
        document.id = id;
        Ok(document)
    }
}
