//! Placed emoji - the stickers that make up a document.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::{Offset, Point};

/// Unique identifier for a placed emoji.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmojiId(Uuid);

impl EmojiId {
    /// Create a new unique emoji ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EmojiId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EmojiId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for EmojiId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// One glyph placed on the document.
///
/// Position and size are plain integers; no bounds are enforced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Emoji {
    /// Unique identifier within the document.
    pub id: EmojiId,
    /// The glyph string, not validated.
    pub text: String,
    /// X position.
    pub x: i32,
    /// Y position.
    pub y: i32,
    /// Font size.
    pub size: i32,
}

impl Emoji {
    /// Create a new emoji with a fresh identity.
    #[must_use]
    pub fn new(text: impl Into<String>, x: i32, y: i32, size: i32) -> Self {
        Self {
            id: EmojiId::new(),
            text: text.into(),
            x,
            y,
            size,
        }
    }

    /// Position as a point.
    #[must_use]
    pub fn location(&self) -> Point {
        Point::new(f64::from(self.x), f64::from(self.y))
    }

    /// Size as a font size.
    #[must_use]
    pub fn font_size(&self) -> f64 {
        f64::from(self.size)
    }

    /// Shift the position by an offset, truncating each component toward zero.
    pub fn translate(&mut self, offset: Offset) {
        self.x = self.x.saturating_add(truncate(offset.width));
        self.y = self.y.saturating_add(truncate(offset.height));
    }

    /// Multiply the size by `factor`, rounding half to even.
    pub fn scale(&mut self, factor: f64) {
        self.size = round_half_even(f64::from(self.size) * factor);
    }
}

/// Convert to an integer coordinate, truncating toward zero.
///
/// NaN maps to 0 and out-of-range values saturate.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn truncate(value: f64) -> i32 {
    value.trunc() as i32
}

/// Round to the nearest integer, ties to even.
///
/// NaN maps to 0 and out-of-range values saturate.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn round_half_even(value: f64) -> i32 {
    value.round_ties_even() as i32
}
