//! Image fetching error types.

use thiserror::Error;

/// Result type for image decoding.
pub type ImageResult<T> = Result<T, ImageError>;

/// Errors that can occur while decoding an image.
#[derive(Debug, Error)]
pub enum ImageError {
    /// The bytes are not a decodable image.
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}

/// Errors that can occur while fetching image bytes.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP layer failed (connection, TLS, body read).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP status {status} for {url}")]
    Status {
        /// Response status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// A `data:` URI could not be decoded.
    #[error("Invalid data URI: {0}")]
    DataUri(String),

    /// The URL scheme is not supported by this source.
    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    /// The fetch did not finish within the configured timeout.
    #[error("Fetch timed out after {0:?}")]
    Timeout(std::time::Duration),
}
