//! # Emoji Art Image
//!
//! Background image fetching for the Emoji Art editor.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ resolve URL  │──▶│ ByteSource   │──▶│ decode_image │──▶│ completion   │
//! │ (imgurl=...) │   │ (HTTP/data:) │   │ (image crate)│   │ (generation) │
//! └──────────────┘   └──────────────┘   └──────────────┘   └──────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod decode;
pub mod error;
pub mod fetcher;
pub mod resolve;
pub mod source;

pub use decode::{decode_image, BackgroundImage, ImageFormat};
pub use error::{FetchError, ImageError, ImageResult};
pub use fetcher::{FetchCompletion, ImageFetcher};
pub use resolve::image_url;
pub use source::{ByteSource, FetchConfig, HttpSource};
