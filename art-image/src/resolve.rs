//! Canonical image URL resolution.

use url::Url;

/// Query parameter that carries the real image location on search result pages.
const IMAGE_URL_PARAM: &str = "imgurl";

/// Map a dropped URL to the URL of the image it refers to.
///
/// Image search result pages carry the actual image in an `imgurl` query
/// parameter; when present and valid, that URL is returned. Anything else is
/// returned unchanged.
#[must_use]
pub fn image_url(url: &Url) -> Url {
    url.query_pairs()
        .find(|(name, _)| name == IMAGE_URL_PARAM)
        .and_then(|(_, value)| Url::parse(&value).ok())
        .unwrap_or_else(|| url.clone())
}
