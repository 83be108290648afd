use crate::media::MediaType;
use url::Url;

/// Used when the link path has no usable last segment.
pub const DEFAULT_FILENAME: &str = "file";

/// How a response body should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Text,
    Media(MediaType),
}

/// Content types mentioning `text` or `json` are relayed as text; the rest
/// are media.
#[must_use]
pub fn classify(content_type: &str) -> ContentKind {
    let lowered = content_type.to_ascii_lowercase();
    if lowered.contains("text") || lowered.contains("json") {
        ContentKind::Text
    } else {
        ContentKind::Media(MediaType::from_mime(content_type))
    }
}

/// Last path segment of the link, without query or fragment.
#[must_use]
pub fn derive_filename(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
        .map_or_else(|| DEFAULT_FILENAME.to_string(), String::from)
}
