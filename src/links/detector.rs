use regex::Regex;
use std::sync::LazyLock;

/// Links start with an http(s) scheme or a bare `www.` host and run to the
/// next whitespace or angle bracket.
static LINK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:https?://|www\.)[^\s<>]+").expect("link pattern is valid")
});

/// Return the first link found in `text`, if any.
///
/// Later links in the same text are ignored.
pub fn first_link(text: &str) -> Option<&str> {
    LINK_PATTERN
        .find_iter(text)
        .map(|m| strip_trailing_punctuation(m.as_str()))
        .find(|candidate| !candidate.is_empty())
}

fn strip_trailing_punctuation(s: &str) -> &str {
    let mut end = s.len();
    let bytes = s.as_bytes();

    while end > 0 {
        let ch = bytes[end - 1];
        if ch == b'.' || ch == b',' || ch == b';' || ch == b'!' || ch == b'?' || ch == b')' {
            end -= 1;
        } else {
            break;
        }
    }

    &s[..end]
}
