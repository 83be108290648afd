use std::fmt;

/// Appended to text cut at the character limit.
pub const TRUNCATION_SUFFIX: &str = "\n\n... (truncated)";

const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Byte count rendered with binary units and two decimals, e.g. `1.50 KB`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_size(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.2} {}", UNITS[unit])
}

/// Display wrapper for [`format_size`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HumanSize(pub u64);

impl fmt::Display for HumanSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_size(self.0))
    }
}

/// Keep the first `max_chars` characters, marking the cut.
#[must_use]
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        None => text.to_string(),
        Some((cut, _)) => format!("{}{TRUNCATION_SUFFIX}", &text[..cut]),
    }
}

/// Pretty-print JSON bodies, pass everything else through.
///
/// A body is treated as JSON when the content type says so or it opens with
/// `{`. Bodies that fail to parse are returned unchanged.
#[must_use]
pub fn render_text(body: &str, content_type: &str) -> String {
    let looks_like_json =
        content_type.to_ascii_lowercase().contains("json") || body.starts_with('{');
    if !looks_like_json {
        return body.to_string();
    }

    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| serde_json::to_string_pretty(&value).ok())
        .unwrap_or_else(|| body.to_string())
}
