/// Split `text` into pieces of at most `max_chars` characters.
///
/// Cuts at the last newline inside the window when there is one, otherwise at
/// the last space, otherwise mid-word. Concatenating the pieces yields the
/// original text.
pub fn chunk_message(text: &str, max_chars: usize) -> Vec<String> {
    if max_chars == 0 || text.is_empty() {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        let Some((window_end, _)) = rest.char_indices().nth(max_chars) else {
            chunks.push(rest.to_string());
            break;
        };

        let window = &rest[..window_end];
        let cut = window
            .rfind('\n')
            .or_else(|| window.rfind(' '))
            .map_or(window_end, |pos| pos + 1);

        chunks.push(rest[..cut].to_string());
        rest = &rest[cut..];
    }

    chunks
}
