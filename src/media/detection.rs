#[must_use]
pub fn detect_mime(data: &[u8]) -> Option<String> {
    infer::get(data).map(|info| info.mime_type().to_string())
}

#[must_use]
pub fn detect_mime_from_extension(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    match ext.to_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg".into()),
        "png" => Some("image/png".into()),
        "gif" => Some("image/gif".into()),
        "webp" => Some("image/webp".into()),
        "mp3" => Some("audio/mpeg".into()),
        "wav" => Some("audio/wav".into()),
        "ogg" => Some("audio/ogg".into()),
        "mp4" => Some("video/mp4".into()),
        "webm" => Some("video/webm".into()),
        "pdf" => Some("application/pdf".into()),
        "json" => Some("application/json".into()),
        "txt" => Some("text/plain".into()),
        _ => None,
    }
}

/// Best guess at a content type for a response that declared none.
///
/// Magic bytes first, then the file extension; a body that is valid UTF-8 is
/// plain text and anything else is an opaque binary.
#[must_use]
pub fn sniff_content_type(data: &[u8], filename: Option<&str>) -> String {
    detect_mime(data)
        .or_else(|| filename.and_then(detect_mime_from_extension))
        .unwrap_or_else(|| {
            if std::str::from_utf8(data).is_ok() {
                "text/plain".into()
            } else {
                mime::APPLICATION_OCTET_STREAM.to_string()
            }
        })
}

/// MIME essence (`type/subtype`) without parameters.
#[must_use]
pub fn essence(content_type: &str) -> String {
    content_type
        .trim()
        .parse::<mime::Mime>()
        .map_or_else(|_| content_type.trim().to_string(), |m| m.essence_str().to_string())
}
