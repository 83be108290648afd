/// Ensure a detected link carries an http(s) scheme.
///
/// Scheme-less input gets `https://`; an existing scheme is lowercased and the
/// rest of the string is left untouched.
pub fn normalize_link(raw: &str) -> String {
    for scheme in ["https://", "http://"] {
        if let Some(prefix) = raw.get(..scheme.len())
            && prefix.eq_ignore_ascii_case(scheme)
        {
            return format!("{scheme}{}", &raw[scheme.len()..]);
        }
    }
    format!("https://{raw}")
}
