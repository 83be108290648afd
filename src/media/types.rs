use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Image,
    Audio,
    Video,
    Document,
}

impl MediaType {
    /// Classify by top-level MIME type; anything unrecognized is a document.
    #[must_use]
    pub fn from_mime(content_type: &str) -> Self {
        let Ok(parsed) = content_type.trim().parse::<mime::Mime>() else {
            return Self::Document;
        };
        match parsed.type_() {
            mime::IMAGE => Self::Image,
            mime::AUDIO => Self::Audio,
            mime::VIDEO => Self::Video,
            _ => Self::Document,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScratchConfig {
    /// Defaults to `<workspace>/scratch`
    #[serde(default)]
    pub dir: Option<String>,
    /// Files older than this are swept (default: 2 hours)
    #[serde(default = "default_max_age_secs")]
    pub max_age_secs: u64,
    /// Sweep period (default: 1 hour)
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

fn default_max_age_secs() -> u64 {
    2 * 60 * 60
}

fn default_sweep_interval_secs() -> u64 {
    60 * 60
}

impl Default for ScratchConfig {
    fn default() -> Self {
        Self {
            dir: None,
            max_age_secs: default_max_age_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}
