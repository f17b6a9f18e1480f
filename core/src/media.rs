//! Media reference resolution.
//!
//! The backend hands out either presigned absolute URLs or storage keys
//! relative to the API base. Both end up as a single absolute URL here.

/// A record's media asset after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaRef {
    Image(String),
    Video(String),
}

impl MediaRef {
    pub fn url(&self) -> &str {
        match self {
            MediaRef::Image(url) | MediaRef::Video(url) => url,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            MediaRef::Image(_) => "image",
            MediaRef::Video(_) => "video",
        }
    }
}

/// True when `reference` starts with `http://` or `https://` (any case).
pub fn is_absolute(reference: &str) -> bool {
    let lower = reference.get(..8).unwrap_or(reference).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Resolve a media reference against `base_url`.
///
/// Absolute URLs are returned unchanged. Anything else is a storage key and
/// is joined to the base with exactly one `/`. Blank references resolve to
/// nothing.
pub fn resolve_media(base_url: &str, reference: &str) -> Option<String> {
    let reference = reference.trim();
    if reference.is_empty() {
        return None;
    }
    if is_absolute(reference) {
        return Some(reference.to_string());
    }
    let base = base_url.trim_end_matches('/');
    let key = reference.trim_start_matches('/');
    Some(format!("{base}/{key}"))
}
