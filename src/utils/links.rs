use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::models::VideoRef;

const CANONICAL_PREFIX: &str = "https://www.youtube.com/watch?v=";

/// Find the first YouTube video reference in free-form chat text.
///
/// We support:
/// - short links like `youtu.be/<id>`
/// - `youtube.com/watch?v=<id>`, with `v` anywhere in the query string
/// - `youtube.com/live/<id>`, `youtube.com/shorts/<id>`
/// - `youtube.com/embed/<id>` and the legacy `youtube.com/v/<id>`
///
/// Host matching is case-insensitive and ignores `www.` / `m.` prefixes.
static VIDEO_LINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:youtube\.com/(?:watch\?(?:[^\s#]*?&)?v=|live/|shorts/|embed/|v/)|youtu\.be/)([A-Za-z0-9_-]+)",
    )
    .expect("static regex compile")
});

/// Canonical `watch?v=` URL for the first video reference in `text`, if any.
#[must_use]
pub fn normalize(text: &str) -> Option<String> {
    let caps = VIDEO_LINK_RE.captures(text)?;
    let id = caps.get(1)?.as_str();
    Some(canonical_url(id))
}

/// Pull the id back out of a canonical URL produced by [`normalize`].
#[must_use]
pub fn extract_id(canonical_url: &str) -> Option<&str> {
    let id = canonical_url.strip_prefix(CANONICAL_PREFIX)?;
    if is_valid_id(id) { Some(id) } else { None }
}

#[must_use]
pub fn canonical_url(video_id: &str) -> String {
    format!("{CANONICAL_PREFIX}{video_id}")
}

#[must_use]
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Normalize and split in one step.
#[must_use]
pub fn video_ref(text: &str) -> Option<VideoRef> {
    let canonical = normalize(text)?;
    let video_id = extract_id(&canonical)?.to_string();
    Some(VideoRef {
        video_id,
        canonical_url: canonical,
    })
}
