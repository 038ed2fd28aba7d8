//! Heuristic filter for image URLs scraped from search result pages.

const REJECT_MARKERS: &[&str] = &[
    "data:image",
    "base64",
    "svg",
    "icon",
    "logo",
    "avatar",
    "profile",
];

const ACCEPT_MARKERS: &[&str] = &[
    ".jpg",
    ".jpeg",
    ".png",
    ".webp",
    "scontent",
    "fbcdn",
    "instagram",
    "youtube",
];

/// Returns `true` when `url` looks like content imagery rather than page chrome.
///
/// Rejects short URLs, inline data, vector art, icons, logos, and profile
/// pictures; accepts only URLs with a raster image extension or a known
/// social CDN host.
#[must_use]
pub fn is_valid_image_url(url: &str) -> bool {
    if url.len() < 10 {
        return false;
    }

    let lower = url.to_ascii_lowercase();
    if REJECT_MARKERS.iter().any(|m| lower.contains(m)) {
        return false;
    }

    ACCEPT_MARKERS.iter().any(|m| lower.contains(m))
}
