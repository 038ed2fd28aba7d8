//! Regex-based extraction of links, images, and meta tags from page markup.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static ANCHOR_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<a\b[^>]*>").expect("valid anchor regex"));
static IMG_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<img\b[^>]*>").expect("valid regex"));
static META_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<meta\b[^>]*>").expect("valid regex"));

/// Absolute `href`s of anchors whose link contains `marker`, deduplicated in
/// document order.
pub(crate) fn find_links(base_url: &str, html: &str, marker: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    ANCHOR_TAG_RE
        .find_iter(html)
        .filter_map(|m| extract_attr(m.as_str(), "href"))
        .filter(|href| href.contains(marker))
        .filter_map(|href| absolutize_url(base_url, &href))
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

/// Absolute `src`s of `<img>` tags accepted by `keep`, deduplicated in
/// document order.
pub(crate) fn find_image_sources<F>(base_url: &str, html: &str, keep: F) -> Vec<String>
where
    F: Fn(&str) -> bool,
{
    let mut seen = HashSet::new();
    IMG_TAG_RE
        .find_iter(html)
        .filter_map(|m| extract_attr(m.as_str(), "src"))
        .filter_map(|src| absolutize_url(base_url, &src))
        .filter(|url| keep(url))
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

/// `content` of the first `<meta property="...">` (or `name="..."`) tag
/// matching `key`.
pub(crate) fn meta_content(html: &str, key: &str) -> Option<String> {
    META_TAG_RE.find_iter(html).find_map(|m| {
        let tag = m.as_str();
        let name = extract_attr(tag, "property").or_else(|| extract_attr(tag, "name"))?;
        if name.eq_ignore_ascii_case(key) {
            extract_attr(tag, "content").map(|c| decode_entities(&c))
        } else {
            None
        }
    })
}

fn extract_attr(tag: &str, attr: &str) -> Option<String> {
    let pattern = format!(
        r#"(?is)(?:^|\s){}\s*=\s*(?:"([^"]*)"|'([^']*)')"#,
        regex::escape(attr)
    );
    let re = Regex::new(&pattern).expect("valid attr regex");
    re.captures(tag)
        .and_then(|c| c.get(1).or_else(|| c.get(2)))
        .map(|m| m.as_str().trim().to_string())
        .filter(|v| !v.is_empty())
}

fn absolutize_url(base_url: &str, candidate: &str) -> Option<String> {
    let candidate = decode_entities(candidate);
    let base = reqwest::Url::parse(base_url).ok()?;
    let joined = base.join(&candidate).ok()?;
    matches!(joined.scheme(), "http" | "https").then(|| joined.to_string())
}

fn decode_entities(raw: &str) -> String {
    raw.replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
}
