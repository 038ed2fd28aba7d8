//! Query-derived search terms and hashtag handling.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Maximum number of hashtags kept per record or generated per query.
pub const MAX_HASHTAGS: usize = 10;

const MAX_SEARCH_TERMS: usize = 5;

static HASHTAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#\w+").expect("valid hashtag regex"));
static YOUTUBE_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:v=|/)([0-9A-Za-z_-]{11})").expect("valid youtube id regex"));

/// Themed hashtags appended when the query mentions one of the trigger words.
const BOOSTERS: &[(&[&str], &[&str])] = &[
    (
        &["brasil", "brazil"],
        &["#brasil", "#mercadobrasileiro", "#inovacaobrasil"],
    ),
    (
        &["tecnologia", "tech"],
        &["#tecnologia", "#inovacao", "#startup", "#tech"],
    ),
    (&["saas"], &["#saas", "#software", "#cloud", "#b2b"]),
];

/// Extract `#tag` tokens from free text.
///
/// Duplicates are dropped, first-seen order is kept, and at most
/// [`MAX_HASHTAGS`] are returned.
#[must_use]
pub fn extract_hashtags(text: &str) -> Vec<String> {
    dedup_capped(HASHTAG_RE.find_iter(text).map(|m| m.as_str().to_string()))
}

/// Generate hashtags for a query: one per word longer than three characters,
/// followed by themed boosters for recognized topics.
#[must_use]
pub fn generate_hashtags(query: &str) -> Vec<String> {
    let lowered = query.to_lowercase();

    let words = lowered
        .split_whitespace()
        .filter(|w| w.chars().count() > 3)
        .map(|w| format!("#{w}"));

    let boosters = BOOSTERS
        .iter()
        .filter(|(triggers, _)| triggers.iter().any(|t| lowered.contains(t)))
        .flat_map(|(_, tags)| tags.iter().map(|t| (*t).to_string()));

    dedup_capped(words.chain(boosters))
}

/// Generate page-search terms: the full query, then every ordered pair of
/// query words.
#[must_use]
pub fn generate_search_terms(query: &str) -> Vec<String> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let words: Vec<&str> = trimmed.split_whitespace().collect();
    let mut terms = vec![trimmed.to_string()];
    for (i, first) in words.iter().enumerate() {
        for second in &words[i + 1..] {
            terms.push(format!("{first} {second}"));
        }
    }
    terms.truncate(MAX_SEARCH_TERMS);
    terms
}

/// Pull the 11-character video id out of a `YouTube` watch, embed, or short URL.
#[must_use]
pub fn extract_youtube_id(url: &str) -> Option<String> {
    YOUTUBE_ID_RE
        .captures(url)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
}

fn dedup_capped(tags: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.filter(|t| seen.insert(t.clone()))
        .take(MAX_HASHTAGS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_hashtags_in_order() {
        assert_eq!(
            extract_hashtags("Confira #promo #Brasil2024 agora!"),
            vec!["#promo", "#Brasil2024"]
        );
    }

    #[test]
    fn extract_drops_duplicates_keeping_first() {
        assert_eq!(
            extract_hashtags("#a #b #a #c #b"),
            vec!["#a", "#b", "#c"]
        );
    }

    #[test]
    fn extract_caps_at_ten() {
        let text = (0..15).map(|i| format!("#t{i}")).collect::<Vec<_>>().join(" ");
        let tags = extract_hashtags(&text);
        assert_eq!(tags.len(), MAX_HASHTAGS);
        assert_eq!(tags[0], "#t0");
        assert_eq!(tags[9], "#t9");
    }

    #[test]
    fn extract_handles_accented_words() {
        assert_eq!(extract_hashtags("vamos #inovação já"), vec!["#inovação"]);
    }

    #[test]
    fn extract_returns_empty_without_tags() {
        assert!(extract_hashtags("no tags here").is_empty());
    }

    #[test]
    fn generates_hashtags_for_long_words_only() {
        assert_eq!(
            generate_hashtags("Café de Minas"),
            vec!["#café", "#minas"]
        );
    }

    #[test]
    fn generates_booster_hashtags() {
        let tags = generate_hashtags("saas brasil");
        assert_eq!(tags[0], "#saas");
        assert_eq!(tags[1], "#brasil");
        assert!(tags.contains(&"#mercadobrasileiro".to_string()));
        assert!(tags.contains(&"#software".to_string()));
        // "#saas" and "#brasil" appear once even though boosters repeat them.
        assert_eq!(tags.iter().filter(|t| *t == "#saas").count(), 1);
        assert_eq!(tags.iter().filter(|t| *t == "#brasil").count(), 1);
    }

    #[test]
    fn generated_hashtags_are_capped() {
        let tags = generate_hashtags("tecnologia saas brasil marketing digital vendas");
        assert_eq!(tags.len(), MAX_HASHTAGS);
    }

    #[test]
    fn search_terms_start_with_full_query() {
        let terms = generate_search_terms("marketing digital vendas");
        assert_eq!(
            terms,
            vec![
                "marketing digital vendas",
                "marketing digital",
                "marketing vendas",
                "digital vendas",
            ]
        );
    }

    #[test]
    fn search_terms_are_capped_at_five() {
        let terms = generate_search_terms("a b c d e");
        assert_eq!(terms.len(), 5);
        assert_eq!(terms[0], "a b c d e");
        assert_eq!(terms[1], "a b");
    }

    #[test]
    fn search_terms_empty_query() {
        assert!(generate_search_terms("   ").is_empty());
    }

    #[test]
    fn youtube_id_from_watch_url() {
        assert_eq!(
            extract_youtube_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=1"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn youtube_id_from_embed_and_short_urls() {
        assert_eq!(
            extract_youtube_id("https://www.youtube.com/embed/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_youtube_id("https://youtu.be/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn youtube_id_missing() {
        assert_eq!(extract_youtube_id("https://example.com/"), None);
    }
}
