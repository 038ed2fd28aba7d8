//! Instagram hashtag collector.
//!
//! Loads up to three query-derived hashtag explore pages, follows post links,
//! and takes the first CDN image of each post together with its Open Graph
//! title and description.

use std::sync::Arc;

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use viralimg_core::{generate_hashtags, CandidateImage, Category};

use crate::collector::{split_quota, SourceCollector};
use crate::fetcher::PageFetcher;
use crate::html;

const BASE_URL: &str = "https://www.instagram.com";
const MAX_HASHTAGS: usize = 3;

pub struct InstagramCollector {
    fetcher: Arc<dyn PageFetcher>,
    base_url: String,
}

impl InstagramCollector {
    #[must_use]
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            fetcher,
            base_url: BASE_URL.to_string(),
        }
    }

    /// Point the collector at a different host (used by tests).
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    async fn collect_hashtag(
        &self,
        hashtag: &str,
        limit: usize,
        next_ordinal: usize,
    ) -> Vec<CandidateImage> {
        let tag = hashtag.trim_start_matches('#');
        let url = format!(
            "{}/explore/tags/{}/",
            self.base_url,
            utf8_percent_encode(tag, NON_ALPHANUMERIC)
        );

        let page = match self.fetcher.fetch(&url).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(
                    source = "instagram",
                    hashtag,
                    error = %e,
                    "hashtag page fetch failed"
                );
                return Vec::new();
            }
        };

        let mut candidates = Vec::new();
        for post_url in html::find_links(&self.base_url, &page, "/p/") {
            if candidates.len() >= limit {
                break;
            }
            let ordinal = next_ordinal + candidates.len();
            if let Some(candidate) = self.collect_post(&post_url, ordinal).await {
                candidates.push(candidate);
            }
        }
        candidates
    }

    async fn collect_post(&self, post_url: &str, ordinal: usize) -> Option<CandidateImage> {
        let page = match self.fetcher.fetch(post_url).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(
                    source = "instagram",
                    url = %post_url,
                    error = %e,
                    "post fetch failed"
                );
                return None;
            }
        };

        let image_url = html::find_image_sources(post_url, &page, |src| src.contains("scontent"))
            .into_iter()
            .next()?;

        let mut candidate = CandidateImage::new(Category::Instagram, post_url, &image_url);
        candidate.title = html::meta_content(&page, "og:title")
            .unwrap_or_else(|| format!("Instagram Post {ordinal}"));
        candidate.description = html::meta_content(&page, "og:description").unwrap_or_default();
        candidate.author = Some(format!("@user_{ordinal}"));
        Some(candidate)
    }
}

#[async_trait]
impl SourceCollector for InstagramCollector {
    fn category(&self) -> Category {
        Category::Instagram
    }

    async fn collect(&self, query: &str, requested_count: usize) -> Vec<CandidateImage> {
        if requested_count == 0 {
            return Vec::new();
        }

        let hashtags: Vec<String> = generate_hashtags(query)
            .into_iter()
            .take(MAX_HASHTAGS)
            .collect();
        if hashtags.is_empty() {
            tracing::debug!(source = "instagram", query, "no hashtags derivable from query");
            return Vec::new();
        }
        let per_hashtag = split_quota(requested_count, hashtags.len());

        let mut candidates = Vec::new();
        for hashtag in &hashtags {
            let remaining = requested_count - candidates.len();
            let batch = self
                .collect_hashtag(hashtag, per_hashtag.min(remaining), candidates.len())
                .await;
            tracing::debug!(
                source = "instagram",
                hashtag = %hashtag,
                count = batch.len(),
                "collected hashtag candidates"
            );
            candidates.extend(batch);
            if candidates.len() >= requested_count {
                break;
            }
        }

        candidates.truncate(requested_count);
        candidates
    }
}
