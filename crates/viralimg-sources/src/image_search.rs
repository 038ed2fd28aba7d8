//! Generic web image search collector, used for the fallback categories.
//!
//! `news` scopes the query to a fixed set of news domains and splits its
//! quota evenly across them; `commercial` runs one landing-page/product
//! search.

use std::sync::Arc;

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use viralimg_core::{CandidateImage, Category};

use crate::collector::{split_quota, SourceCollector};
use crate::fetcher::PageFetcher;
use crate::filter::is_valid_image_url;
use crate::html;

const BASE_URL: &str = "https://www.google.com";

pub const NEWS_DOMAINS: [&str; 3] = ["g1.globo.com", "folha.uol.com.br", "estadao.com.br"];

const COMMERCIAL_SUFFIX: &str = "landing page produto";

pub struct ImageSearchCollector {
    category: Category,
    fetcher: Arc<dyn PageFetcher>,
    base_url: String,
    /// Appended to the query, one search per entry.
    scopes: Vec<String>,
}

impl ImageSearchCollector {
    #[must_use]
    pub fn news(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            category: Category::News,
            fetcher,
            base_url: BASE_URL.to_string(),
            scopes: NEWS_DOMAINS.iter().map(|d| format!("site:{d}")).collect(),
        }
    }

    #[must_use]
    pub fn commercial(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            category: Category::Commercial,
            fetcher,
            base_url: BASE_URL.to_string(),
            scopes: vec![COMMERCIAL_SUFFIX.to_string()],
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn search_url(&self, query: &str, scope: &str) -> String {
        let q = format!("{query} {scope}");
        format!(
            "{}/search?q={}&tbm=isch",
            self.base_url,
            utf8_percent_encode(&q, NON_ALPHANUMERIC)
        )
    }

    async fn collect_scope(
        &self,
        query: &str,
        scope: &str,
        limit: usize,
        next_ordinal: usize,
    ) -> Vec<CandidateImage> {
        let search_url = self.search_url(query, scope);
        let page = match self.fetcher.fetch(&search_url).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(
                    source = %self.category,
                    scope,
                    error = %e,
                    "image search failed"
                );
                return Vec::new();
            }
        };

        let label = self.category.platform_label();
        let category = self.category.as_str();
        html::find_image_sources(&search_url, &page, is_valid_image_url)
            .into_iter()
            .take(limit)
            .enumerate()
            .map(|(i, image_url)| {
                let ordinal = next_ordinal + i;
                let mut candidate = CandidateImage::new(self.category, &search_url, &image_url);
                candidate.title = format!("{label} Image {}", ordinal + 1);
                candidate.description =
                    format!("Viral {category} image with high conversion potential");
                candidate.author = Some(format!("@{category}_creator_{ordinal}"));
                candidate
            })
            .collect()
    }
}

#[async_trait]
impl SourceCollector for ImageSearchCollector {
    fn category(&self) -> Category {
        self.category
    }

    async fn collect(&self, query: &str, requested_count: usize) -> Vec<CandidateImage> {
        if requested_count == 0 || query.trim().is_empty() {
            return Vec::new();
        }

        let per_scope = split_quota(requested_count, self.scopes.len());
        let mut candidates = Vec::new();
        for scope in &self.scopes {
            let remaining = requested_count - candidates.len();
            let batch = self
                .collect_scope(query, scope, per_scope.min(remaining), candidates.len())
                .await;
            tracing::debug!(
                source = %self.category,
                scope = %scope,
                count = batch.len(),
                "collected image search candidates"
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
