//! Facebook public page collector.
//!
//! Searches pages for up to two query-derived terms, visits up to three
//! result pages per term, and takes CDN-hosted post images from each.

use std::sync::Arc;

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use viralimg_core::{generate_search_terms, CandidateImage, Category};

use crate::collector::{split_quota, SourceCollector};
use crate::fetcher::PageFetcher;
use crate::html;

const BASE_URL: &str = "https://www.facebook.com";
const MAX_TERMS: usize = 2;
const MAX_PAGES_PER_TERM: usize = 3;

pub struct FacebookCollector {
    fetcher: Arc<dyn PageFetcher>,
    base_url: String,
}

impl FacebookCollector {
    #[must_use]
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            fetcher,
            base_url: BASE_URL.to_string(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    async fn collect_term(
        &self,
        term: &str,
        limit: usize,
        next_ordinal: usize,
    ) -> Vec<CandidateImage> {
        let search_url = format!(
            "{}/search/pages/?q={}",
            self.base_url,
            utf8_percent_encode(term, NON_ALPHANUMERIC)
        );

        let results = match self.fetcher.fetch(&search_url).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(
                    source = "facebook",
                    term,
                    error = %e,
                    "page search failed"
                );
                return Vec::new();
            }
        };

        let pages: Vec<String> = html::find_links(&self.base_url, &results, "/pages/")
            .into_iter()
            .take(MAX_PAGES_PER_TERM)
            .collect();
        let per_page = split_quota(limit, pages.len());

        let mut candidates = Vec::new();
        for page_url in &pages {
            let remaining = limit - candidates.len();
            let batch = self
                .collect_page(page_url, per_page.min(remaining), next_ordinal + candidates.len())
                .await;
            candidates.extend(batch);
            if candidates.len() >= limit {
                break;
            }
        }
        candidates
    }

    async fn collect_page(
        &self,
        page_url: &str,
        limit: usize,
        next_ordinal: usize,
    ) -> Vec<CandidateImage> {
        let page = match self.fetcher.fetch(page_url).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(
                    source = "facebook",
                    url = %page_url,
                    error = %e,
                    "page fetch failed"
                );
                return Vec::new();
            }
        };

        html::find_image_sources(page_url, &page, |src| {
            src.contains("scontent") || src.contains("fbcdn")
        })
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(i, image_url)| {
            let ordinal = next_ordinal + i;
            let mut candidate = CandidateImage::new(Category::Facebook, page_url, &image_url);
            candidate.title = format!("Facebook Post Image {}", ordinal + 1);
            candidate.description =
                "Viral image from a high-engagement Facebook page".to_string();
            candidate.author = Some(format!("@page_{ordinal}"));
            candidate
        })
        .collect()
    }
}

#[async_trait]
impl SourceCollector for FacebookCollector {
    fn category(&self) -> Category {
        Category::Facebook
    }

    async fn collect(&self, query: &str, requested_count: usize) -> Vec<CandidateImage> {
        if requested_count == 0 {
            return Vec::new();
        }

        let terms: Vec<String> = generate_search_terms(query)
            .into_iter()
            .take(MAX_TERMS)
            .collect();
        let per_term = split_quota(requested_count, terms.len());

        let mut candidates = Vec::new();
        for term in &terms {
            let remaining = requested_count - candidates.len();
            let batch = self
                .collect_term(term, per_term.min(remaining), candidates.len())
                .await;
            tracing::debug!(
                source = "facebook",
                term = %term,
                count = batch.len(),
                "collected page candidates"
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
