//! The collector seam between the orchestrator and individual sources.

use std::sync::Arc;

use async_trait::async_trait;
use viralimg_core::{CandidateImage, Category};

use crate::facebook::FacebookCollector;
use crate::fetcher::PageFetcher;
use crate::image_search::ImageSearchCollector;
use crate::instagram::InstagramCollector;
use crate::youtube::YouTubeCollector;

/// One source of candidate images.
///
/// Implementations never fail outward: remote errors are logged and the
/// successfully collected subset (possibly empty) is returned.
#[async_trait]
pub trait SourceCollector: Send + Sync {
    fn category(&self) -> Category;

    /// Collect at most `requested_count` candidates for `query`.
    async fn collect(&self, query: &str, requested_count: usize) -> Vec<CandidateImage>;
}

/// Build the production collector for every category, all sharing one
/// page fetcher.
#[must_use]
pub fn default_collectors(fetcher: &Arc<dyn PageFetcher>) -> Vec<Arc<dyn SourceCollector>> {
    vec![
        Arc::new(InstagramCollector::new(Arc::clone(fetcher))),
        Arc::new(FacebookCollector::new(Arc::clone(fetcher))),
        Arc::new(YouTubeCollector::new(Arc::clone(fetcher))),
        Arc::new(ImageSearchCollector::news(Arc::clone(fetcher))),
        Arc::new(ImageSearchCollector::commercial(Arc::clone(fetcher))),
    ]
}

/// Per-part share of `total` when split across `parts`, rounded up so the
/// parts together can fill the whole quota. Callers stop once `total` is met.
pub(crate) fn split_quota(total: usize, parts: usize) -> usize {
    if parts == 0 {
        return total;
    }
    total.div_ceil(parts).max(1)
}
