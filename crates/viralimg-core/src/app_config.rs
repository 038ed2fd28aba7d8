use std::path::PathBuf;

use crate::types::Category;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Maximum candidates requested from each source per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceQuotas {
    pub instagram: usize,
    pub facebook: usize,
    pub youtube: usize,
    pub news: usize,
    pub commercial: usize,
}

impl Default for SourceQuotas {
    fn default() -> Self {
        Self {
            instagram: 8,
            facebook: 6,
            youtube: 6,
            news: 8,
            commercial: 6,
        }
    }
}

impl SourceQuotas {
    #[must_use]
    pub fn for_category(&self, category: Category) -> usize {
        match category {
            Category::Instagram => self.instagram,
            Category::Facebook => self.facebook,
            Category::YouTube => self.youtube,
            Category::News => self.news,
            Category::Commercial => self.commercial,
        }
    }

    pub fn set(&mut self, category: Category, quota: usize) {
        match category {
            Category::Instagram => self.instagram = quota,
            Category::Facebook => self.facebook = quota,
            Category::YouTube => self.youtube = quota,
            Category::News => self.news = quota,
            Category::Commercial => self.commercial = quota,
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub storage_root: PathBuf,
    pub log_level: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub download_concurrency: usize,
    pub min_target: usize,
    pub max_target: usize,
    pub quotas: SourceQuotas,
    /// Base URL of a page-rendering service. Direct HTTP fetches when `None`.
    pub renderer_url: Option<String>,
    pub renderer_token: Option<String>,
    pub scoring_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_root: PathBuf::from("./viral_images"),
            log_level: "info".to_string(),
            request_timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_retries: 2,
            retry_backoff_base_ms: 500,
            download_concurrency: 4,
            min_target: 20,
            max_target: 20,
            quotas: SourceQuotas::default(),
            renderer_url: None,
            renderer_token: None,
            scoring_path: None,
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("storage_root", &self.storage_root)
            .field("log_level", &self.log_level)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("download_concurrency", &self.download_concurrency)
            .field("min_target", &self.min_target)
            .field("max_target", &self.max_target)
            .field("quotas", &self.quotas)
            .field("renderer_url", &self.renderer_url)
            .field(
                "renderer_token",
                &self.renderer_token.as_ref().map(|_| "[redacted]"),
            )
            .field("scoring_path", &self.scoring_path)
            .finish()
    }
}
