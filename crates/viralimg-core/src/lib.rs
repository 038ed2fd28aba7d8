//! Shared domain types and configuration for the viral image extractor.

pub mod app_config;
pub mod config;
pub mod error;
pub mod scoring;
pub mod session;
pub mod terms;
pub mod types;

pub use app_config::{AppConfig, SourceQuotas};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::ConfigError;
pub use scoring::{load_scoring_config, ScoringConfig};
pub use session::{ExtractionSessionResult, ExtractionStatus, ExtractionSummary};
pub use terms::{extract_hashtags, extract_youtube_id, generate_hashtags, generate_search_terms};
pub use types::{
    CandidateImage, Category, ContentType, EngagementMetrics, MetricKind, ScoredImageRecord,
    StoredImage, MIN_IMAGE_DIMENSION,
};
