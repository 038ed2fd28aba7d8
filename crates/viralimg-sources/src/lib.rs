//! Candidate image sources.
//!
//! One [`SourceCollector`] per platform, all loading pages through a shared
//! [`PageFetcher`] that retries transient failures.

pub mod collector;
pub mod error;
pub mod facebook;
pub mod fetcher;
pub mod filter;
mod html;
pub mod image_search;
pub mod instagram;
mod rate_limit;
pub mod youtube;

pub use collector::{default_collectors, SourceCollector};
pub use error::SourceError;
pub use facebook::FacebookCollector;
pub use fetcher::{build_page_fetcher, HttpPageFetcher, PageFetcher, RenderedPageFetcher};
pub use filter::is_valid_image_url;
pub use image_search::ImageSearchCollector;
pub use instagram::InstagramCollector;
pub use youtube::YouTubeCollector;
