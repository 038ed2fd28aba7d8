use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Minimum accepted width and height, in pixels, for a stored image.
pub const MIN_IMAGE_DIMENSION: u32 = 200;

/// Source category a candidate was collected from.
///
/// Variant order is the orchestrator's priority order: the three social
/// platforms first, then the fallback search sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Instagram,
    Facebook,
    #[serde(rename = "youtube")]
    YouTube,
    News,
    Commercial,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Instagram,
        Category::Facebook,
        Category::YouTube,
        Category::News,
        Category::Commercial,
    ];

    pub const PRIMARY: [Category; 3] = [Category::Instagram, Category::Facebook, Category::YouTube];

    pub const FALLBACK: [Category; 2] = [Category::News, Category::Commercial];

    /// Lowercase identifier used for storage directories and file names.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Instagram => "instagram",
            Category::Facebook => "facebook",
            Category::YouTube => "youtube",
            Category::News => "news",
            Category::Commercial => "commercial",
        }
    }

    /// Display label written into records and per-platform counts.
    #[must_use]
    pub fn platform_label(self) -> &'static str {
        match self {
            Category::Instagram => "Instagram",
            Category::Facebook => "Facebook",
            Category::YouTube => "YouTube",
            Category::News => "News",
            Category::Commercial => "Commercial",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    Likes,
    Comments,
    Shares,
    Views,
    Reactions,
}

/// Engagement counts keyed by metric. Serialized as a flat JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EngagementMetrics(BTreeMap<MetricKind, u64>);

impl EngagementMetrics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, kind: MetricKind, count: u64) -> Self {
        self.0.insert(kind, count);
        self
    }

    #[must_use]
    pub fn get(&self, kind: MetricKind) -> Option<u64> {
        self.0.get(&kind).copied()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MetricKind, u64)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }
}

impl FromIterator<(MetricKind, u64)> for EngagementMetrics {
    fn from_iter<I: IntoIterator<Item = (MetricKind, u64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Image,
    Thumbnail,
}

/// A raw candidate returned by a source collector, before download.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateImage {
    pub category: Category,
    /// Page the image was found on.
    pub origin_url: String,
    /// Preferred image reference.
    pub image_url: String,
    /// Lower-quality references tried in order when `image_url` fails to materialize.
    pub fallback_image_urls: Vec<String>,
    pub title: String,
    pub description: String,
    pub author: Option<String>,
    pub content_type: ContentType,
    /// Engagement counts exposed by the source, if any.
    pub raw_signal: Option<EngagementMetrics>,
}

impl CandidateImage {
    #[must_use]
    pub fn new(category: Category, origin_url: &str, image_url: &str) -> Self {
        Self {
            category,
            origin_url: origin_url.to_string(),
            image_url: image_url.to_string(),
            fallback_image_urls: Vec::new(),
            title: String::new(),
            description: String::new(),
            author: None,
            content_type: ContentType::Image,
            raw_signal: None,
        }
    }

    /// Image references in the order they should be attempted.
    pub fn image_refs(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.image_url.as_str())
            .chain(self.fallback_image_urls.iter().map(String::as_str))
    }
}

/// A downloaded and validated image on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub path: PathBuf,
    /// The reference that was actually fetched.
    pub image_url: String,
    pub width: u32,
    pub height: u32,
    pub file_size: u64,
}

/// The durable per-image entity written to session metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredImageRecord {
    pub platform: String,
    pub source_url: String,
    pub image_url: String,
    pub local_path: PathBuf,
    pub title: String,
    pub description: String,
    pub author: String,
    pub engagement_metrics: EngagementMetrics,
    pub hashtags: Vec<String>,
    pub content_type: ContentType,
    pub virality_score: f64,
    pub extraction_timestamp: String,
    pub image_size: (u32, u32),
    pub file_size: u64,
}
