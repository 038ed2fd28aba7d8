//! Session result assembly and summaries.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::types::ScoredImageRecord;

/// Terminal output of one extraction run. Field names match the persisted
/// metadata file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionSessionResult {
    pub session_id: String,
    pub query: String,
    pub extraction_timestamp: String,
    pub total_images: usize,
    pub images_by_platform: BTreeMap<String, usize>,
    pub average_virality_score: f64,
    pub target_met: bool,
    /// Sorted by virality score, descending.
    pub images: Vec<ScoredImageRecord>,
}

impl ExtractionSessionResult {
    /// Assemble a result from already ranked and truncated records.
    ///
    /// `target_met` is true when at least `min_target` records are present.
    #[must_use]
    pub fn assemble(
        session_id: &str,
        query: &str,
        images: Vec<ScoredImageRecord>,
        min_target: usize,
    ) -> Self {
        let mut images_by_platform: BTreeMap<String, usize> = BTreeMap::new();
        for image in &images {
            *images_by_platform.entry(image.platform.clone()).or_default() += 1;
        }

        Self {
            session_id: session_id.to_string(),
            query: query.to_string(),
            extraction_timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            total_images: images.len(),
            images_by_platform,
            average_virality_score: mean_score(&images),
            target_met: images.len() >= min_target,
            images,
        }
    }

    #[must_use]
    pub fn status(&self) -> ExtractionStatus {
        if self.images.is_empty() {
            ExtractionStatus::NoImages
        } else if self.target_met {
            ExtractionStatus::Success
        } else {
            ExtractionStatus::Partial
        }
    }

    #[must_use]
    pub fn summary(&self) -> ExtractionSummary {
        ExtractionSummary {
            total: self.images.len(),
            by_platform: self.images_by_platform.clone(),
            average_score: self.average_virality_score,
            status: self.status(),
            image_paths: self.images.iter().map(|i| i.local_path.clone()).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStatus {
    NoImages,
    Partial,
    Success,
}

impl std::fmt::Display for ExtractionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractionStatus::NoImages => write!(f, "no_images"),
            ExtractionStatus::Partial => write!(f, "partial"),
            ExtractionStatus::Success => write!(f, "success"),
        }
    }
}

/// Caller-facing overview of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionSummary {
    pub total: usize,
    pub by_platform: BTreeMap<String, usize>,
    pub average_score: f64,
    pub status: ExtractionStatus,
    pub image_paths: Vec<PathBuf>,
}

fn mean_score(images: &[ScoredImageRecord]) -> f64 {
    if images.is_empty() {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let denom = images.len() as f64;
    images.iter().map(|i| i.virality_score).sum::<f64>() / denom
}
