//! Engagement metric synthesis.
//!
//! Collected pages rarely expose real counts, so each record's metrics come
//! from a [`MetricSynthesizer`]. [`EstimatedMetrics`] passes through any raw
//! signal a collector captured and otherwise derives a deterministic estimate
//! from a per-category base and the candidate's position in its batch.

use viralimg_core::{CandidateImage, Category, EngagementMetrics, MetricKind, ScoringConfig};

pub trait MetricSynthesizer: Send + Sync {
    /// Metrics for `candidate`, the `ordinal`-th image of its source batch.
    ///
    /// Must be deterministic: the same inputs always yield the same metrics.
    fn synthesize(
        &self,
        candidate: &CandidateImage,
        category: Category,
        ordinal: usize,
    ) -> EngagementMetrics;
}

/// Base-plus-linear estimation keyed on category.
#[derive(Debug, Clone, Default)]
pub struct EstimatedMetrics {
    scoring: ScoringConfig,
}

impl EstimatedMetrics {
    #[must_use]
    pub fn new(scoring: ScoringConfig) -> Self {
        Self { scoring }
    }

    fn estimate(&self, category: Category, ordinal: usize) -> EngagementMetrics {
        let base = self.scoring.base_for(category);
        let i = ordinal as u64;

        match category {
            Category::YouTube => {
                let views = base.saturating_mul(5).saturating_add(base.saturating_mul(i));
                EngagementMetrics::new()
                    .with(MetricKind::Views, views)
                    .with(MetricKind::Likes, views / 20)
                    .with(MetricKind::Comments, views / 100)
                    .with(MetricKind::Shares, views / 50)
            }
            _ => {
                let linear = |start: u64, step: u64| start.saturating_add(step.saturating_mul(i));
                let metrics = EngagementMetrics::new()
                    .with(MetricKind::Likes, linear(base, 100))
                    .with(MetricKind::Comments, linear(base / 10, 10))
                    .with(MetricKind::Shares, linear(base / 20, 5))
                    .with(MetricKind::Views, linear(base.saturating_mul(5), 500));
                if category == Category::Facebook {
                    metrics.with(
                        MetricKind::Reactions,
                        linear(base.saturating_add(base / 5), 120),
                    )
                } else {
                    metrics
                }
            }
        }
    }
}

impl MetricSynthesizer for EstimatedMetrics {
    fn synthesize(
        &self,
        candidate: &CandidateImage,
        category: Category,
        ordinal: usize,
    ) -> EngagementMetrics {
        match &candidate.raw_signal {
            Some(raw) if !raw.is_empty() => raw.clone(),
            _ => self.estimate(category, ordinal),
        }
    }
}
