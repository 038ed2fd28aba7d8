//! Weighted virality scoring.

use viralimg_core::{Category, EngagementMetrics, ScoringConfig};

/// Score returned when no weighted metric applies.
pub const NEUTRAL_SCORE: f64 = 50.0;

/// Per-metric cap applied after square-root compression.
const METRIC_CAP: f64 = 100.0;

/// Score engagement on `[0.0, 100.0]` using the category's weight table.
///
/// Each metric present in both `metrics` and the weight table contributes
/// `min(100, sqrt(count / 100)) * weight`; the sum is divided by the total of
/// the weights that applied. Returns [`NEUTRAL_SCORE`] when nothing applied
/// or the result is not finite.
#[must_use]
pub fn virality_score(
    metrics: &EngagementMetrics,
    category: Category,
    scoring: &ScoringConfig,
) -> f64 {
    let Some(weights) = scoring.weights_for(category) else {
        return NEUTRAL_SCORE;
    };

    let mut weighted = 0.0_f64;
    let mut applied = 0.0_f64;
    for (kind, count) in metrics.iter() {
        let Some(&weight) = weights.get(&kind) else {
            continue;
        };
        #[allow(clippy::cast_precision_loss)]
        let normalized = (count as f64 / 100.0).sqrt().min(METRIC_CAP);
        weighted += normalized * weight;
        applied += weight;
    }

    if applied <= 0.0 {
        return NEUTRAL_SCORE;
    }
    let score = weighted / applied;
    if score.is_finite() {
        score.clamp(0.0, 100.0)
    } else {
        NEUTRAL_SCORE
    }
}
