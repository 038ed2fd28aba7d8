//! Tunable scoring constants: per-category metric weights and the base
//! values used when engagement has to be estimated.
//!
//! Built-in defaults can be overridden per category from a YAML file:
//!
//! ```yaml
//! weights:
//!   news: { views: 0.7, shares: 0.3 }
//! base_metrics:
//!   commercial: 800
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::types::{Category, MetricKind};
use crate::ConfigError;

/// Base used for categories without an explicit entry.
pub const DEFAULT_BASE_METRIC: u64 = 1000;

pub type WeightTable = BTreeMap<MetricKind, f64>;

#[derive(Debug, Clone, PartialEq)]
pub struct ScoringConfig {
    weights: BTreeMap<Category, WeightTable>,
    base_metrics: BTreeMap<Category, u64>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        use MetricKind::{Comments, Likes, Shares, Views};

        fn table(entries: &[(MetricKind, f64)]) -> WeightTable {
            entries.iter().copied().collect()
        }

        let weights = BTreeMap::from([
            (
                Category::Instagram,
                table(&[(Likes, 0.3), (Comments, 0.4), (Shares, 0.3)]),
            ),
            (
                Category::Facebook,
                table(&[(Likes, 0.25), (Comments, 0.35), (Shares, 0.4)]),
            ),
            (
                Category::YouTube,
                table(&[(Views, 0.4), (Likes, 0.3), (Comments, 0.3)]),
            ),
            (Category::News, table(&[(Views, 0.6), (Shares, 0.4)])),
            (
                Category::Commercial,
                table(&[(Views, 0.5), (Likes, 0.3), (Shares, 0.2)]),
            ),
        ]);

        let base_metrics = BTreeMap::from([
            (Category::News, 1000),
            (Category::Commercial, 500),
            (Category::Instagram, 2000),
            (Category::Facebook, 1500),
            (Category::YouTube, 10_000),
        ]);

        Self {
            weights,
            base_metrics,
        }
    }
}

impl ScoringConfig {
    /// Weight table for `category`, falling back to the Instagram table.
    #[must_use]
    pub fn weights_for(&self, category: Category) -> Option<&WeightTable> {
        self.weights
            .get(&category)
            .or_else(|| self.weights.get(&Category::Instagram))
    }

    /// Base engagement value used by metric estimation.
    #[must_use]
    pub fn base_for(&self, category: Category) -> u64 {
        self.base_metrics
            .get(&category)
            .copied()
            .unwrap_or(DEFAULT_BASE_METRIC)
    }

    /// Replace the weight table for one category.
    #[must_use]
    pub fn with_weights(mut self, category: Category, table: WeightTable) -> Self {
        self.weights.insert(category, table);
        self
    }

    /// Remove the weight table for one category so it falls back to Instagram's.
    #[must_use]
    pub fn without_weights(mut self, category: Category) -> Self {
        self.weights.remove(&category);
        self
    }

    #[must_use]
    pub fn with_base(mut self, category: Category, base: u64) -> Self {
        self.base_metrics.insert(category, base);
        self
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScoringFile {
    #[serde(default)]
    weights: BTreeMap<Category, WeightTable>,
    #[serde(default)]
    base_metrics: BTreeMap<Category, u64>,
}

/// Load scoring overrides from a YAML file and merge them over the defaults.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or contains
/// negative or non-finite weights.
pub fn load_scoring_config(path: &Path) -> Result<ScoringConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ScoringFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_scoring_config(&content)
}

fn parse_scoring_config(content: &str) -> Result<ScoringConfig, ConfigError> {
    let file: ScoringFile = serde_yaml::from_str(content)?;
    validate_weights(&file.weights)?;

    let mut config = ScoringConfig::default();
    for (category, table) in file.weights {
        config.weights.insert(category, table);
    }
    for (category, base) in file.base_metrics {
        config.base_metrics.insert(category, base);
    }
    Ok(config)
}

fn validate_weights(weights: &BTreeMap<Category, WeightTable>) -> Result<(), ConfigError> {
    for (category, table) in weights {
        for (metric, weight) in table {
            if !weight.is_finite() || *weight < 0.0 {
                return Err(ConfigError::Validation(format!(
                    "weight for {category}.{metric:?} must be a non-negative number, got {weight}"
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tables_sum_to_one() {
        let config = ScoringConfig::default();
        for category in Category::ALL {
            let sum: f64 = config.weights_for(category).unwrap().values().sum();
            assert!((sum - 1.0).abs() < 1e-9, "{category} weights sum to {sum}");
        }
    }

    #[test]
    fn missing_table_falls_back_to_instagram() {
        let config = ScoringConfig::default().without_weights(Category::News);
        assert_eq!(
            config.weights_for(Category::News),
            config.weights_for(Category::Instagram)
        );
    }

    #[test]
    fn default_bases_match_categories() {
        let config = ScoringConfig::default();
        assert_eq!(config.base_for(Category::YouTube), 10_000);
        assert_eq!(config.base_for(Category::Commercial), 500);
    }

    #[test]
    fn yaml_overrides_merge_over_defaults() {
        let yaml = "weights:\n  news:\n    views: 0.7\n    shares: 0.3\nbase_metrics:\n  commercial: 800\n";
        let config = parse_scoring_config(yaml).unwrap();
        assert_eq!(
            config.weights_for(Category::News).unwrap().get(&MetricKind::Views),
            Some(&0.7)
        );
        assert_eq!(config.base_for(Category::Commercial), 800);
        // Untouched entries keep their defaults.
        assert_eq!(config.base_for(Category::Instagram), 2000);
    }

    #[test]
    fn empty_yaml_yields_defaults() {
        let config = parse_scoring_config("{}").unwrap();
        assert_eq!(config, ScoringConfig::default());
    }

    #[test]
    fn negative_weight_is_rejected() {
        let yaml = "weights:\n  news:\n    views: -0.5\n";
        let err = parse_scoring_config(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)), "got {err:?}");
    }

    #[test]
    fn unknown_category_is_a_parse_error() {
        let yaml = "weights:\n  tiktok:\n    views: 1.0\n";
        let err = parse_scoring_config(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::ScoringFileParse(_)), "got {err:?}");
    }

    #[test]
    fn load_reports_missing_file() {
        let err = load_scoring_config(Path::new("/definitely/not/here.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::ScoringFileIo { .. }), "got {err:?}");
    }

    #[test]
    fn load_reads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scoring.yaml");
        std::fs::write(&path, "base_metrics:\n  youtube: 20000\n").unwrap();
        let config = load_scoring_config(&path).unwrap();
        assert_eq!(config.base_for(Category::YouTube), 20_000);
    }
}
