//! Extraction session orchestration.
//!
//! 1. Collect from the primary sources (Instagram, Facebook, `YouTube`)
//!    concurrently, then materialize, synthesize and score each candidate in
//!    fixed source order.
//! 2. If fewer than `min_target` records survived, collect from the
//!    fallback sources (news, commercial) the same way.
//! 3. Rank by virality score (stable, descending), keep at most
//!    `max_target`, assemble the session result and persist it.
//!
//! Nothing below the orchestrator can abort a session: a failing source
//! contributes no candidates and a failing image contributes no record.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use futures::future::join_all;
use futures::stream::{self, StreamExt};
use viralimg_core::{
    extract_hashtags, generate_hashtags, AppConfig, CandidateImage, Category,
    ExtractionSessionResult, ScoredImageRecord, ScoringConfig,
};
use viralimg_sources::SourceCollector;

use crate::error::PipelineError;
use crate::materializer::Materializer;
use crate::metadata::write_session;
use crate::scorer::virality_score;
use crate::synthesizer::MetricSynthesizer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Idle,
    CollectingPrimary,
    CollectingFallback,
    Ranking,
    Truncating,
    Persisted,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SessionState::Idle => "idle",
            SessionState::CollectingPrimary => "collecting_primary",
            SessionState::CollectingFallback => "collecting_fallback",
            SessionState::Ranking => "ranking",
            SessionState::Truncating => "truncating",
            SessionState::Persisted => "persisted",
        };
        f.write_str(label)
    }
}

pub struct ViralImageOrchestrator {
    config: AppConfig,
    collectors: BTreeMap<Category, Arc<dyn SourceCollector>>,
    materializer: Arc<dyn Materializer>,
    synthesizer: Arc<dyn MetricSynthesizer>,
    scoring: ScoringConfig,
}

impl ViralImageOrchestrator {
    /// Build an orchestrator and create the per-category storage directories.
    ///
    /// When two collectors report the same category the later one is used.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Io`] if a storage directory cannot be created.
    pub fn new(
        config: AppConfig,
        collectors: Vec<Arc<dyn SourceCollector>>,
        materializer: Arc<dyn Materializer>,
        synthesizer: Arc<dyn MetricSynthesizer>,
        scoring: ScoringConfig,
    ) -> Result<Self, PipelineError> {
        for category in Category::ALL {
            let dir = config.storage_root.join(category.as_str());
            std::fs::create_dir_all(&dir)
                .map_err(|source| PipelineError::Io { path: dir, source })?;
        }

        let collectors = collectors
            .into_iter()
            .map(|collector| (collector.category(), collector))
            .collect();

        Ok(Self {
            config,
            collectors,
            materializer,
            synthesizer,
            scoring,
        })
    }

    /// Run one extraction session for `query`.
    ///
    /// Always returns a result; a session that produced nothing has status
    /// `no_images`. Failure to persist the metadata file is logged and the
    /// in-memory result is still returned.
    pub async fn extract(&self, query: &str, session_id: &str) -> ExtractionSessionResult {
        let mut state = SessionState::Idle;
        let mut seen = HashSet::new();

        transition(&mut state, SessionState::CollectingPrimary, session_id);
        let mut records = self
            .collect_stage(&Category::PRIMARY, query, session_id, &mut seen)
            .await;

        if records.len() < self.config.min_target {
            tracing::info!(
                session_id,
                collected = records.len(),
                min_target = self.config.min_target,
                "primary sources below target, trying fallback sources"
            );
            transition(&mut state, SessionState::CollectingFallback, session_id);
            let fallback = self
                .collect_stage(&Category::FALLBACK, query, session_id, &mut seen)
                .await;
            records.extend(fallback);
        }

        transition(&mut state, SessionState::Ranking, session_id);
        rank(&mut records);

        transition(&mut state, SessionState::Truncating, session_id);
        records.truncate(self.config.max_target);

        let result =
            ExtractionSessionResult::assemble(session_id, query, records, self.config.min_target);
        match write_session(&self.config.storage_root, &result).await {
            Ok(path) => {
                tracing::info!(session_id, path = %path.display(), "session metadata written");
            }
            Err(e) => {
                tracing::warn!(session_id, error = %e, "failed to persist session metadata");
            }
        }
        transition(&mut state, SessionState::Persisted, session_id);

        tracing::info!(
            session_id,
            total = result.total_images,
            average_score = result.average_virality_score,
            status = %result.status(),
            "extraction session complete"
        );
        result
    }

    /// Collect from `categories` concurrently, then process their batches in
    /// the given order.
    async fn collect_stage(
        &self,
        categories: &[Category],
        query: &str,
        session_id: &str,
        seen: &mut HashSet<String>,
    ) -> Vec<ScoredImageRecord> {
        let batches = join_all(
            categories
                .iter()
                .map(|&category| self.collect_source(category, query)),
        )
        .await;

        let mut records = Vec::new();
        for (&category, candidates) in categories.iter().zip(batches) {
            let fresh: Vec<CandidateImage> = candidates
                .into_iter()
                .filter(|c| seen.insert(c.image_url.clone()))
                .collect();
            let batch = self
                .process_batch(category, fresh, query, session_id)
                .await;
            tracing::debug!(source = %category, records = batch.len(), "source batch processed");
            records.extend(batch);
        }
        records
    }

    async fn collect_source(&self, category: Category, query: &str) -> Vec<CandidateImage> {
        let quota = self.config.quotas.for_category(category);
        let Some(collector) = self.collectors.get(&category) else {
            tracing::debug!(source = %category, "no collector configured");
            return Vec::new();
        };
        if quota == 0 {
            return Vec::new();
        }

        let mut candidates = collector.collect(query, quota).await;
        let before = candidates.len();
        candidates.retain(|c| c.category == category);
        if candidates.len() < before {
            tracing::warn!(
                source = %category,
                dropped = before - candidates.len(),
                "collector returned candidates for another category"
            );
        }
        candidates.truncate(quota);
        tracing::debug!(source = %category, candidates = candidates.len(), "collected candidates");
        candidates
    }

    async fn process_batch(
        &self,
        category: Category,
        candidates: Vec<CandidateImage>,
        query: &str,
        session_id: &str,
    ) -> Vec<ScoredImageRecord> {
        stream::iter(candidates.into_iter().enumerate())
            .map(|(ordinal, candidate)| {
                self.process_candidate(candidate, category, ordinal, query, session_id)
            })
            .buffered(self.config.download_concurrency.max(1))
            .filter_map(|record| async move { record })
            .collect()
            .await
    }

    async fn process_candidate(
        &self,
        candidate: CandidateImage,
        category: Category,
        ordinal: usize,
        query: &str,
        session_id: &str,
    ) -> Option<ScoredImageRecord> {
        let mut stored = None;
        for image_ref in candidate.image_refs() {
            stored = self
                .materializer
                .materialize(image_ref, category, session_id, ordinal)
                .await;
            if stored.is_some() {
                break;
            }
        }
        let stored = stored?;

        let metrics = self.synthesizer.synthesize(&candidate, category, ordinal);
        let score = virality_score(&metrics, category, &self.scoring);

        let mut hashtags =
            extract_hashtags(&format!("{} {}", candidate.description, candidate.title));
        if hashtags.is_empty() {
            hashtags = generate_hashtags(query);
        }

        Some(ScoredImageRecord {
            platform: category.as_str().to_string(),
            source_url: candidate.origin_url,
            image_url: stored.image_url,
            local_path: stored.path,
            title: candidate.title,
            description: candidate.description,
            author: candidate.author.unwrap_or_else(|| "unknown".to_string()),
            engagement_metrics: metrics,
            hashtags,
            content_type: candidate.content_type,
            virality_score: score,
            extraction_timestamp: chrono::Utc::now()
                .to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            image_size: (stored.width, stored.height),
            file_size: stored.file_size,
        })
    }
}

fn transition(state: &mut SessionState, next: SessionState, session_id: &str) {
    tracing::info!(session_id, from = %state, to = %next, "session state transition");
    *state = next;
}

/// Stable sort by virality score, highest first; equal scores keep their
/// collection order.
fn rank(records: &mut [ScoredImageRecord]) {
    records.sort_by(|a, b| b.virality_score.total_cmp(&a.virality_score));
}
