//! Command handlers for `extract` and `summary`.

use std::sync::Arc;

use viralimg_core::{load_scoring_config, AppConfig, ExtractionSummary, ScoringConfig};
use viralimg_pipeline::{load_session, EstimatedMetrics, HttpMaterializer, ViralImageOrchestrator};
use viralimg_sources::{build_page_fetcher, default_collectors};

use crate::QuotaArgs;

/// Run one extraction session and print its summary.
///
/// # Errors
///
/// Returns an error if the query is blank, the scoring file is invalid, or
/// the HTTP clients or storage directories cannot be set up. Source and
/// image failures never reach this level.
pub(crate) async fn run_extract(
    mut config: AppConfig,
    query: &str,
    session_id: Option<String>,
    quotas: &QuotaArgs,
) -> anyhow::Result<()> {
    let query = query.trim();
    if query.is_empty() {
        anyhow::bail!("query must not be empty");
    }
    quotas.apply(&mut config.quotas);
    let session_id = session_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let scoring = match &config.scoring_path {
        Some(path) => load_scoring_config(path)?,
        None => ScoringConfig::default(),
    };

    let fetcher = build_page_fetcher(&config)
        .map_err(|e| anyhow::anyhow!("failed to build page fetcher: {e}"))?;
    let materializer = HttpMaterializer::new(
        &config.storage_root,
        config.request_timeout_secs,
        &config.user_agent,
    )
    .map_err(|e| anyhow::anyhow!("failed to build image downloader: {e}"))?;

    tracing::info!(
        session_id = %session_id,
        query,
        fetcher = fetcher.name(),
        quotas = ?config.quotas,
        "starting extraction session"
    );

    let orchestrator = ViralImageOrchestrator::new(
        config,
        default_collectors(&fetcher),
        Arc::new(materializer),
        Arc::new(EstimatedMetrics::new(scoring.clone())),
        scoring,
    )?;
    let result = orchestrator.extract(query, &session_id).await;

    print_summary(&session_id, &result.summary())
}

/// Load a persisted session and print its summary.
///
/// # Errors
///
/// Returns an error if the session's metadata file is missing or invalid.
pub(crate) async fn run_summary(config: &AppConfig, session_id: &str) -> anyhow::Result<()> {
    let result = load_session(&config.storage_root, session_id)
        .await
        .map_err(|e| anyhow::anyhow!("failed to load session '{session_id}': {e}"))?;
    print_summary(&result.session_id, &result.summary())
}

fn print_summary(session_id: &str, summary: &ExtractionSummary) -> anyhow::Result<()> {
    let output = serde_json::json!({
        "session_id": session_id,
        "summary": summary,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
