//! Extraction pipeline for viral images.
//!
//! Turns collector candidates into ranked, persisted records: downloads and
//! validates images, synthesizes engagement metrics, scores virality, and
//! assembles the session result written to the storage root.

pub mod error;
pub mod materializer;
pub mod metadata;
pub mod orchestrator;
pub mod scorer;
pub mod synthesizer;

pub use error::{MaterializeError, PipelineError};
pub use materializer::{HttpMaterializer, Materializer};
pub use metadata::{load_session, metadata_path, write_session};
pub use orchestrator::ViralImageOrchestrator;
pub use scorer::{virality_score, NEUTRAL_SCORE};
pub use synthesizer::{EstimatedMetrics, MetricSynthesizer};
