//! Session metadata persistence.
//!
//! One JSON document per session at
//! `<root>/viral_images_metadata_<session_id>.json`. Writes go to a sibling
//! temp file first and are renamed into place, so a reader never observes a
//! half-written document.

use std::path::{Path, PathBuf};

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use viralimg_core::ExtractionSessionResult;

use crate::error::PipelineError;

/// Everything outside `[A-Za-z0-9_-]` is escaped, `%` included.
const SESSION_ID_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'_').remove(b'-');

/// Percent-encode a session id for use in file names.
///
/// The encoding is one-to-one, so distinct ids never share a file.
#[must_use]
pub fn sanitize_session_id(session_id: &str) -> String {
    utf8_percent_encode(session_id, SESSION_ID_ESCAPE).to_string()
}

#[must_use]
pub fn metadata_path(storage_root: &Path, session_id: &str) -> PathBuf {
    storage_root.join(format!(
        "viral_images_metadata_{}.json",
        sanitize_session_id(session_id)
    ))
}

/// Write `result` as pretty JSON, replacing any earlier file for the session.
///
/// # Errors
///
/// Returns [`PipelineError`] if serialization or any file operation fails.
pub async fn write_session(
    storage_root: &Path,
    result: &ExtractionSessionResult,
) -> Result<PathBuf, PipelineError> {
    let path = metadata_path(storage_root, &result.session_id);
    let tmp_path = path.with_extension("json.tmp");
    let body = serde_json::to_vec_pretty(result)?;

    tokio::fs::write(&tmp_path, &body)
        .await
        .map_err(|source| PipelineError::Io {
            path: tmp_path.clone(),
            source,
        })?;
    tokio::fs::rename(&tmp_path, &path)
        .await
        .map_err(|source| PipelineError::Io {
            path: path.clone(),
            source,
        })?;

    Ok(path)
}

/// Load a previously persisted session.
///
/// # Errors
///
/// Returns [`PipelineError::Io`] if the file cannot be read and
/// [`PipelineError::Serialization`] if it is not a valid session document.
pub async fn load_session(
    storage_root: &Path,
    session_id: &str,
) -> Result<ExtractionSessionResult, PipelineError> {
    let path = metadata_path(storage_root, session_id);
    let body = tokio::fs::read(&path)
        .await
        .map_err(|source| PipelineError::Io { path, source })?;
    Ok(serde_json::from_slice(&body)?)
}
