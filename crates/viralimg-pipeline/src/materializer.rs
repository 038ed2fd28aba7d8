//! Image download, storage, and validation.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use viralimg_core::{Category, StoredImage, MIN_IMAGE_DIMENSION};

use crate::error::MaterializeError;
use crate::metadata::sanitize_session_id;

/// Turns an image reference into a validated file on disk.
#[async_trait]
pub trait Materializer: Send + Sync {
    /// Download and validate one image. `None` means the reference produced
    /// nothing usable; the reason has already been logged.
    async fn materialize(
        &self,
        image_url: &str,
        category: Category,
        session_id: &str,
        ordinal: usize,
    ) -> Option<StoredImage>;
}

/// Downloads over HTTP into `<root>/<category>/`.
pub struct HttpMaterializer {
    client: Client,
    storage_root: PathBuf,
}

impl HttpMaterializer {
    /// # Errors
    ///
    /// Returns [`MaterializeError::Http`] if the `reqwest::Client` cannot be
    /// constructed.
    pub fn new(
        storage_root: impl Into<PathBuf>,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, MaterializeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            storage_root: storage_root.into(),
        })
    }

    async fn try_materialize(
        &self,
        image_url: &str,
        category: Category,
        session_id: &str,
        ordinal: usize,
    ) -> Result<StoredImage, MaterializeError> {
        let response = self.client.get(image_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(MaterializeError::UnexpectedStatus {
                status: status.as_u16(),
                url: image_url.to_string(),
            });
        }

        let extension = extension_for(
            response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
        );
        let bytes = response.bytes().await?;

        let file_name = image_file_name(
            category,
            session_id,
            ordinal,
            chrono::Utc::now().timestamp_millis(),
            extension,
        );
        let path = self.storage_root.join(category.as_str()).join(file_name);
        tokio::fs::write(&path, &bytes).await?;

        match validate_file(&path).await {
            Ok((width, height)) => Ok(StoredImage {
                path,
                image_url: image_url.to_string(),
                width,
                height,
                file_size: bytes.len() as u64,
            }),
            Err(e) => {
                if let Err(remove_err) = tokio::fs::remove_file(&path).await {
                    tracing::warn!(
                        path = %path.display(),
                        error = %remove_err,
                        "failed to remove rejected image"
                    );
                }
                Err(e)
            }
        }
    }
}

#[async_trait]
impl Materializer for HttpMaterializer {
    async fn materialize(
        &self,
        image_url: &str,
        category: Category,
        session_id: &str,
        ordinal: usize,
    ) -> Option<StoredImage> {
        match self
            .try_materialize(image_url, category, session_id, ordinal)
            .await
        {
            Ok(stored) => {
                tracing::debug!(
                    source = %category,
                    path = %stored.path.display(),
                    width = stored.width,
                    height = stored.height,
                    "stored image"
                );
                Some(stored)
            }
            Err(e) => {
                tracing::warn!(
                    source = %category,
                    url = %image_url,
                    error = %e,
                    "discarding image"
                );
                None
            }
        }
    }
}

/// Re-open a written file and decode it, rejecting anything smaller than
/// [`MIN_IMAGE_DIMENSION`] on either side.
async fn validate_file(path: &Path) -> Result<(u32, u32), MaterializeError> {
    let path = path.to_path_buf();
    let (width, height) = tokio::task::spawn_blocking(move || {
        let decoded = image::ImageReader::open(&path)?
            .with_guessed_format()?
            .decode()?;
        Ok::<_, MaterializeError>((decoded.width(), decoded.height()))
    })
    .await
    .map_err(|e| MaterializeError::Io(std::io::Error::other(e)))??;

    if width < MIN_IMAGE_DIMENSION || height < MIN_IMAGE_DIMENSION {
        return Err(MaterializeError::TooSmall { width, height });
    }
    Ok((width, height))
}

/// File extension for a response `Content-Type`, defaulting to `jpg`.
fn extension_for(content_type: Option<&str>) -> &'static str {
    let content_type = content_type.unwrap_or_default().to_ascii_lowercase();
    if content_type.contains("png") {
        "png"
    } else if content_type.contains("webp") {
        "webp"
    } else {
        "jpg"
    }
}

/// `<category>_<session>_<ordinal>_<unix_millis>.<ext>`, with the session id
/// percent-encoded.
fn image_file_name(
    category: Category,
    session_id: &str,
    ordinal: usize,
    unix_millis: i64,
    extension: &str,
) -> String {
    let session = sanitize_session_id(session_id);
    format!("{category}_{session}_{ordinal}_{unix_millis}.{extension}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_follows_content_type() {
        assert_eq!(extension_for(Some("image/jpeg")), "jpg");
        assert_eq!(extension_for(Some("image/jpg")), "jpg");
        assert_eq!(extension_for(Some("image/PNG")), "png");
        assert_eq!(extension_for(Some("image/webp; charset=binary")), "webp");
        assert_eq!(extension_for(Some("application/octet-stream")), "jpg");
        assert_eq!(extension_for(None), "jpg");
    }

    #[test]
    fn file_name_sanitizes_session_id() {
        let name = image_file_name(Category::YouTube, "../abc def/1", 3, 1_700_000_000_000, "jpg");
        assert_eq!(name, "youtube_%2E%2E%2Fabc%20def%2F1_3_1700000000000.jpg");
    }

    #[test]
    fn file_names_differ_for_ids_with_escaped_characters() {
        let dotted = image_file_name(Category::News, "run.1", 0, 1, "jpg");
        let plain = image_file_name(Category::News, "run1", 0, 1, "jpg");
        assert_ne!(dotted, plain);
    }
}
