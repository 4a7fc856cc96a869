use reqwest::multipart::{Form, Part};
use reqwest::Body;
use std::path::Path;
use std::sync::Arc;
use tokio_util::io::ReaderStream;
use tracing::info;

use crate::error::{PublishError, Result};
use crate::models::ImagesEnvelope;
use crate::services::ghost_client::GhostClient;

const UPLOAD_PATH: &str = "/images/upload/";

/// Uploads local images to the Ghost image store.
///
/// Every call creates a new remote asset; nothing is deduplicated.
#[derive(Debug, Clone)]
pub struct ImageUploader {
    client: Arc<GhostClient>,
}

impl ImageUploader {
    pub fn new(client: Arc<GhostClient>) -> Self {
        Self { client }
    }

    /// Stream `path` as a multipart upload and return the hosted URL.
    pub async fn upload(&self, path: &Path) -> Result<String> {
        let metadata = match tokio::fs::metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PublishError::usage(format!(
                    "Image file not found: {}",
                    path.display()
                )));
            }
            Err(e) => return Err(e.into()),
        };

        if !metadata.is_file() {
            return Err(PublishError::usage(format!(
                "Not a regular file: {}",
                path.display()
            )));
        }

        let file = tokio::fs::File::open(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());

        let body = Body::wrap_stream(ReaderStream::new(file));
        let part = Part::stream_with_length(body, metadata.len())
            .file_name(file_name.clone())
            .mime_str(&content_type_for(path))
            .map_err(|e| PublishError::usage(format!("Unsupported image type: {e}")))?;

        let form = Form::new().part("file", part).text("purpose", "image");

        info!(file = %file_name, bytes = metadata.len(), "Uploading image");

        let envelope: ImagesEnvelope = self.client.post_multipart(UPLOAD_PATH, form).await?;
        let url = envelope
            .images
            .into_iter()
            .next()
            .map(|image| image.url)
            .ok_or_else(|| PublishError::Decode("upload response contained no images".into()))?;

        info!(url = %url, "Image uploaded");
        Ok(url)
    }
}

/// MIME type by file extension; Ghost rejects uploads it cannot classify.
pub fn content_type_for(path: &Path) -> String {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    let content_type = match ext.as_deref() {
        Some("png") => mime::IMAGE_PNG,
        Some("jpg") | Some("jpeg") => mime::IMAGE_JPEG,
        Some("gif") => mime::IMAGE_GIF,
        Some("svg") => mime::IMAGE_SVG,
        Some("webp") => return "image/webp".to_string(),
        Some("ico") => return "image/x-icon".to_string(),
        _ => mime::APPLICATION_OCTET_STREAM,
    };
    content_type.to_string()
}
