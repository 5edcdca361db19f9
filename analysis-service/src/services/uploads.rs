//! Scratch storage for uploaded images.
//!
//! Each upload is streamed to its own file under the upload directory, read
//! back once for encoding, then removed.

use crate::error::AnalysisError;
use axum::extract::multipart::Field;
use base64::{engine::general_purpose, Engine as _};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// MIME type assumed when a part carries no `Content-Type`.
pub const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// An upload persisted to the scratch directory.
#[derive(Debug, Clone)]
pub struct StoredUpload {
    pub path: PathBuf,
    pub mime_type: String,
    pub size: u64,
    pub original_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    /// Open the store, creating the directory if needed.
    pub async fn new(dir: impl Into<PathBuf>) -> Result<Self, std::io::Error> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Stream a multipart field into a fresh file.
    ///
    /// A partially written file is removed if the body or the disk fails.
    pub async fn persist_field(&self, mut field: Field<'_>) -> Result<StoredUpload, AnalysisError> {
        let mime_type = field
            .content_type()
            .unwrap_or(FALLBACK_MIME_TYPE)
            .to_string();
        let original_name = field.file_name().map(|name| name.to_string());
        let path = self.dir.join(Uuid::new_v4().to_string());

        let mut file = fs::File::create(&path).await?;
        let mut size = 0u64;

        let written = async {
            while let Some(chunk) = field.chunk().await? {
                file.write_all(&chunk).await?;
                size += chunk.len() as u64;
            }
            file.flush().await?;
            Ok::<(), AnalysisError>(())
        }
        .await;

        if let Err(e) = written {
            drop(file);
            if let Err(cleanup) = fs::remove_file(&path).await {
                tracing::warn!(
                    path = %path.display(),
                    error = %cleanup,
                    "Failed to remove partial upload"
                );
            }
            return Err(e);
        }

        tracing::debug!(
            path = %path.display(),
            mime_type = %mime_type,
            size,
            "Upload stored"
        );

        Ok(StoredUpload {
            path,
            mime_type,
            size,
            original_name,
        })
    }

    /// Read an upload fully and encode it as standard padded base64.
    pub async fn read_base64(&self, upload: &StoredUpload) -> Result<String, std::io::Error> {
        let bytes = fs::read(&upload.path).await?;
        Ok(general_purpose::STANDARD.encode(bytes))
    }

    /// Delete an upload. A file that is already gone is not an error.
    pub async fn remove(&self, upload: &StoredUpload) -> Result<(), std::io::Error> {
        match fs::remove_file(&upload.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}
