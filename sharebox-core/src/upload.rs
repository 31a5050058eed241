//! Batch upload through presigned URLs
//!
//! 1. POST metadata for every file, receive one `{uploadUrl, filename}` each
//! 2. PUT every file to its URL concurrently, unbounded
//!
//! The batch is all-or-nothing from the caller's point of view: a missing
//! URL or any failed PUT fails the whole batch, with no per-file accounting.

use std::path::Path;

use futures::future::join_all;
use tracing::{info, warn};

use crate::api::{ApiClient, ApiError};
use crate::models::{UploadFileMeta, UploadTarget};

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// A local file queued for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub name: String,
    pub content_type: String,
    pub content: Vec<u8>,
}

impl LocalFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            content,
        }
    }

    /// Read a file from disk, inferring its MIME type from the extension
    pub async fn read(path: &Path) -> std::io::Result<Self> {
        let content = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self {
            content_type: content_type_for(&name).to_string(),
            name,
            content,
        })
    }

    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }

    pub fn meta(&self) -> UploadFileMeta {
        UploadFileMeta {
            filename: self.name.clone(),
            file_type: self.content_type.clone(),
            size: self.size(),
            content_type: self.content_type.clone(),
        }
    }
}

/// Guess a MIME type from a file name
pub fn content_type_for(name: &str) -> &'static str {
    let ext = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext.to_ascii_lowercase(),
        _ => return FALLBACK_CONTENT_TYPE,
    };

    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "pdf" => "application/pdf",
        "txt" | "log" => "text/plain",
        "md" => "text/markdown",
        "csv" => "text/csv",
        "html" | "htm" => "text/html",
        "json" => "application/json",
        "zip" => "application/zip",
        "gz" => "application/gzip",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        _ => FALLBACK_CONTENT_TYPE,
    }
}

/// Pair each file with the first target issued under its name
fn match_targets<'a>(
    files: &'a [LocalFile],
    targets: &'a [UploadTarget],
) -> Result<Vec<(&'a LocalFile, &'a str)>, ApiError> {
    files
        .iter()
        .map(|file| {
            targets
                .iter()
                .find(|t| t.filename == file.name)
                .map(|t| (file, t.upload_url.as_str()))
                .ok_or_else(|| ApiError::MissingUploadUrl(file.name.clone()))
        })
        .collect()
}

/// Upload every file or fail as a whole
pub async fn upload_batch(api: &ApiClient, files: &[LocalFile]) -> Result<(), ApiError> {
    if files.is_empty() {
        return Ok(());
    }

    let metas = files.iter().map(LocalFile::meta).collect();
    let targets = api.request_upload_targets(metas).await?;
    let pairs = match_targets(files, &targets)?;

    let results = join_all(pairs.into_iter().map(|(file, url)| async move {
        api.put_presigned(url, &file.name, &file.content_type, file.content.clone())
            .await
    }))
    .await;

    let mut first_error = None;
    for result in results {
        if let Err(e) = result {
            warn!("Upload failed: {}", e);
            if first_error.is_none() {
                first_error = Some(e);
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => {
            info!("Uploaded {} file(s)", files.len());
            Ok(())
        }
    }
}
