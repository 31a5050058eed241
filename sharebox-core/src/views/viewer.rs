//! File viewer
//!
//! The preview kind comes from the access URL's extension only; the
//! server-declared content type is not consulted. Query strings and
//! fragments are ignored, extensionless URLs fall through to `Other`.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use super::Feedback;
use crate::api::{ApiClient, ApiError};

pub const OPEN_FAILED: &str = "Could not open file for viewing. Please try again.";
pub const DOWNLOAD_FAILED: &str = "Could not download file. Please try again.";
pub const NO_PREVIEW: &str = "Cannot preview this file type.";

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PreviewKind {
    Image,
    Pdf,
    #[default]
    Other,
}

impl PreviewKind {
    pub fn label(&self) -> &'static str {
        match self {
            PreviewKind::Image => "Image",
            PreviewKind::Pdf => "PDF",
            PreviewKind::Other => "Other",
        }
    }
}

/// Path component of a URL, without query or fragment
fn url_path(url: &str) -> &str {
    let without_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    let path = without_scheme
        .find('/')
        .map_or("", |i| &without_scheme[i..]);
    path.split(['?', '#']).next().unwrap_or_default()
}

/// Last path segment of a URL, percent-encoding left as is
fn url_file_name(url: &str) -> Option<&str> {
    url_path(url).rsplit('/').next().filter(|name| !name.is_empty())
}

pub fn preview_kind(access_url: &str) -> PreviewKind {
    let Some(name) = url_file_name(access_url) else {
        return PreviewKind::Other;
    };
    let Some((_, ext)) = name.rsplit_once('.') else {
        return PreviewKind::Other;
    };
    let ext = ext.to_ascii_lowercase();

    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        PreviewKind::Image
    } else if ext == "pdf" {
        PreviewKind::Pdf
    } else {
        PreviewKind::Other
    }
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Failed to save download: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct FileViewer {
    pub file_id: String,
    pub access_url: Option<String>,
    pub kind: PreviewKind,
    pub feedback: Feedback,
    /// Where the last download was written
    pub saved_to: Option<PathBuf>,
}

impl FileViewer {
    pub fn new(file_id: impl Into<String>) -> Self {
        Self {
            file_id: file_id.into(),
            access_url: None,
            kind: PreviewKind::default(),
            feedback: Feedback::default(),
            saved_to: None,
        }
    }

    pub fn begin_load(&mut self) -> String {
        self.feedback.start();
        self.file_id.clone()
    }

    pub fn apply_load(&mut self, result: Result<String, ApiError>) {
        match result {
            Ok(url) => {
                self.kind = preview_kind(&url);
                self.access_url = Some(url);
                self.feedback.done();
            }
            Err(e) => self.feedback.fail_api(&e, OPEN_FAILED),
        }
    }

    pub fn can_preview(&self) -> bool {
        self.kind != PreviewKind::Other
    }

    /// Download is offered once the URL is known
    pub fn download_url(&self) -> Option<&str> {
        self.access_url.as_deref()
    }

    pub fn download_file_name(&self) -> String {
        self.access_url
            .as_deref()
            .and_then(url_file_name)
            .map(String::from)
            .unwrap_or_else(|| self.file_id.clone())
    }

    pub fn apply_download(&mut self, result: Result<PathBuf, DownloadError>) {
        match result {
            Ok(path) => {
                self.feedback.succeed(format!("Saved to {}", path.display()));
                self.saved_to = Some(path);
            }
            Err(DownloadError::Api(e)) => self.feedback.fail_api(&e, DOWNLOAD_FAILED),
            Err(e) => {
                tracing::warn!("{}", e);
                self.feedback.fail(DOWNLOAD_FAILED);
            }
        }
    }

    pub async fn load(&mut self, api: &ApiClient) {
        let id = self.begin_load();
        let result = api.view_file(&id).await;
        self.apply_load(result);
    }
}

/// Fetch `url` and write it into `dir` under `file_name`
pub async fn save_download(
    api: &ApiClient,
    url: &str,
    dir: &Path,
    file_name: &str,
) -> Result<PathBuf, DownloadError> {
    let content = api.download(url).await?;

    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(file_name);
    tokio::fs::write(&path, content).await?;

    info!("Downloaded {}", path.display());
    Ok(path)
}
