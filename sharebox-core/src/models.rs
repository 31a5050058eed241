//! Wire types for the sharebox HTTP API
//!
//! All bodies are JSON with camelCase keys. Records are owned by the server;
//! the client only ever drops entries after a confirmed delete/revoke.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub id: String,
    pub filename: String,
    /// Size in bytes
    pub size: u64,
    pub content_type: String,
    pub created_at: DateTime<Utc>,
}

/// An active share link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareRecord {
    pub id: String,
    pub file_id: String,
    pub filename: String,
    pub size: u64,
    pub expiry_at: DateTime<Utc>,
}

/// Anything listed in a multi-select table
pub trait Record {
    fn id(&self) -> &str;
}

impl Record for FileRecord {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for ShareRecord {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Share link lifetime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShareDuration {
    #[serde(rename = "1h")]
    OneHour,
    #[default]
    #[serde(rename = "24h")]
    OneDay,
    #[serde(rename = "7d")]
    SevenDays,
}

impl ShareDuration {
    pub const ALL: [ShareDuration; 3] = [
        ShareDuration::OneHour,
        ShareDuration::OneDay,
        ShareDuration::SevenDays,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ShareDuration::OneHour => "1h",
            ShareDuration::OneDay => "24h",
            ShareDuration::SevenDays => "7d",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ShareDuration::OneHour => "1 hour",
            ShareDuration::OneDay => "24 hours",
            ShareDuration::SevenDays => "7 days",
        }
    }

    /// Cycle to the next option, wrapping around
    pub fn next(self) -> Self {
        match self {
            ShareDuration::OneHour => ShareDuration::OneDay,
            ShareDuration::OneDay => ShareDuration::SevenDays,
            ShareDuration::SevenDays => ShareDuration::OneHour,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
}

/// Error body the server may attach to non-2xx responses
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub message: Option<String>,
}

/// Metadata sent when asking for presigned upload targets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadFileMeta {
    pub filename: String,
    #[serde(rename = "type")]
    pub file_type: String,
    pub size: u64,
    pub content_type: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadInitRequest {
    pub files: Vec<UploadFileMeta>,
}

/// One presigned PUT target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadTarget {
    pub upload_url: String,
    pub filename: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessUrlResponse {
    pub access_url: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteFilesRequest {
    pub file_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateShareRequest {
    pub file_id: String,
    pub duration: ShareDuration,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateShareResponse {
    pub share_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevokeSharesRequest {
    pub share_ids: Vec<String>,
}

/// Size in whole kilobytes, rounded to nearest
pub fn size_kb(bytes: u64) -> u64 {
    bytes / 1024 + u64::from(bytes % 1024 >= 512)
}
