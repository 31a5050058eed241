//! View models for every screen
//!
//! Elm-style: each view owns its state and exposes
//! - `begin_*` to start an action (sets loading, returns what to send)
//! - `apply_*` to reduce the API result back into state
//! - an async convenience that runs both around one API call
//!
//! Shells that run requests on spawned tasks call `begin_*`/`apply_*`
//! directly. A 401 has already ended the session inside the API client, so
//! reducers drop it without recording an error.

pub mod auth_forms;
pub mod list;
pub mod share;
pub mod upload;
pub mod viewer;

pub use auth_forms::{LoginField, LoginForm, RegisterField, RegisterForm, Registration};
pub use list::{FileList, ListView, ShareList};
pub use share::FileShareView;
pub use upload::UploadView;
pub use viewer::{preview_kind, save_download, DownloadError, FileViewer, PreviewKind};

use crate::api::ApiError;

/// Status message severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Success,
    Error,
}

/// Loading flag plus the one status line a view shows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Feedback {
    pub loading: bool,
    pub status: Option<(String, StatusLevel)>,
}

impl Feedback {
    /// Enter the loading state, dropping any previous message
    pub fn start(&mut self) {
        self.loading = true;
        self.status = None;
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.status = Some((message.into(), StatusLevel::Info));
    }

    pub fn succeed(&mut self, message: impl Into<String>) {
        self.loading = false;
        self.status = Some((message.into(), StatusLevel::Success));
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.loading = false;
        self.status = Some((message.into(), StatusLevel::Error));
    }

    /// Reduce an API failure. Unauthorized is silent.
    pub fn fail_api(&mut self, err: &ApiError, message: &str) {
        if err.is_unauthorized() {
            self.loading = false;
            self.status = None;
        } else {
            tracing::warn!("{}: {}", message, err);
            self.fail(message);
        }
    }

    pub fn done(&mut self) {
        self.loading = false;
    }

    pub fn clear(&mut self) {
        self.status = None;
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            Some((msg, StatusLevel::Error)) => Some(msg),
            _ => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match &self.status {
            Some((msg, StatusLevel::Success)) => Some(msg),
            _ => None,
        }
    }
}
