//! Upload screen: pending local files and the batch upload

use super::Feedback;
use crate::api::{ApiClient, ApiError};
use crate::upload::{upload_batch, LocalFile};

pub const UPLOAD_SUCCESS: &str = "Files uploaded successfully";
pub const UPLOAD_FAILED: &str = "Could not upload files.";
pub const UPLOADING: &str = "Uploading.....";

#[derive(Debug, Clone, Default)]
pub struct UploadView {
    pub files: Vec<LocalFile>,
    pub cursor: usize,
    pub feedback: Feedback,
}

impl UploadView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a file. A file with the same name replaces the earlier one,
    /// since upload targets are matched by name.
    pub fn add(&mut self, file: LocalFile) {
        match self.files.iter_mut().find(|f| f.name == file.name) {
            Some(existing) => *existing = file,
            None => self.files.push(file),
        }
    }

    pub fn remove(&mut self, index: usize) {
        if index < self.files.len() {
            self.files.remove(index);
            self.cursor = self.cursor.min(self.files.len().saturating_sub(1));
        }
    }

    pub fn remove_current(&mut self) {
        self.remove(self.cursor);
    }

    pub fn cursor_down(&mut self) {
        if self.cursor + 1 < self.files.len() {
            self.cursor += 1;
        }
    }

    pub fn cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn can_upload(&self) -> bool {
        !self.files.is_empty() && !self.feedback.loading
    }

    /// Start the upload. `None` when there is nothing to send.
    pub fn begin_upload(&mut self) -> Option<Vec<LocalFile>> {
        if !self.can_upload() {
            return None;
        }
        self.feedback.start();
        self.feedback.info(UPLOADING);
        Some(self.files.clone())
    }

    pub fn apply_upload(&mut self, result: Result<(), ApiError>) {
        match result {
            Ok(()) => {
                self.files.clear();
                self.cursor = 0;
                self.feedback.succeed(UPLOAD_SUCCESS);
            }
            Err(e) => self.feedback.fail_api(&e, UPLOAD_FAILED),
        }
    }

    pub async fn upload(&mut self, api: &ApiClient) {
        let Some(files) = self.begin_upload() else {
            return;
        };
        let result = upload_batch(api, &files).await;
        self.apply_upload(result);
    }
}
