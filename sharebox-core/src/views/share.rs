//! Share-link generation for a single file

use super::Feedback;
use crate::api::{ApiClient, ApiError};
use crate::models::{FileRecord, ShareDuration};

pub const GENERATE_FAILED: &str = "Could not generate share link. Please try again.";
pub const GENERATING: &str = "Generating...";

#[derive(Debug, Clone)]
pub struct FileShareView {
    pub file: FileRecord,
    pub duration: ShareDuration,
    /// Composed link once generated
    pub link: Option<String>,
    pub feedback: Feedback,
}

impl FileShareView {
    pub fn new(file: FileRecord, duration: ShareDuration) -> Self {
        Self {
            file,
            duration,
            link: None,
            feedback: Feedback::default(),
        }
    }

    pub fn cycle_duration(&mut self) {
        self.duration = self.duration.next();
    }

    /// Start generating: returns the file id and expiry to send
    pub fn begin_generate(&mut self) -> (String, ShareDuration) {
        self.link = None;
        self.feedback.start();
        self.feedback.info(GENERATING);
        (self.file.id.clone(), self.duration)
    }

    /// Reduce the composed link (or the failure)
    pub fn apply_generate(&mut self, result: Result<String, ApiError>) {
        match result {
            Ok(link) => {
                self.link = Some(link);
                self.feedback.done();
                self.feedback.clear();
            }
            Err(e) => self.feedback.fail_api(&e, GENERATE_FAILED),
        }
    }

    pub async fn generate(&mut self, api: &ApiClient) {
        let (file_id, duration) = self.begin_generate();
        let result = api
            .generate_share_link(&file_id, duration)
            .await
            .map(|share_id| api.share_link_url(&share_id));
        self.apply_generate(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn view() -> FileShareView {
        FileShareView::new(
            FileRecord {
                id: "f1".to_string(),
                filename: "a.pdf".to_string(),
                size: 10,
                content_type: "application/pdf".to_string(),
                created_at: Utc::now(),
            },
            ShareDuration::default(),
        )
    }

    #[test]
    fn test_generate_flow() {
        let mut view = view();
        view.cycle_duration();
        let (id, duration) = view.begin_generate();
        assert_eq!(id, "f1");
        assert_eq!(duration, ShareDuration::SevenDays);
        assert!(view.feedback.loading);

        view.apply_generate(Ok("http://x/api/share/s1".to_string()));
        assert_eq!(view.link.as_deref(), Some("http://x/api/share/s1"));
        assert!(!view.feedback.loading);
        assert!(view.feedback.status.is_none());
    }

    #[test]
    fn test_generate_failure_clears_old_link() {
        let mut view = view();
        view.link = Some("old".to_string());
        view.begin_generate();
        assert!(view.link.is_none());

        view.apply_generate(Err(ApiError::Rejected { status: 500, message: None }));
        assert_eq!(view.feedback.error(), Some(GENERATE_FAILED));
    }
}
