//! Fetch-list tables with multi-select and one bulk action
//!
//! File List (bulk delete) and Share List (bulk revoke) share this model.
//! The bulk action only touches local rows after the server confirms it.

use super::Feedback;
use crate::api::{ApiClient, ApiError};
use crate::models::{FileRecord, Record, ShareRecord};

/// Fixed strings a list shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListTexts {
    pub load_error: &'static str,
    pub action_error: &'static str,
    pub empty: &'static str,
    pub loading: &'static str,
}

pub const FILE_LIST_TEXTS: ListTexts = ListTexts {
    load_error: "Could not load files.",
    action_error: "Could not delete files. Please try again.",
    empty: "No files available",
    loading: "Loading files...",
};

pub const SHARE_LIST_TEXTS: ListTexts = ListTexts {
    load_error: "Could not load share links.",
    action_error: "Could not revoke share links. Please try again.",
    empty: "No shared links available",
    loading: "Loading links...",
};

#[derive(Debug, Clone)]
pub struct ListView<T> {
    pub items: Vec<T>,
    /// Selected ids, in selection order
    selected: Vec<String>,
    pub cursor: usize,
    pub feedback: Feedback,
    pub texts: ListTexts,
}

pub type FileList = ListView<FileRecord>;
pub type ShareList = ListView<ShareRecord>;

impl<T: Record> ListView<T> {
    pub fn new(texts: ListTexts) -> Self {
        Self {
            items: Vec::new(),
            selected: Vec::new(),
            cursor: 0,
            feedback: Feedback::default(),
            texts,
        }
    }

    pub fn begin_load(&mut self) {
        self.feedback.start();
    }

    pub fn apply_load(&mut self, result: Result<Vec<T>, ApiError>) {
        match result {
            Ok(items) => {
                self.items = items;
                self.selected.retain(|id| self.items.iter().any(|i| i.id() == id));
                self.cursor = self.cursor.min(self.items.len().saturating_sub(1));
                self.feedback.done();
            }
            Err(e) => self.feedback.fail_api(&e, self.texts.load_error),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.iter().any(|s| s == id)
    }

    pub fn selected_ids(&self) -> &[String] {
        &self.selected
    }

    pub fn all_selected(&self) -> bool {
        !self.items.is_empty() && self.selected.len() == self.items.len()
    }

    pub fn toggle(&mut self, id: &str) {
        if self.is_selected(id) {
            self.selected.retain(|s| s != id);
        } else if self.items.iter().any(|i| i.id() == id) {
            self.selected.push(id.to_string());
        }
    }

    /// Select everything, or clear when everything is already selected
    pub fn toggle_all(&mut self) {
        if self.all_selected() {
            self.selected.clear();
        } else {
            self.selected = self.items.iter().map(|i| i.id().to_string()).collect();
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    pub fn current(&self) -> Option<&T> {
        self.items.get(self.cursor)
    }

    pub fn toggle_current(&mut self) {
        if let Some(id) = self.current().map(|i| i.id().to_string()) {
            self.toggle(&id);
        }
    }

    pub fn cursor_down(&mut self) {
        if self.cursor + 1 < self.items.len() {
            self.cursor += 1;
        }
    }

    pub fn cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Start the bulk action. `None` when nothing is selected.
    pub fn begin_bulk(&mut self) -> Option<Vec<String>> {
        if self.selected.is_empty() {
            return None;
        }
        self.feedback.start();
        Some(self.selected.clone())
    }

    /// Drop exactly the acted-on rows once the server confirmed
    pub fn apply_bulk(&mut self, ids: &[String], result: Result<(), ApiError>) {
        match result {
            Ok(()) => {
                self.items.retain(|i| !ids.iter().any(|id| id == i.id()));
                self.selected.clear();
                self.cursor = self.cursor.min(self.items.len().saturating_sub(1));
                self.feedback.done();
            }
            Err(e) => self.feedback.fail_api(&e, self.texts.action_error),
        }
    }
}

impl ListView<FileRecord> {
    pub fn files() -> Self {
        Self::new(FILE_LIST_TEXTS)
    }

    pub async fn load(&mut self, api: &ApiClient) {
        self.begin_load();
        let result = api.list_files().await;
        self.apply_load(result);
    }

    pub async fn delete_selected(&mut self, api: &ApiClient) {
        let Some(ids) = self.begin_bulk() else {
            return;
        };
        let result = api.delete_files(ids.clone()).await;
        self.apply_bulk(&ids, result);
    }
}

impl ListView<ShareRecord> {
    pub fn shares() -> Self {
        Self::new(SHARE_LIST_TEXTS)
    }

    pub async fn load(&mut self, api: &ApiClient) {
        self.begin_load();
        let result = api.list_share_links().await;
        self.apply_load(result);
    }

    /// Revoke only the selected links
    pub async fn revoke_selected(&mut self, api: &ApiClient) {
        let Some(ids) = self.begin_bulk() else {
            return;
        };
        let result = api.revoke_share_links(ids.clone()).await;
        self.apply_bulk(&ids, result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn file(id: &str) -> FileRecord {
        FileRecord {
            id: id.to_string(),
            filename: format!("{}.txt", id),
            size: 1024,
            content_type: "text/plain".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn loaded(ids: &[&str]) -> FileList {
        let mut list = FileList::files();
        list.begin_load();
        list.apply_load(Ok(ids.iter().map(|id| file(id)).collect()));
        list
    }

    #[test]
    fn test_load_failure() {
        let mut list = FileList::files();
        list.begin_load();
        assert!(list.feedback.loading);

        list.apply_load(Err(ApiError::Rejected { status: 500, message: None }));
        assert!(!list.feedback.loading);
        assert_eq!(list.feedback.error(), Some("Could not load files."));
    }

    #[test]
    fn test_load_unauthorized_is_silent() {
        let mut list = FileList::files();
        list.begin_load();
        list.apply_load(Err(ApiError::Unauthorized));
        assert_eq!(list.feedback.error(), None);
        assert!(list.is_empty());
    }

    #[test]
    fn test_toggle_selection() {
        let mut list = loaded(&["a", "b", "c"]);

        list.toggle("a");
        list.toggle("c");
        assert!(list.is_selected("a"));
        assert!(!list.is_selected("b"));

        list.toggle("a");
        assert_eq!(list.selected_ids(), ["c".to_string()]);

        // Unknown ids are ignored
        list.toggle("zzz");
        assert_eq!(list.selected_ids().len(), 1);
    }

    #[test]
    fn test_toggle_all() {
        let mut list = loaded(&["a", "b", "c"]);
        list.toggle("b");

        list.toggle_all();
        assert!(list.all_selected());

        list.toggle_all();
        assert!(list.selected_ids().is_empty());

        let mut empty = FileList::files();
        empty.toggle_all();
        assert!(!empty.all_selected());
    }

    #[test]
    fn test_bulk_success_removes_selected() {
        let mut list = loaded(&["a", "b", "c"]);
        list.toggle("a");
        list.toggle("c");

        let ids = list.begin_bulk().unwrap();
        list.apply_bulk(&ids, Ok(()));

        assert_eq!(list.items.len(), 1);
        assert_eq!(list.items[0].id, "b");
        assert!(list.selected_ids().is_empty());
    }

    #[test]
    fn test_bulk_failure_keeps_rows() {
        let mut list = loaded(&["a", "b"]);
        list.toggle("a");

        let ids = list.begin_bulk().unwrap();
        list.apply_bulk(&ids, Err(ApiError::Rejected { status: 500, message: None }));

        assert_eq!(list.items.len(), 2);
        assert!(list.is_selected("a"));
        assert_eq!(list.feedback.error(), Some("Could not delete files. Please try again."));
    }

    #[test]
    fn test_bulk_without_selection() {
        let mut list = loaded(&["a"]);
        assert!(list.begin_bulk().is_none());
        assert!(!list.feedback.loading);
    }

    #[test]
    fn test_cursor() {
        let mut list = loaded(&["a", "b"]);
        list.cursor_up();
        assert_eq!(list.cursor, 0);
        list.cursor_down();
        list.cursor_down();
        assert_eq!(list.cursor, 1);

        list.toggle_current();
        assert!(list.is_selected("b"));

        let ids = list.begin_bulk().unwrap();
        list.apply_bulk(&ids, Ok(()));
        assert_eq!(list.cursor, 0);
        assert_eq!(list.current().map(|f| f.id.as_str()), Some("a"));
    }

    #[test]
    fn test_reload_prunes_selection() {
        let mut list = loaded(&["a", "b"]);
        list.toggle("a");
        list.toggle("b");

        list.apply_load(Ok(vec![file("b")]));
        assert_eq!(list.selected_ids(), ["b".to_string()]);
    }
}
