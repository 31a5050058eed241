//! Application state and logic
//!
//! Requests run on spawned tasks and report back as [`AppEvent`]s, which
//! `tick` folds into the view models. Only the issuing view waits; the
//! rest of the UI stays live.

use std::future::Future;
use std::path::PathBuf;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

use sharebox_core::{
    ApiClient, ApiError, Config, FileRecord, LocalFile, Navigation, Route, Router, Session,
    ShareRecord,
    upload::upload_batch,
    views::{
        DownloadError, FileList, FileShareView, FileViewer, LoginForm, RegisterForm, ShareList,
        StatusLevel, UploadView, auth_forms::REGISTER_SUCCESS, save_download,
    },
};

use crate::clipboard;

/// Application result for main loop
pub enum AppResult {
    Continue,
    Quit,
}

/// Dashboard sidebar sections
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Section {
    #[default]
    Upload,
    MyFiles,
}

impl Section {
    pub const ALL: [Section; 2] = [Section::Upload, Section::MyFiles];

    pub fn label(&self) -> &'static str {
        match self {
            Section::Upload => "Upload",
            Section::MyFiles => "My Files",
        }
    }
}

/// Actions requiring confirmation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteFiles(usize),
    RevokeShares(usize),
}

/// UI input mode
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    Normal,
    /// Typing a local path to queue for upload
    AddPath(String),
    /// Confirmation prompt
    Confirm(ConfirmAction),
}

/// Completion of a spawned request
#[derive(Debug)]
pub enum AppEvent {
    LoggedIn(Result<String, ApiError>),
    Registered(Result<(), ApiError>),
    FilesLoaded(Result<Vec<FileRecord>, ApiError>),
    FilesDeleted(Vec<String>, Result<(), ApiError>),
    SharesLoaded(Result<Vec<ShareRecord>, ApiError>),
    SharesRevoked(Vec<String>, Result<(), ApiError>),
    FileRead(Result<LocalFile, String>),
    Uploaded(Result<(), ApiError>),
    // Results tagged with a file id are dropped once that file is no longer on screen
    ShareGenerated(String, Result<String, ApiError>),
    ViewLoaded(String, Result<String, ApiError>),
    Downloaded(String, Result<PathBuf, DownloadError>),
}

/// Main application struct
pub struct App {
    /// Configuration
    pub config: Config,

    pub session: Session,
    pub api: ApiClient,
    pub router: Router,

    // Screens
    pub login: LoginForm,
    pub register: RegisterForm,
    pub section: Section,
    pub upload: UploadView,
    pub files: FileList,
    pub shares: ShareList,
    pub file_share: Option<FileShareView>,
    pub viewer: Option<FileViewer>,

    pub input_mode: InputMode,

    /// Shell-level notice (clipboard, local file errors)
    pub notice: Option<(String, StatusLevel)>,

    /// Route whose mount effects last ran
    mounted: Option<Route>,

    events_tx: UnboundedSender<AppEvent>,
    events_rx: UnboundedReceiver<AppEvent>,
}

impl App {
    pub fn new(config: Config, session: Session, initial: Option<Route>) -> Self {
        let api = ApiClient::new(&config.api, session.clone());

        let initial = initial.unwrap_or(if session.is_authenticated() {
            Route::Dashboard
        } else {
            Route::Login
        });

        let (events_tx, events_rx) = mpsc::unbounded_channel();

        Self {
            config,
            session,
            api,
            router: Router::new(initial),
            login: LoginForm::new(),
            register: RegisterForm::new(),
            section: Section::default(),
            upload: UploadView::new(),
            files: FileList::files(),
            shares: ShareList::shares(),
            file_share: None,
            viewer: None,
            input_mode: InputMode::Normal,
            notice: None,
            mounted: None,
            events_tx,
            events_rx,
        }
    }

    /// Route being displayed
    pub fn route(&self) -> &Route {
        self.router.current()
    }

    /// Fold finished requests into state, then apply redirects, the route
    /// guard, and mount effects of a newly entered route.
    pub fn tick(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply(event);
        }

        let route = self.router.resolve(&self.session).clone();
        if self.mounted.as_ref() != Some(&route) {
            self.mounted = Some(route.clone());
            self.mount(route);
        }
    }

    pub fn navigate(&mut self, route: Route) {
        self.router.navigate(Navigation::push(route));
    }

    /// Go back, or to the dashboard when there is no history
    pub fn back(&mut self) {
        if !self.router.back() {
            self.router.navigate(Navigation::replace(Route::Dashboard));
        }
    }

    pub fn logout(&mut self) {
        self.session.logout();
    }

    pub fn set_notice(&mut self, message: impl Into<String>, level: StatusLevel) {
        self.notice = Some((message.into(), level));
    }

    /// Run a request off the UI loop
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = AppEvent> + Send + 'static,
    {
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            // Receiver only goes away on shutdown
            let _ = tx.send(fut.await);
        });
    }

    fn mount(&mut self, route: Route) {
        debug!("mount {}", route.path());
        self.input_mode = InputMode::Normal;
        self.notice = None;

        match route {
            Route::Login => {
                // Nothing from a previous session stays on screen
                self.upload = UploadView::new();
                self.files = FileList::files();
                self.shares = ShareList::shares();
                self.file_share = None;
                self.section = Section::default();
                self.login.feedback.done();
            }
            Route::Register => self.register = RegisterForm::new(),
            Route::Dashboard => {
                // Carry the sign-in confirmation over, then start the form afresh
                if let Some(msg) = self.login.feedback.message().map(String::from) {
                    self.login = LoginForm::new();
                    self.set_notice(msg, StatusLevel::Success);
                }
                if self.section == Section::MyFiles {
                    self.load_files();
                }
            }
            Route::Share => self.load_shares(),
            Route::View { id } => {
                self.viewer = Some(FileViewer::new(id));
                self.load_viewer();
            }
            Route::FileShare(file) => {
                self.file_share = Some(FileShareView::new(
                    file,
                    self.config.client.default_share_duration,
                ));
            }
        }
    }

    fn apply(&mut self, event: AppEvent) {
        match event {
            AppEvent::LoggedIn(result) => {
                self.login.apply_submit(&self.session, result);
            }
            AppEvent::Registered(result) => {
                if self.register.apply_submit(result) {
                    self.login.email = self.register.email.clone();
                    self.login.feedback.succeed(REGISTER_SUCCESS);
                    self.navigate(Route::Login);
                }
            }
            AppEvent::FilesLoaded(result) => self.files.apply_load(result),
            AppEvent::FilesDeleted(ids, result) => self.files.apply_bulk(&ids, result),
            AppEvent::SharesLoaded(result) => self.shares.apply_load(result),
            AppEvent::SharesRevoked(ids, result) => self.shares.apply_bulk(&ids, result),
            AppEvent::FileRead(Ok(file)) => self.upload.add(file),
            AppEvent::FileRead(Err(message)) => self.set_notice(message, StatusLevel::Error),
            AppEvent::Uploaded(result) => self.upload.apply_upload(result),
            AppEvent::ShareGenerated(id, result) => match self.file_share.as_mut() {
                Some(view) if view.file.id == id => view.apply_generate(result),
                _ => debug!("Dropping stale share link for {}", id),
            },
            AppEvent::ViewLoaded(id, result) => match self.viewer.as_mut() {
                Some(viewer) if viewer.file_id == id => viewer.apply_load(result),
                _ => debug!("Dropping stale view result for {}", id),
            },
            AppEvent::Downloaded(id, result) => match self.viewer.as_mut() {
                Some(viewer) if viewer.file_id == id => viewer.apply_download(result),
                _ => debug!("Dropping stale download result for {}", id),
            },
        }
    }

    // Actions

    pub fn submit_login(&mut self) {
        if let Some((email, password)) = self.login.begin_submit() {
            let api = self.api.clone();
            self.spawn(async move { AppEvent::LoggedIn(api.login(&email, &password).await) });
        }
    }

    pub fn submit_register(&mut self) {
        if let Some(reg) = self.register.begin_submit() {
            let api = self.api.clone();
            self.spawn(async move {
                AppEvent::Registered(api.register(&reg.name, &reg.email, &reg.password).await)
            });
        }
    }

    pub fn select_section(&mut self, section: Section) {
        if self.section != section {
            self.section = section;
            if section == Section::MyFiles {
                self.load_files();
            }
        }
    }

    pub fn load_files(&mut self) {
        self.files.begin_load();
        let api = self.api.clone();
        self.spawn(async move { AppEvent::FilesLoaded(api.list_files().await) });
    }

    pub fn load_shares(&mut self) {
        self.shares.begin_load();
        let api = self.api.clone();
        self.spawn(async move { AppEvent::SharesLoaded(api.list_share_links().await) });
    }

    /// Ask for confirmation first when configured to
    pub fn request_delete(&mut self) {
        let count = self.files.selected_ids().len();
        if count == 0 {
            return;
        }
        if self.config.client.confirm_delete {
            self.input_mode = InputMode::Confirm(ConfirmAction::DeleteFiles(count));
        } else {
            self.delete_selected();
        }
    }

    pub fn request_revoke(&mut self) {
        let count = self.shares.selected_ids().len();
        if count == 0 {
            return;
        }
        if self.config.client.confirm_delete {
            self.input_mode = InputMode::Confirm(ConfirmAction::RevokeShares(count));
        } else {
            self.revoke_selected();
        }
    }

    pub fn confirm(&mut self, action: ConfirmAction) {
        self.input_mode = InputMode::Normal;
        match action {
            ConfirmAction::DeleteFiles(_) => self.delete_selected(),
            ConfirmAction::RevokeShares(_) => self.revoke_selected(),
        }
    }

    fn delete_selected(&mut self) {
        if let Some(ids) = self.files.begin_bulk() {
            let api = self.api.clone();
            self.spawn(async move {
                let result = api.delete_files(ids.clone()).await;
                AppEvent::FilesDeleted(ids, result)
            });
        }
    }

    fn revoke_selected(&mut self) {
        if let Some(ids) = self.shares.begin_bulk() {
            let api = self.api.clone();
            self.spawn(async move {
                let result = api.revoke_share_links(ids.clone()).await;
                AppEvent::SharesRevoked(ids, result)
            });
        }
    }

    /// Read a local file and queue it
    pub fn add_upload_path(&mut self, path: &str) {
        let path = PathBuf::from(path.trim());
        if path.as_os_str().is_empty() {
            return;
        }
        self.spawn(async move {
            let result = LocalFile::read(&path).await.map_err(|e| {
                warn!("Cannot read {}: {}", path.display(), e);
                format!("Cannot read {}: {}", path.display(), e)
            });
            AppEvent::FileRead(result)
        });
    }

    pub fn start_upload(&mut self) {
        if let Some(files) = self.upload.begin_upload() {
            let api = self.api.clone();
            self.spawn(async move { AppEvent::Uploaded(upload_batch(&api, &files).await) });
        }
    }

    /// Open the highlighted file in the viewer
    pub fn open_current_file(&mut self) {
        if let Some(id) = self.files.current().map(|f| f.id.clone()) {
            self.navigate(Route::View { id });
        }
    }

    pub fn share_current_file(&mut self) {
        if let Some(file) = self.files.current().cloned() {
            self.navigate(Route::FileShare(file));
        }
    }

    pub fn open_current_share(&mut self) {
        if let Some(id) = self.shares.current().map(|s| s.file_id.clone()) {
            self.navigate(Route::View { id });
        }
    }

    pub fn copy_current_share_link(&mut self) {
        if let Some(link) = self.shares.current().map(|s| self.api.share_link_url(&s.id)) {
            self.copy(&link);
        }
    }

    pub fn generate_share_link(&mut self) {
        let Some(view) = self.file_share.as_mut() else {
            return;
        };
        let (file_id, duration) = view.begin_generate();
        let api = self.api.clone();
        self.spawn(async move {
            let result = api
                .generate_share_link(&file_id, duration)
                .await
                .map(|share_id| api.share_link_url(&share_id));
            AppEvent::ShareGenerated(file_id, result)
        });
    }

    pub fn copy_generated_link(&mut self) {
        if let Some(link) = self.file_share.as_ref().and_then(|v| v.link.clone()) {
            self.copy(&link);
        }
    }

    fn load_viewer(&mut self) {
        let Some(viewer) = self.viewer.as_mut() else {
            return;
        };
        let id = viewer.begin_load();
        let api = self.api.clone();
        self.spawn(async move {
            let result = api.view_file(&id).await;
            AppEvent::ViewLoaded(id, result)
        });
    }

    pub fn download_viewed_file(&mut self) {
        let Some(viewer) = self.viewer.as_mut() else {
            return;
        };
        let Some(url) = viewer.download_url().map(String::from) else {
            return;
        };
        let file_name = viewer.download_file_name();
        let id = viewer.file_id.clone();
        viewer.feedback.start();

        let dir = download_dir();
        let api = self.api.clone();
        self.spawn(async move {
            let result = save_download(&api, &url, &dir, &file_name).await;
            AppEvent::Downloaded(id, result)
        });
    }

    pub fn copy_viewed_url(&mut self) {
        if let Some(url) = self.viewer.as_ref().and_then(|v| v.download_url().map(String::from)) {
            self.copy(&url);
        }
    }

    fn copy(&mut self, text: &str) {
        match clipboard::copy(text) {
            Ok(()) => self.set_notice("Copied to clipboard", StatusLevel::Success),
            Err(e) => {
                warn!("Clipboard copy failed: {}", e);
                self.set_notice("Could not copy to clipboard", StatusLevel::Error);
            }
        }
    }
}

fn download_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(std::env::temp_dir)
}
