//! End-to-end flows against an in-process mock of the sharebox backend

use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    routing::{get, post},
};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::{Value, json};

use sharebox_core::{
    ApiClient, Claims, LocalFile, MemoryTokenStore, Navigation, Route, Router as History, Session,
    ShareDuration, TokenStore,
    auth::unix_now,
    views::{
        FileList, FileShareView, FileViewer, LoginForm, PreviewKind, RegisterForm, ShareList,
        UploadView, auth_forms, save_download, upload::UPLOAD_FAILED, upload::UPLOAD_SUCCESS,
    },
};

#[derive(Default)]
struct Backend {
    base: String,
    token: String,
    files: Vec<Value>,
    shares: Vec<Value>,
    /// Every authenticated endpoint answers 401
    reject_all: bool,
    fail_list: bool,
    auth_headers: Vec<Option<String>>,
    deleted: Vec<Vec<String>>,
    revoked: Vec<Vec<String>>,
    upload_meta: Vec<Value>,
    omit_upload_url: Option<String>,
    fail_put: Option<String>,
    puts: Vec<(String, Option<String>, Vec<u8>)>,
    generated: Vec<Value>,
}

type Shared = Arc<Mutex<Backend>>;

fn mint(exp: u64) -> String {
    let claims = Claims {
        user_id: "u-1".to_string(),
        name: "Test User".to_string(),
        email: "user@test.com".to_string(),
        exp,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(b"backend")).unwrap()
}

fn file_json(id: &str) -> Value {
    json!({
        "id": id,
        "filename": format!("{}.txt", id),
        "size": 2048,
        "contentType": "text/plain",
        "createdAt": "2024-05-01T12:30:00Z"
    })
}

fn share_json(id: &str) -> Value {
    json!({
        "id": id,
        "fileId": format!("f-{}", id),
        "filename": "a.txt",
        "size": 10,
        "expiryAt": "2024-05-02T00:00:00Z"
    })
}

/// Record the auth header; 401 when configured to reject
fn authorize(backend: &mut Backend, headers: &HeaderMap) -> Result<(), StatusCode> {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    backend.auth_headers.push(auth);

    if backend.reject_all {
        Err(StatusCode::UNAUTHORIZED)
    } else {
        Ok(())
    }
}

async fn login(State(s): State<Shared>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let b = s.lock().unwrap();
    if body["password"] == "Passw0rd!" {
        (StatusCode::OK, Json(json!({ "accessToken": b.token, "user": {} })))
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Invalid credentials" })))
    }
}

async fn register(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["email"] == "taken@test.com" {
        (StatusCode::CONFLICT, Json(json!({ "message": "Email already registered" })))
    } else {
        (StatusCode::CREATED, Json(json!({ "id": "u-2" })))
    }
}

async fn list_files(State(s): State<Shared>, headers: HeaderMap) -> Result<Json<Value>, StatusCode> {
    let mut b = s.lock().unwrap();
    authorize(&mut b, &headers)?;
    if b.fail_list {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    Ok(Json(Value::Array(b.files.clone())))
}

async fn delete_files(
    State(s): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<StatusCode, StatusCode> {
    let mut b = s.lock().unwrap();
    authorize(&mut b, &headers)?;
    let ids: Vec<String> = serde_json::from_value(body["fileIds"].clone()).unwrap();
    b.deleted.push(ids);
    Ok(StatusCode::OK)
}

async fn upload_init(
    State(s): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    let mut b = s.lock().unwrap();
    authorize(&mut b, &headers)?;

    let files = body["files"].as_array().cloned().unwrap_or_default();
    let targets: Vec<Value> = files
        .iter()
        .filter_map(|f| f["filename"].as_str())
        .filter(|name| b.omit_upload_url.as_deref() != Some(*name))
        .map(|name| json!({ "uploadUrl": format!("{}/store/{}", b.base, name), "filename": name }))
        .collect();
    b.upload_meta = files;
    Ok(Json(Value::Array(targets)))
}

async fn store_put(
    State(s): State<Shared>,
    Path(name): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let mut b = s.lock().unwrap();
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    let had_auth = headers.contains_key(header::AUTHORIZATION);
    b.puts.push((name.clone(), content_type, body.to_vec()));

    if had_auth || b.fail_put.as_deref() == Some(name.as_str()) {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::OK
    }
}

async fn store_get(Path(name): Path<String>) -> Vec<u8> {
    format!("content of {}", name).into_bytes()
}

async fn view_file(
    State(s): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    let mut b = s.lock().unwrap();
    authorize(&mut b, &headers)?;
    if id == "missing" {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(Json(json!({ "accessUrl": format!("{}/store/{}.pdf?sig=abc", b.base, id) })))
}

async fn generate(
    State(s): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    let mut b = s.lock().unwrap();
    authorize(&mut b, &headers)?;
    let share_id = format!("sh-{}", body["fileId"].as_str().unwrap_or_default());
    b.generated.push(body);
    Ok(Json(json!({ "shareId": share_id })))
}

async fn list_shares(State(s): State<Shared>, headers: HeaderMap) -> Result<Json<Value>, StatusCode> {
    let mut b = s.lock().unwrap();
    authorize(&mut b, &headers)?;
    Ok(Json(Value::Array(b.shares.clone())))
}

async fn revoke(
    State(s): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<StatusCode, StatusCode> {
    let mut b = s.lock().unwrap();
    authorize(&mut b, &headers)?;
    let ids: Vec<String> = serde_json::from_value(body["shareIds"].clone()).unwrap();
    b.revoked.push(ids);
    Ok(StatusCode::OK)
}

async fn spawn_backend(backend: Backend) -> (String, Shared) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());

    let shared = Arc::new(Mutex::new(Backend {
        base: base.clone(),
        ..backend
    }));

    let app = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
        .route("/api/file", get(list_files))
        .route("/api/file/upload", post(upload_init))
        .route("/api/file/delete", post(delete_files))
        .route("/api/file/view/{id}", get(view_file))
        .route("/api/share/links", get(list_shares))
        .route("/api/share/links/generate", post(generate))
        .route("/api/share/links/revoke", post(revoke))
        .route("/store/{name}", get(store_get).put(store_put))
        .with_state(shared.clone());

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (base, shared)
}

/// Logged-in client against a fresh backend
async fn signed_in(backend: Backend) -> (ApiClient, Shared, Arc<MemoryTokenStore>) {
    let token = mint(unix_now() + 3600);
    let store = Arc::new(MemoryTokenStore::with_token(&token));
    let (base, shared) = spawn_backend(Backend {
        token: token.clone(),
        ..backend
    })
    .await;

    let session = Session::init(store.clone());
    assert!(session.is_authenticated());
    (ApiClient::with_base_url(&base, session), shared, store)
}

#[tokio::test]
async fn login_then_authenticated_calls_carry_bearer() {
    let token = mint(unix_now() + 3600);
    let (base, shared) = spawn_backend(Backend {
        token: token.clone(),
        ..Default::default()
    })
    .await;

    let store = Arc::new(MemoryTokenStore::new());
    let session = Session::init(store.clone());
    let api = ApiClient::with_base_url(&base, session.clone());
    let mut history = History::new(Route::Login);

    let mut form = LoginForm::new();
    form.email = "user@test.com".to_string();
    form.password = "Passw0rd!".to_string();
    assert!(form.submit(&api).await);
    assert_eq!(form.feedback.message(), Some(auth_forms::LOGIN_SUCCESS));

    assert_eq!(history.resolve(&session), &Route::Dashboard);
    assert_eq!(session.identity().unwrap().name, "Test User");
    assert_eq!(store.load().unwrap().as_deref(), Some(token.as_str()));

    let mut files = FileList::files();
    files.load(&api).await;
    assert!(files.is_empty());
    assert_eq!(files.texts.empty, "No files available");
    assert!(files.feedback.error().is_none());

    let headers = shared.lock().unwrap().auth_headers.clone();
    assert_eq!(headers, vec![Some(format!("Bearer {}", token))]);
}

#[tokio::test]
async fn login_rejection_shows_server_message() {
    let (base, _shared) = spawn_backend(Backend::default()).await;
    let session = Session::init(Arc::new(MemoryTokenStore::new()));
    let api = ApiClient::with_base_url(&base, session.clone());

    let mut form = LoginForm::new();
    form.email = "user@test.com".to_string();
    form.password = "Wr0ngpass!".to_string();

    assert!(!form.submit(&api).await);
    assert_eq!(form.feedback.error(), Some("Invalid credentials"));
    // A failed login is not a session teardown
    assert!(session.take_redirect().is_none());
}

#[tokio::test]
async fn invalid_form_never_hits_network() {
    // Nothing listens here; a request would fail with the network message
    let session = Session::init(Arc::new(MemoryTokenStore::new()));
    let api = ApiClient::with_base_url("http://127.0.0.1:9", session);

    let mut form = LoginForm::new();
    form.email = "user@test".to_string();
    form.password = "Passw0rd!".to_string();

    assert!(!form.submit(&api).await);
    assert_eq!(form.feedback.error(), Some(sharebox_core::validators::INVALID_EMAIL));
}

#[tokio::test]
async fn unreachable_server_shows_retry_message() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let session = Session::init(Arc::new(MemoryTokenStore::new()));
    let api = ApiClient::with_base_url(&base, session);

    let mut form = LoginForm::new();
    form.email = "user@test.com".to_string();
    form.password = "Passw0rd!".to_string();

    assert!(!form.submit(&api).await);
    assert_eq!(form.feedback.error(), Some(auth_forms::NETWORK_FAILED));
}

#[tokio::test]
async fn register_flow() {
    let (base, _shared) = spawn_backend(Backend::default()).await;
    let api = ApiClient::with_base_url(&base, Session::init(Arc::new(MemoryTokenStore::new())));

    let mut form = RegisterForm::new();
    form.name = "Ada Lovelace".to_string();
    form.email = "taken@test.com".to_string();
    form.password = "Passw0rd!".to_string();
    assert!(!form.submit(&api).await);
    assert_eq!(form.feedback.error(), Some("Email already registered"));

    form.email = "ada@test.com".to_string();
    form.password = "Passw0rd!".to_string();
    assert!(form.submit(&api).await);
    assert_eq!(form.feedback.message(), Some(auth_forms::REGISTER_SUCCESS));
}

#[tokio::test]
async fn unauthorized_ends_session_without_view_error() {
    let (api, _shared, store) = signed_in(Backend {
        reject_all: true,
        files: vec![file_json("a")],
        ..Default::default()
    })
    .await;
    let session = api.session().clone();
    let mut history = History::new(Route::Login);
    history.navigate(Navigation::push(Route::Dashboard));

    let mut files = FileList::files();
    files.load(&api).await;

    assert!(files.feedback.error().is_none());
    assert!(!files.feedback.loading);
    assert!(!session.is_authenticated());
    assert!(session.token().is_none());
    assert!(store.load().unwrap().is_none());
    assert_eq!(history.resolve(&session), &Route::Login);
}

#[tokio::test]
async fn unauthorized_during_upload_and_share() {
    let (api, _shared, _store) = signed_in(Backend {
        reject_all: true,
        ..Default::default()
    })
    .await;

    let mut upload = UploadView::new();
    upload.add(LocalFile::new("a.txt", "text/plain", b"a".to_vec()));
    upload.upload(&api).await;
    assert!(upload.feedback.error().is_none());
    assert!(!api.session().is_authenticated());

    let mut viewer = FileViewer::new("f1");
    viewer.load(&api).await;
    assert!(viewer.feedback.error().is_none());
    assert!(viewer.download_url().is_none());
}

#[tokio::test]
async fn list_failure_shows_generic_error() {
    let (api, _shared, _store) = signed_in(Backend {
        fail_list: true,
        ..Default::default()
    })
    .await;

    let mut files = FileList::files();
    files.load(&api).await;
    assert_eq!(files.feedback.error(), Some("Could not load files."));
    assert!(api.session().is_authenticated());
}

#[tokio::test]
async fn bulk_delete_removes_exactly_selected() {
    let (api, shared, _store) = signed_in(Backend {
        files: vec![file_json("a"), file_json("b"), file_json("c")],
        ..Default::default()
    })
    .await;

    let mut files = FileList::files();
    files.load(&api).await;
    assert_eq!(files.items.len(), 3);
    assert_eq!(files.items[0].size, 2048);

    files.toggle("a");
    files.toggle("c");
    files.delete_selected(&api).await;

    let remaining: Vec<&str> = files.items.iter().map(|f| f.id.as_str()).collect();
    assert_eq!(remaining, vec!["b"]);
    assert!(files.selected_ids().is_empty());
    assert_eq!(
        shared.lock().unwrap().deleted,
        vec![vec!["a".to_string(), "c".to_string()]]
    );
}

#[tokio::test]
async fn revoke_sends_only_selected() {
    let (api, shared, _store) = signed_in(Backend {
        shares: vec![share_json("s1"), share_json("s2"), share_json("s3")],
        ..Default::default()
    })
    .await;

    let mut shares = ShareList::shares();
    shares.load(&api).await;
    assert_eq!(shares.items.len(), 3);

    shares.toggle("s2");
    shares.revoke_selected(&api).await;

    assert_eq!(shared.lock().unwrap().revoked, vec![vec!["s2".to_string()]]);
    assert_eq!(shares.items.len(), 2);
    assert!(!shares.items.iter().any(|s| s.id == "s2"));
}

#[tokio::test]
async fn upload_batch_success() {
    let (api, shared, _store) = signed_in(Backend::default()).await;

    let mut upload = UploadView::new();
    upload.add(LocalFile::new("a.txt", "text/plain", b"alpha".to_vec()));
    upload.add(LocalFile::new("b.png", "image/png", b"\x89PNG".to_vec()));
    upload.upload(&api).await;

    assert_eq!(upload.feedback.message(), Some(UPLOAD_SUCCESS));
    assert!(upload.files.is_empty());

    let backend = shared.lock().unwrap();
    assert_eq!(
        backend.upload_meta[1],
        json!({ "filename": "b.png", "type": "image/png", "size": 4, "contentType": "image/png" })
    );

    let mut puts = backend.puts.clone();
    puts.sort();
    assert_eq!(puts.len(), 2);
    assert_eq!(puts[0], ("a.txt".to_string(), Some("text/plain".to_string()), b"alpha".to_vec()));
    assert_eq!(puts[1].1.as_deref(), Some("image/png"));
}

#[tokio::test]
async fn upload_batch_single_put_failure_fails_whole_batch() {
    let (api, shared, _store) = signed_in(Backend {
        fail_put: Some("b.txt".to_string()),
        ..Default::default()
    })
    .await;

    let mut upload = UploadView::new();
    upload.add(LocalFile::new("a.txt", "text/plain", b"a".to_vec()));
    upload.add(LocalFile::new("b.txt", "text/plain", b"b".to_vec()));
    upload.add(LocalFile::new("c.txt", "text/plain", b"c".to_vec()));
    upload.upload(&api).await;

    assert_eq!(upload.feedback.error(), Some(UPLOAD_FAILED));
    assert!(upload.feedback.message().is_none());
    assert_eq!(upload.files.len(), 3);
    // Every PUT was still issued and settled
    assert_eq!(shared.lock().unwrap().puts.len(), 3);
}

#[tokio::test]
async fn upload_batch_missing_url_fails() {
    let (api, shared, _store) = signed_in(Backend {
        omit_upload_url: Some("b.txt".to_string()),
        ..Default::default()
    })
    .await;

    let mut upload = UploadView::new();
    upload.add(LocalFile::new("a.txt", "text/plain", b"a".to_vec()));
    upload.add(LocalFile::new("b.txt", "text/plain", b"b".to_vec()));
    upload.upload(&api).await;

    assert_eq!(upload.feedback.error(), Some(UPLOAD_FAILED));
    assert!(shared.lock().unwrap().puts.is_empty());
}

#[tokio::test]
async fn share_link_generation() {
    let (api, shared, _store) = signed_in(Backend {
        files: vec![file_json("f1")],
        ..Default::default()
    })
    .await;

    let mut files = FileList::files();
    files.load(&api).await;
    let file = files.current().cloned().unwrap();

    let mut view = FileShareView::new(file, ShareDuration::OneHour);
    view.generate(&api).await;

    assert_eq!(view.link, Some(format!("{}/api/share/sh-f1", api.base_url())));
    assert_eq!(
        shared.lock().unwrap().generated,
        vec![json!({ "fileId": "f1", "duration": "1h" })]
    );
}

#[tokio::test]
async fn viewer_loads_and_downloads() {
    let (api, _shared, _store) = signed_in(Backend::default()).await;

    let mut viewer = FileViewer::new("report");
    viewer.load(&api).await;
    assert_eq!(viewer.kind, PreviewKind::Pdf);
    assert_eq!(viewer.download_file_name(), "report.pdf");

    let dir = std::env::temp_dir().join(format!("sharebox-dl-{}", std::process::id()));
    let url = viewer.download_url().unwrap().to_string();
    let result = save_download(&api, &url, &dir, &viewer.download_file_name()).await;
    viewer.apply_download(result);

    let saved = viewer.saved_to.clone().unwrap();
    assert_eq!(std::fs::read_to_string(&saved).unwrap(), "content of report.pdf");
    let _ = std::fs::remove_dir_all(&dir);

    let mut missing = FileViewer::new("missing");
    missing.load(&api).await;
    assert_eq!(missing.feedback.error(), Some(sharebox_core::views::viewer::OPEN_FAILED));
}
