//! sharebox REST API client
//!
//! Every call goes through this client, so the bearer header and the
//! "401 means the session is gone" policy live in exactly one place:
//! - authenticated calls read the token from the shared [`Session`]
//! - any 401 on an authenticated call logs the session out and surfaces
//!   [`ApiError::Unauthorized`], which views swallow
//!
//! Presigned uploads are plain PUTs: the URL is the capability, so no
//! bearer header is attached.

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::models::{
    AccessUrlResponse, DeleteFilesRequest, ErrorBody, FileRecord, GenerateShareRequest,
    GenerateShareResponse, LoginRequest, LoginResponse, RegisterRequest, RevokeSharesRequest,
    ShareDuration, ShareRecord, UploadFileMeta, UploadInitRequest, UploadTarget,
};
use crate::session::Session;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Session is no longer valid")]
    Unauthorized,

    #[error("Request rejected with HTTP {status}")]
    Rejected { status: u16, message: Option<String> },

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("No upload URL issued for {0}")]
    MissingUploadUrl(String),

    #[error("Upload of {filename} failed with HTTP {status}")]
    UploadFailed { filename: String, status: u16 },
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }

    /// Message supplied by the server in the error body, if any
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Rejected { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// The request never produced a response
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::HttpError(e) if e.status().is_none() && !e.is_decode())
    }
}

/// API client; cheap to clone into spawned tasks
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    share_base_url: String,
    session: Session,
}

impl ApiClient {
    pub fn new(config: &ApiConfig, session: Session) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            share_base_url: config.share_base().trim_end_matches('/').to_string(),
            session,
        }
    }

    /// Client for a bare base URL, with share links under the same origin
    pub fn with_base_url(base_url: &str, session: Session) -> Self {
        let config = ApiConfig {
            base_url: base_url.to_string(),
            share_base_url: None,
        };
        Self::new(&config, session)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Exchange credentials for an access token
    pub async fn login(&self, email: &str, password: &str) -> Result<String, ApiError> {
        let url = self.url("/api/auth/login");
        debug!("POST {}", url);

        let resp = self
            .client
            .post(&url)
            .json(&LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(Self::rejected(resp).await);
        }

        let body: LoginResponse = resp.json().await?;
        Ok(body.access_token)
    }

    /// Create an account. The response body is not used.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<(), ApiError> {
        let url = self.url("/api/auth/register");
        debug!("POST {}", url);

        let resp = self
            .client
            .post(&url)
            .json(&RegisterRequest {
                name: name.to_string(),
                email: email.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(Self::rejected(resp).await);
        }

        Ok(())
    }

    /// List the signed-in user's files
    pub async fn list_files(&self) -> Result<Vec<FileRecord>, ApiError> {
        let resp = self.send(self.authed_request(Method::GET, "/api/file")).await?;
        Ok(resp.json().await?)
    }

    /// Ask for one presigned PUT target per file
    pub async fn request_upload_targets(
        &self,
        files: Vec<UploadFileMeta>,
    ) -> Result<Vec<UploadTarget>, ApiError> {
        let req = self
            .authed_request(Method::POST, "/api/file/upload")
            .json(&UploadInitRequest { files });

        let resp = self.send(req).await?;
        Ok(resp.json().await?)
    }

    /// Upload raw bytes straight to a presigned URL
    pub async fn put_presigned(
        &self,
        upload_url: &str,
        filename: &str,
        content_type: &str,
        content: Vec<u8>,
    ) -> Result<(), ApiError> {
        debug!("PUT presigned upload for {}", filename);

        let resp = self
            .client
            .put(upload_url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(content)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(ApiError::UploadFailed {
                filename: filename.to_string(),
                status: resp.status().as_u16(),
            });
        }

        Ok(())
    }

    /// Fetch a presigned access URL's content
    pub async fn download(&self, access_url: &str) -> Result<Vec<u8>, ApiError> {
        debug!("GET presigned download");

        let resp = self.client.get(access_url).send().await?;

        if !resp.status().is_success() {
            return Err(Self::rejected(resp).await);
        }

        Ok(resp.bytes().await?.to_vec())
    }

    /// Get a short-lived access URL for a file
    pub async fn view_file(&self, id: &str) -> Result<String, ApiError> {
        let path = format!("/api/file/view/{}", id);
        let resp = self.send(self.authed_request(Method::GET, &path)).await?;

        let body: AccessUrlResponse = resp.json().await?;
        Ok(body.access_url)
    }

    pub async fn delete_files(&self, file_ids: Vec<String>) -> Result<(), ApiError> {
        let req = self
            .authed_request(Method::POST, "/api/file/delete")
            .json(&DeleteFilesRequest { file_ids });

        self.send(req).await?;
        Ok(())
    }

    /// Issue a share link, returning its share id
    pub async fn generate_share_link(
        &self,
        file_id: &str,
        duration: ShareDuration,
    ) -> Result<String, ApiError> {
        let req = self
            .authed_request(Method::POST, "/api/share/links/generate")
            .json(&GenerateShareRequest {
                file_id: file_id.to_string(),
                duration,
            });

        let resp = self.send(req).await?;
        let body: GenerateShareResponse = resp.json().await?;
        Ok(body.share_id)
    }

    pub async fn list_share_links(&self) -> Result<Vec<ShareRecord>, ApiError> {
        let resp = self.send(self.authed_request(Method::GET, "/api/share/links")).await?;
        Ok(resp.json().await?)
    }

    pub async fn revoke_share_links(&self, share_ids: Vec<String>) -> Result<(), ApiError> {
        let req = self
            .authed_request(Method::POST, "/api/share/links/revoke")
            .json(&RevokeSharesRequest { share_ids });

        self.send(req).await?;
        Ok(())
    }

    /// Public link for a share id
    pub fn share_link_url(&self, share_id: &str) -> String {
        format!("{}/api/share/{}", self.share_base_url, share_id)
    }

    // Private helpers

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed_request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.url(path);
        debug!("{} {}", method, url);

        let mut req = self.client.request(method, url);

        if let Some(token) = self.session.token() {
            req = req.bearer_auth(token);
        }

        req
    }

    /// Send an authenticated request and apply the response policy
    async fn send(&self, req: RequestBuilder) -> Result<Response, ApiError> {
        let resp = req.send().await?;

        match resp.status() {
            s if s.is_success() => Ok(resp),
            StatusCode::UNAUTHORIZED => {
                warn!("{} returned 401, ending session", resp.url().path());
                self.session.logout();
                Err(ApiError::Unauthorized)
            }
            _ => Err(Self::rejected(resp).await),
        }
    }

    async fn rejected(resp: Response) -> ApiError {
        let status = resp.status().as_u16();
        warn!("{} returned HTTP {}", resp.url().path(), status);

        let message = resp.json::<ErrorBody>().await.ok().and_then(|b| b.message);
        ApiError::Rejected { status, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryTokenStore;
    use std::sync::Arc;

    fn session() -> Session {
        Session::init(Arc::new(MemoryTokenStore::new()))
    }

    #[test]
    fn test_url_normalization() {
        let client = ApiClient::with_base_url("http://localhost:5000/", session());
        assert_eq!(client.base_url(), "http://localhost:5000");
        assert_eq!(client.url("/api/file"), "http://localhost:5000/api/file");
    }

    #[test]
    fn test_share_link_url() {
        let client = ApiClient::with_base_url("http://localhost:5000", session());
        assert_eq!(client.share_link_url("abc"), "http://localhost:5000/api/share/abc");

        let config = ApiConfig {
            base_url: "http://api.internal".to_string(),
            share_base_url: Some("https://share.example.com/".to_string()),
        };
        let client = ApiClient::new(&config, session());
        assert_eq!(client.share_link_url("abc"), "https://share.example.com/api/share/abc");
    }

    #[test]
    fn test_error_helpers() {
        let err = ApiError::Rejected {
            status: 400,
            message: Some("Email taken".to_string()),
        };
        assert_eq!(err.server_message(), Some("Email taken"));
        assert!(!err.is_unauthorized());
        assert!(ApiError::Unauthorized.is_unauthorized());
        assert_eq!(ApiError::MissingUploadUrl("a".to_string()).server_message(), None);
    }
}
